use super::{
	AttribKind, AttribLocation, BufferName, BufferTarget, DrawMode, FilterMode, GraphicsBackend,
	IndexKind, PixelFormat, ProgramName, ShaderName, ShaderStage, TextureName, UniformLocation,
	WrapMode,
};
use crate::command::Value;
use crate::error::GlirError;

use std::ffi::CString;


/// Backend over the raw OpenGL bindings. All binding state lives in the GL
/// context itself; this type only carries the loaded function pointers.
#[derive(Debug)]
pub struct RawGl {
	_private: (),
}

impl RawGl {
	/// Load the GL function pointers through the context's loader and wrap
	/// them. The context must stay current for the lifetime of the value.
	pub fn load_with<F>(loadfn: F) -> RawGl
		where F: FnMut(&'static str) -> *const std::ffi::c_void
	{
		gl::load_with(loadfn);
		RawGl { _private: () }
	}
}

impl GraphicsBackend for RawGl {
	fn create_buffer(&mut self) -> BufferName {
		let mut name = 0;
		unsafe {
			gl::GenBuffers(1, &mut name);
		}
		BufferName(name)
	}

	fn delete_buffer(&mut self, name: BufferName) {
		unsafe {
			gl::DeleteBuffers(1, &name.0);
		}
	}

	fn create_texture(&mut self) -> TextureName {
		let mut name = 0;
		unsafe {
			gl::GenTextures(1, &mut name);
		}
		TextureName(name)
	}

	fn delete_texture(&mut self, name: TextureName) {
		unsafe {
			gl::DeleteTextures(1, &name.0);
		}
	}

	fn create_program(&mut self) -> ProgramName {
		ProgramName(unsafe { gl::CreateProgram() })
	}

	fn delete_program(&mut self, name: ProgramName) {
		unsafe {
			gl::DeleteProgram(name.0);
		}
	}

	fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderName, String> {
		let Ok(src_cstring) = CString::new(source.as_bytes()) else {
			return Err("shader source contains a nul byte".to_owned());
		};

		unsafe {
			let name = gl::CreateShader(stage as u32);

			gl::ShaderSource(name, 1, &src_cstring.as_ptr(), std::ptr::null());
			gl::CompileShader(name);

			let mut status = 0;
			gl::GetShaderiv(name, gl::COMPILE_STATUS, &mut status);

			if status == 0 {
				let mut buf = [0u8; 1024];
				let mut len = 0;
				gl::GetShaderInfoLog(name, buf.len() as _, &mut len, buf.as_mut_ptr() as _);

				gl::DeleteShader(name);

				return Err(String::from_utf8_lossy(&buf[..len as usize]).into_owned());
			}

			Ok(ShaderName(name))
		}
	}

	fn attach_shader(&mut self, program: ProgramName, shader: ShaderName) {
		unsafe {
			gl::AttachShader(program.0, shader.0);
		}
	}

	fn link_program(&mut self, program: ProgramName) -> Result<(), String> {
		unsafe {
			gl::LinkProgram(program.0);

			let mut status = 0;
			gl::GetProgramiv(program.0, gl::LINK_STATUS, &mut status);

			if status == 0 {
				let mut buf = [0u8; 1024];
				let mut len = 0;
				gl::GetProgramInfoLog(program.0, buf.len() as _, &mut len, buf.as_mut_ptr() as _);

				return Err(String::from_utf8_lossy(&buf[..len as usize]).into_owned());
			}
		}

		Ok(())
	}

	fn use_program(&mut self, program: Option<ProgramName>) {
		unsafe {
			gl::UseProgram(program.map_or(0, |p| p.0));
		}
	}

	fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferName>) {
		unsafe {
			gl::BindBuffer(target as u32, buffer.map_or(0, |b| b.0));
		}
	}

	fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
		unsafe {
			gl::BufferData(target as u32, data.len() as isize, data.as_ptr() as *const _, gl::STATIC_DRAW);
		}
	}

	fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
		unsafe {
			gl::BufferSubData(target as u32, offset as isize, data.len() as isize, data.as_ptr() as *const _);
		}
	}

	fn bind_texture(&mut self, texture: Option<TextureName>) {
		unsafe {
			gl::BindTexture(gl::TEXTURE_2D, texture.map_or(0, |t| t.0));
		}
	}

	fn active_texture(&mut self, unit: u32) {
		unsafe {
			gl::ActiveTexture(gl::TEXTURE0 + unit);
		}
	}

	fn tex_image_2d(&mut self, width: u32, height: u32, format: PixelFormat, data: &[u8]) {
		unsafe {
			gl::TexImage2D(
				gl::TEXTURE_2D,
				0,
				format as u32 as i32,
				width as i32,
				height as i32,
				0,
				format as u32,
				gl::UNSIGNED_BYTE,
				data.as_ptr() as *const _,
			);
		}
	}

	fn tex_filter(&mut self, min: FilterMode, mag: FilterMode) {
		unsafe {
			gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min as u32 as i32);
			gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag as u32 as i32);
		}
	}

	fn tex_wrap(&mut self, s: WrapMode, t: WrapMode) {
		unsafe {
			gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, s as u32 as i32);
			gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, t as u32 as i32);
		}
	}

	fn attrib_location(&mut self, program: ProgramName, name: &str) -> Option<AttribLocation> {
		let Ok(name) = CString::new(name.as_bytes()) else {
			return None;
		};

		let location = unsafe { gl::GetAttribLocation(program.0, name.as_ptr()) };
		(location >= 0).then(|| AttribLocation(location as u32))
	}

	fn enable_attrib(&mut self, location: AttribLocation) {
		unsafe {
			gl::EnableVertexAttribArray(location.0);
		}
	}

	fn disable_attrib(&mut self, location: AttribLocation) {
		unsafe {
			gl::DisableVertexAttribArray(location.0);
		}
	}

	fn attrib_pointer(&mut self, location: AttribLocation, dims: u8, kind: AttribKind, stride: i32, offset: usize) {
		let kind = match kind {
			AttribKind::Float => gl::FLOAT,
			AttribKind::Int => gl::INT,
		};

		unsafe {
			gl::VertexAttribPointer(
				location.0,
				dims as i32,
				kind,
				gl::FALSE,
				stride,
				offset as *const _,
			);
		}
	}

	fn uniform_location(&mut self, program: ProgramName, name: &str) -> Option<UniformLocation> {
		let Ok(name) = CString::new(name.as_bytes()) else {
			return None;
		};

		let location = unsafe { gl::GetUniformLocation(program.0, name.as_ptr()) };
		(location >= 0).then_some(UniformLocation(location))
	}

	fn set_uniform_floats(&mut self, location: UniformLocation, dims: u8, values: &[f32]) {
		let count = (values.len() / dims.max(1) as usize).max(1) as i32;
		let ptr = values.as_ptr();

		unsafe {
			match dims {
				1 => gl::Uniform1fv(location.0, count, ptr),
				2 => gl::Uniform2fv(location.0, count, ptr),
				3 => gl::Uniform3fv(location.0, count, ptr),
				_ => gl::Uniform4fv(location.0, count, ptr),
			}
		}
	}

	fn set_uniform_ints(&mut self, location: UniformLocation, dims: u8, values: &[i32]) {
		let count = (values.len() / dims.max(1) as usize).max(1) as i32;
		let ptr = values.as_ptr();

		unsafe {
			match dims {
				1 => gl::Uniform1iv(location.0, count, ptr),
				2 => gl::Uniform2iv(location.0, count, ptr),
				3 => gl::Uniform3iv(location.0, count, ptr),
				_ => gl::Uniform4iv(location.0, count, ptr),
			}
		}
	}

	fn set_uniform_matrix(&mut self, location: UniformLocation, dims: u8, values: &[f32]) {
		let elements = (dims as usize * dims as usize).max(1);
		let count = (values.len() / elements).max(1) as i32;
		let ptr = values.as_ptr();

		// GLIR matrices arrive column-major already; never transpose.
		unsafe {
			match dims {
				2 => gl::UniformMatrix2fv(location.0, count, gl::FALSE, ptr),
				3 => gl::UniformMatrix3fv(location.0, count, gl::FALSE, ptr),
				_ => gl::UniformMatrix4fv(location.0, count, gl::FALSE, ptr),
			}
		}
	}

	fn draw_arrays(&mut self, mode: DrawMode, start: i32, count: i32) {
		unsafe {
			gl::DrawArrays(mode as u32, start, count);
		}
	}

	fn draw_elements(&mut self, mode: DrawMode, count: i32, kind: IndexKind) {
		unsafe {
			gl::DrawElements(mode as u32, count, kind as u32, std::ptr::null());
		}
	}

	fn call(&mut self, name: &str, args: &[Value]) -> Result<(), GlirError> {
		match name {
			"clear" => {
				let mask = enum_arg(args, 0)?;
				unsafe {
					gl::Clear(mask);
				}
			}

			"clearColor" => {
				let [r, g, b, a] = [
					float_arg(args, 0)?,
					float_arg(args, 1)?,
					float_arg(args, 2)?,
					float_arg(args, 3)?,
				];
				unsafe {
					gl::ClearColor(r, g, b, a);
				}
			}

			"enable" => {
				let cap = enum_arg(args, 0)?;
				unsafe {
					gl::Enable(cap);
				}
			}

			"disable" => {
				let cap = enum_arg(args, 0)?;
				unsafe {
					gl::Disable(cap);
				}
			}

			"viewport" => {
				let [x, y, w, h] = [
					int_arg(args, 0)?,
					int_arg(args, 1)?,
					int_arg(args, 2)?,
					int_arg(args, 3)?,
				];
				unsafe {
					gl::Viewport(x, y, w, h);
				}
			}

			"depthFunc" => {
				let func = enum_arg(args, 0)?;
				unsafe {
					gl::DepthFunc(func);
				}
			}

			"blendFunc" => {
				let src = enum_arg(args, 0)?;
				let dst = enum_arg(args, 1)?;
				unsafe {
					gl::BlendFunc(src, dst);
				}
			}

			"lineWidth" => {
				let width = float_arg(args, 0)?;
				unsafe {
					gl::LineWidth(width);
				}
			}

			"pixelStorei" => {
				let pname = enum_arg(args, 0)?;
				let value = int_arg(args, 1)?;
				unsafe {
					gl::PixelStorei(pname, value);
				}
			}

			_ => return Err(GlirError::UnsupportedCommand(name.to_owned())),
		}

		Ok(())
	}

	fn viewport(&mut self, width: u32, height: u32) {
		unsafe {
			gl::Viewport(0, 0, width as i32, height as i32);
		}
	}

	fn clear(&mut self, color: [f32; 4]) {
		unsafe {
			gl::ClearColor(color[0], color[1], color[2], color[3]);
			gl::Clear(gl::COLOR_BUFFER_BIT);
		}
	}
}


/// Symbolic GL enums the passthrough command may name as strings.
pub(crate) fn gl_enum(name: &str) -> Option<u32> {
	Some(match name {
		"COLOR_BUFFER_BIT" => gl::COLOR_BUFFER_BIT,
		"DEPTH_BUFFER_BIT" => gl::DEPTH_BUFFER_BIT,
		"STENCIL_BUFFER_BIT" => gl::STENCIL_BUFFER_BIT,

		"DEPTH_TEST" => gl::DEPTH_TEST,
		"BLEND" => gl::BLEND,
		"CULL_FACE" => gl::CULL_FACE,
		"SCISSOR_TEST" => gl::SCISSOR_TEST,
		"STENCIL_TEST" => gl::STENCIL_TEST,

		"NEVER" => gl::NEVER,
		"LESS" => gl::LESS,
		"EQUAL" => gl::EQUAL,
		"LEQUAL" => gl::LEQUAL,
		"GREATER" => gl::GREATER,
		"NOTEQUAL" => gl::NOTEQUAL,
		"GEQUAL" => gl::GEQUAL,
		"ALWAYS" => gl::ALWAYS,

		"ZERO" => gl::ZERO,
		"ONE" => gl::ONE,
		"SRC_COLOR" => gl::SRC_COLOR,
		"ONE_MINUS_SRC_COLOR" => gl::ONE_MINUS_SRC_COLOR,
		"SRC_ALPHA" => gl::SRC_ALPHA,
		"ONE_MINUS_SRC_ALPHA" => gl::ONE_MINUS_SRC_ALPHA,
		"DST_ALPHA" => gl::DST_ALPHA,
		"ONE_MINUS_DST_ALPHA" => gl::ONE_MINUS_DST_ALPHA,

		"UNPACK_ALIGNMENT" => gl::UNPACK_ALIGNMENT,
		"PACK_ALIGNMENT" => gl::PACK_ALIGNMENT,

		_ => return None,
	})
}

fn enum_arg(args: &[Value], index: usize) -> Result<u32, GlirError> {
	let value = args.get(index)
		.ok_or_else(|| GlirError::malformed(format!("missing argument {index}")))?;

	match value {
		Value::Str(name) => gl_enum(name)
			.ok_or_else(|| GlirError::malformed(format!("unknown GL enum '{name}'"))),
		Value::Int(v) => Ok(*v as u32),
		other => Err(GlirError::malformed(
			format!("argument {index} must be a GL enum, got {other:?}"))),
	}
}

fn int_arg(args: &[Value], index: usize) -> Result<i32, GlirError> {
	args.get(index)
		.and_then(Value::as_i64)
		.map(|v| v as i32)
		.ok_or_else(|| GlirError::malformed(format!("argument {index} must be an integer")))
}

fn float_arg(args: &[Value], index: usize) -> Result<f32, GlirError> {
	args.get(index)
		.and_then(Value::as_f64)
		.map(|v| v as f32)
		.ok_or_else(|| GlirError::malformed(format!("argument {index} must be a number")))
}


#[cfg(test)]
mod tests {
	use super::gl_enum;

	#[test]
	fn enum_lookup_covers_passthrough_vocabulary() {
		assert_eq!(gl_enum("DEPTH_TEST"), Some(gl::DEPTH_TEST));
		assert_eq!(gl_enum("SRC_ALPHA"), Some(gl::SRC_ALPHA));
		assert_eq!(gl_enum("COLOR_BUFFER_BIT"), Some(gl::COLOR_BUFFER_BIT));
		assert_eq!(gl_enum("NOT_A_THING"), None);
	}
}
