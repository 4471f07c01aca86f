pub mod raw_gl;
pub mod recording;

pub use self::raw_gl::RawGl;
pub use self::recording::{Call, RecordingBackend};

use crate::command::Value;
use crate::error::GlirError;

use std::str::FromStr;


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct BufferName(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct TextureName(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct ProgramName(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct ShaderName(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct AttribLocation(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct UniformLocation(pub i32);


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum ShaderStage {
	Vertex = gl::VERTEX_SHADER,
	Fragment = gl::FRAGMENT_SHADER,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum BufferTarget {
	Array = gl::ARRAY_BUFFER,
	ElementArray = gl::ELEMENT_ARRAY_BUFFER,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum DrawMode {
	Points = gl::POINTS,
	Lines = gl::LINES,
	LineLoop = gl::LINE_LOOP,
	LineStrip = gl::LINE_STRIP,
	Triangles = gl::TRIANGLES,
	TriangleStrip = gl::TRIANGLE_STRIP,
	TriangleFan = gl::TRIANGLE_FAN,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum IndexKind {
	UnsignedByte = gl::UNSIGNED_BYTE,
	UnsignedShort = gl::UNSIGNED_SHORT,
	UnsignedInt = gl::UNSIGNED_INT,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum FilterMode {
	Nearest = gl::NEAREST,
	Linear = gl::LINEAR,
	NearestMipmapNearest = gl::NEAREST_MIPMAP_NEAREST,
	LinearMipmapNearest = gl::LINEAR_MIPMAP_NEAREST,
	NearestMipmapLinear = gl::NEAREST_MIPMAP_LINEAR,
	LinearMipmapLinear = gl::LINEAR_MIPMAP_LINEAR,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum WrapMode {
	Repeat = gl::REPEAT,
	ClampToEdge = gl::CLAMP_TO_EDGE,
	MirroredRepeat = gl::MIRRORED_REPEAT,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum PixelFormat {
	Rgba = gl::RGBA,
	Rgb = gl::RGB,
	Red = gl::RED,
}

/// Base scalar kind of an attribute or uniform, from the leading character
/// of its type tag.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum AttribKind {
	Float,
	Int,
}


impl FromStr for DrawMode {
	type Err = GlirError;

	fn from_str(s: &str) -> Result<DrawMode, GlirError> {
		Ok(match s {
			"POINTS" => DrawMode::Points,
			"LINES" => DrawMode::Lines,
			"LINE_LOOP" => DrawMode::LineLoop,
			"LINE_STRIP" => DrawMode::LineStrip,
			"TRIANGLES" => DrawMode::Triangles,
			"TRIANGLE_STRIP" => DrawMode::TriangleStrip,
			"TRIANGLE_FAN" => DrawMode::TriangleFan,
			_ => return Err(GlirError::malformed(format!("unknown draw mode '{s}'"))),
		})
	}
}

impl FromStr for IndexKind {
	type Err = GlirError;

	fn from_str(s: &str) -> Result<IndexKind, GlirError> {
		Ok(match s {
			"UNSIGNED_BYTE" => IndexKind::UnsignedByte,
			"UNSIGNED_SHORT" => IndexKind::UnsignedShort,
			"UNSIGNED_INT" => IndexKind::UnsignedInt,
			_ => return Err(GlirError::malformed(format!("unknown index element type '{s}'"))),
		})
	}
}

impl FromStr for FilterMode {
	type Err = GlirError;

	fn from_str(s: &str) -> Result<FilterMode, GlirError> {
		Ok(match s {
			"NEAREST" => FilterMode::Nearest,
			"LINEAR" => FilterMode::Linear,
			"NEAREST_MIPMAP_NEAREST" => FilterMode::NearestMipmapNearest,
			"LINEAR_MIPMAP_NEAREST" => FilterMode::LinearMipmapNearest,
			"NEAREST_MIPMAP_LINEAR" => FilterMode::NearestMipmapLinear,
			"LINEAR_MIPMAP_LINEAR" => FilterMode::LinearMipmapLinear,
			_ => return Err(GlirError::malformed(format!("unknown filter mode '{s}'"))),
		})
	}
}

impl FromStr for WrapMode {
	type Err = GlirError;

	fn from_str(s: &str) -> Result<WrapMode, GlirError> {
		Ok(match s {
			"REPEAT" => WrapMode::Repeat,
			"CLAMP_TO_EDGE" => WrapMode::ClampToEdge,
			"MIRRORED_REPEAT" => WrapMode::MirroredRepeat,
			_ => return Err(GlirError::malformed(format!("unknown wrap mode '{s}'"))),
		})
	}
}

impl FromStr for PixelFormat {
	type Err = GlirError;

	fn from_str(s: &str) -> Result<PixelFormat, GlirError> {
		Ok(match s {
			"RGBA" => PixelFormat::Rgba,
			"RGB" => PixelFormat::Rgb,
			"RED" => PixelFormat::Red,
			_ => return Err(GlirError::malformed(format!("unknown pixel format '{s}'"))),
		})
	}
}


/// Capability interface over the underlying graphics context.
///
/// The backend holds implicit global binding state (currently bound buffer,
/// texture and program). Every operation takes `&mut self`, so two commands
/// cannot interleave their backend calls; the interpreter relies on this and
/// never re-enters the backend while a command is in flight.
pub trait GraphicsBackend {
	fn create_buffer(&mut self) -> BufferName;
	fn delete_buffer(&mut self, name: BufferName);
	fn create_texture(&mut self) -> TextureName;
	fn delete_texture(&mut self, name: TextureName);
	fn create_program(&mut self) -> ProgramName;
	fn delete_program(&mut self, name: ProgramName);

	/// On failure the backend's info log is returned; the shader object is
	/// released before returning.
	fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderName, String>;
	fn attach_shader(&mut self, program: ProgramName, shader: ShaderName);
	fn link_program(&mut self, program: ProgramName) -> Result<(), String>;
	fn use_program(&mut self, program: Option<ProgramName>);

	fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferName>);
	/// Full allocation of the currently bound buffer.
	fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
	/// Sub-range update of the currently bound buffer; never resizes.
	fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]);

	fn bind_texture(&mut self, texture: Option<TextureName>);
	fn active_texture(&mut self, unit: u32);
	/// Full allocation of the currently bound texture.
	fn tex_image_2d(&mut self, width: u32, height: u32, format: PixelFormat, data: &[u8]);
	fn tex_filter(&mut self, min: FilterMode, mag: FilterMode);
	fn tex_wrap(&mut self, s: WrapMode, t: WrapMode);

	fn attrib_location(&mut self, program: ProgramName, name: &str) -> Option<AttribLocation>;
	fn enable_attrib(&mut self, location: AttribLocation);
	fn disable_attrib(&mut self, location: AttribLocation);
	fn attrib_pointer(&mut self, location: AttribLocation, dims: u8, kind: AttribKind, stride: i32, offset: usize);

	fn uniform_location(&mut self, program: ProgramName, name: &str) -> Option<UniformLocation>;
	fn set_uniform_floats(&mut self, location: UniformLocation, dims: u8, values: &[f32]);
	fn set_uniform_ints(&mut self, location: UniformLocation, dims: u8, values: &[i32]);
	/// Matrix upload; implementations pass the no-transpose flag.
	fn set_uniform_matrix(&mut self, location: UniformLocation, dims: u8, values: &[f32]);

	fn draw_arrays(&mut self, mode: DrawMode, start: i32, count: i32);
	fn draw_elements(&mut self, mode: DrawMode, count: i32, kind: IndexKind);

	/// Escape hatch for backend operations with no dedicated command.
	/// String arguments are resolved to the backend's symbolic enums.
	fn call(&mut self, name: &str, args: &[Value]) -> Result<(), GlirError>;

	fn viewport(&mut self, width: u32, height: u32);
	fn clear(&mut self, color: [f32; 4]);
}
