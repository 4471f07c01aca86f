use crate::backend::{
	AttribKind, AttribLocation, BufferTarget, DrawMode, GraphicsBackend, PixelFormat, ShaderName,
	ShaderStage,
};
use crate::command::{AttribType, Command, ObjectClass, Selection, UniformSetter, UniformValue, Value};
use crate::error::GlirError;
use crate::namespace::{
	AttributeBinding, BufferEntry, Entry, Namespace, ProgramEntry, TextureBinding, TextureEntry,
	UniformBinding,
};

use log::{debug, error, trace, warn};

use std::collections::hash_map;


/// Drawing surface dimensions, captured from the surface provider at
/// session start.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct Surface {
	pub width: u32,
	pub height: u32,
}


/// The command interpreter. Owns the backend and the per-session object
/// namespace; commands are executed strictly in the order they are handed
/// in, each one running to completion before the next.
#[derive(Debug)]
pub struct Interpreter<B> {
	backend: B,
	surface: Surface,
	namespace: Namespace,
}

impl<B: GraphicsBackend> Interpreter<B> {
	pub fn new(backend: B, surface: Surface) -> Interpreter<B> {
		Interpreter {
			backend,
			surface,
			namespace: Namespace::new(),
		}
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn namespace(&self) -> &Namespace {
		&self.namespace
	}

	pub fn surface(&self) -> Surface {
		self.surface
	}

	pub fn into_backend(self) -> B {
		self.backend
	}

	/// Parse and execute one `(name, args)` command tuple.
	pub fn execute_raw(&mut self, name: &str, args: &[Value]) -> Result<(), GlirError> {
		let command = Command::parse(name, args)?;
		self.execute(command)
	}

	pub fn execute(&mut self, command: Command) -> Result<(), GlirError> {
		match command {
			Command::Create { id, class } => self.create(id, class),
			Command::Delete { id } => self.delete(&id),
			Command::Shaders { program, vertex, fragment } => self.shaders(&program, &vertex, &fragment),
			Command::Data { id, offset, payload, shape, format } => {
				self.data(&id, offset, &payload, shape, format)
			}
			Command::Attribute { program, name, ty, vbo, stride, offset } => {
				self.attribute(&program, name, ty, vbo, stride, offset)
			}
			Command::Uniform { program, name, setter, value } => {
				self.uniform(&program, name, setter, &value)
			}
			Command::Texture { program, texture, sampler, unit } => {
				self.texture(&program, texture, sampler, unit)
			}
			Command::Interpolation { texture, min, mag } => {
				let handle = self.namespace.texture(&texture)?.handle;
				debug!("setting interpolation of texture '{texture}' to {min:?}/{mag:?}");
				self.backend.bind_texture(Some(handle));
				self.backend.tex_filter(min, mag);
				self.backend.bind_texture(None);
				Ok(())
			}
			Command::Wrapping { texture, wrap_s, wrap_t } => {
				let handle = self.namespace.texture(&texture)?.handle;
				debug!("setting wrapping of texture '{texture}' to {wrap_s:?}/{wrap_t:?}");
				self.backend.bind_texture(Some(handle));
				self.backend.tex_wrap(wrap_s, wrap_t);
				self.backend.bind_texture(None);
				Ok(())
			}
			Command::Draw { program, mode, selection } => self.draw(&program, mode, &selection),
			Command::Func { name, args } => self.backend.call(&name, &args),
		}
	}

	/// Full-surface viewport, from the surface provider's dimensions.
	pub fn viewport(&mut self) {
		self.backend.viewport(self.surface.width, self.surface.height);
	}

	pub fn clear(&mut self, color: [f32; 4]) {
		self.backend.clear(color);
	}

	fn create(&mut self, id: String, class: ObjectClass) -> Result<(), GlirError> {
		let entry = match class {
			ObjectClass::VertexBuffer => {
				debug!("creating vertex buffer '{id}'");
				Entry::VertexBuffer(BufferEntry { handle: self.backend.create_buffer(), size: 0 })
			}
			ObjectClass::IndexBuffer => {
				debug!("creating index buffer '{id}'");
				Entry::IndexBuffer(BufferEntry { handle: self.backend.create_buffer(), size: 0 })
			}
			ObjectClass::Texture2D => {
				debug!("creating texture '{id}'");
				Entry::Texture2D(TextureEntry { handle: self.backend.create_texture(), size: 0 })
			}
			ObjectClass::Program => {
				debug!("creating program '{id}'");
				Entry::Program(ProgramEntry::new(self.backend.create_program()))
			}
		};

		self.namespace.insert(id, entry);
		Ok(())
	}

	fn delete(&mut self, id: &str) -> Result<(), GlirError> {
		match self.namespace.remove(id)? {
			Entry::VertexBuffer(buffer) => {
				debug!("deleting vertex buffer '{id}'");
				self.backend.delete_buffer(buffer.handle);
			}
			Entry::IndexBuffer(buffer) => {
				debug!("deleting index buffer '{id}'");
				self.backend.delete_buffer(buffer.handle);
			}
			Entry::Texture2D(texture) => {
				debug!("deleting texture '{id}'");
				self.backend.delete_texture(texture.handle);
			}
			Entry::Program(program) => {
				debug!("deleting program '{id}'");
				self.backend.delete_program(program.handle);
			}
		}

		Ok(())
	}

	/// Compile both stages and link them into the program. Compile and link
	/// failures are reported through the log and never abort the stream; a
	/// failed stage is simply not attached.
	fn shaders(&mut self, program_id: &str, vertex: &str, fragment: &str) -> Result<(), GlirError> {
		let handle = self.namespace.program(program_id)?.handle;

		debug!("compiling shaders for program '{program_id}'");
		let vs = self.compile_stage(program_id, ShaderStage::Vertex, vertex);
		let fs = self.compile_stage(program_id, ShaderStage::Fragment, fragment);

		if let Some(vs) = vs {
			self.backend.attach_shader(handle, vs);
		}
		if let Some(fs) = fs {
			self.backend.attach_shader(handle, fs);
		}

		if let Err(info_log) = self.backend.link_program(handle) {
			warn!("could not link program '{program_id}': {info_log}");
		}

		Ok(())
	}

	fn compile_stage(&mut self, program_id: &str, stage: ShaderStage, source: &str) -> Option<ShaderName> {
		match self.backend.compile_shader(stage, source) {
			Ok(shader) => Some(shader),
			Err(info_log) => {
				error!("{stage:?} shader of program '{program_id}' failed to compile: {info_log}");
				None
			}
		}
	}

	fn data(
		&mut self,
		id: &str,
		offset: usize,
		payload: &[u8],
		shape: Option<(u32, u32)>,
		format: Option<PixelFormat>,
	) -> Result<(), GlirError> {
		let Interpreter { backend, namespace, .. } = self;

		match namespace.lookup_mut(id)? {
			// Textures are fully reallocated on every upload; the offset
			// argument is accepted but never applied to them.
			Entry::Texture2D(texture) => {
				let (width, height) = shape
					.ok_or_else(|| GlirError::malformed("texture data requires a [width, height] shape"))?;
				let format = format
					.ok_or_else(|| GlirError::malformed("texture data requires a pixel format"))?;

				debug!("allocating {width}x{height} {format:?} texture '{id}'");
				backend.bind_texture(Some(texture.handle));
				backend.tex_image_2d(width, height, format, payload);
				texture.size = payload.len();
				Ok(())
			}

			Entry::VertexBuffer(buffer) => {
				Self::upload_buffer(backend, BufferTarget::Array, id, buffer, offset, payload);
				Ok(())
			}

			Entry::IndexBuffer(buffer) => {
				Self::upload_buffer(backend, BufferTarget::ElementArray, id, buffer, offset, payload);
				Ok(())
			}

			Entry::Program(_) => Err(GlirError::reference(id, "buffer or texture")),
		}
	}

	/// First upload allocates the buffer and fixes its size; every later
	/// upload is a sub-range update that leaves the size untouched.
	fn upload_buffer(
		backend: &mut B,
		target: BufferTarget,
		id: &str,
		buffer: &mut BufferEntry,
		offset: usize,
		payload: &[u8],
	) {
		backend.bind_buffer(target, Some(buffer.handle));

		if buffer.size == 0 {
			debug!("allocating {} bytes in buffer '{id}'", payload.len());
			backend.buffer_data(target, payload);
			buffer.size = payload.len();
		} else {
			debug!("updating {} bytes in buffer '{id}' at offset {offset}", payload.len());
			backend.buffer_sub_data(target, offset, payload);
		}
	}

	fn attribute(
		&mut self,
		program_id: &str,
		name: String,
		ty: AttribType,
		vbo: String,
		stride: i32,
		offset: usize,
	) -> Result<(), GlirError> {
		let Interpreter { backend, namespace, .. } = self;
		let program = namespace.program_mut(program_id)?;

		debug!("registering attribute '{name}' on program '{program_id}'");
		let Some(location) = backend.attrib_location(program.handle, &name) else {
			warn!("program '{program_id}' has no attribute '{name}'");
			return Ok(());
		};

		program.attributes.insert(name, AttributeBinding {
			location,
			ty,
			vbo_id: vbo,
			stride,
			offset,
		});
		Ok(())
	}

	/// On the first UNIFORM for a name the backend location and upload
	/// routine are resolved and cached; every call, cached or not, applies
	/// the value.
	fn uniform(
		&mut self,
		program_id: &str,
		name: String,
		setter: UniformSetter,
		value: &UniformValue,
	) -> Result<(), GlirError> {
		let Interpreter { backend, namespace, .. } = self;
		let program = namespace.program_mut(program_id)?;
		let handle = program.handle;

		backend.use_program(Some(handle));

		let binding = match program.uniforms.entry(name) {
			hash_map::Entry::Occupied(entry) => entry.into_mut(),
			hash_map::Entry::Vacant(entry) => {
				debug!("resolving uniform '{}' on program '{program_id}'", entry.key());
				let location = backend.uniform_location(handle, entry.key());
				if location.is_none() {
					warn!("program '{program_id}' has no uniform '{}'", entry.key());
				}
				entry.insert(UniformBinding { location, setter })
			}
		};

		let Some(location) = binding.location else {
			return Ok(());
		};

		match binding.setter {
			UniformSetter::Vector { kind: AttribKind::Float, dims } => {
				backend.set_uniform_floats(location, dims, &value.to_floats());
			}
			UniformSetter::Vector { kind: AttribKind::Int, dims } => {
				backend.set_uniform_ints(location, dims, &value.to_ints());
			}
			UniformSetter::Matrix { dims } => {
				backend.set_uniform_matrix(location, dims, &value.to_floats());
			}
		}

		Ok(())
	}

	/// Associate a texture with a program's sampler uniform and a texture
	/// unit. The sampler value is set immediately; the unit is bound at
	/// draw time.
	fn texture(
		&mut self,
		program_id: &str,
		texture_id: String,
		sampler: String,
		unit: u32,
	) -> Result<(), GlirError> {
		let handle = self.namespace.texture(&texture_id)?.handle;

		let Interpreter { backend, namespace, .. } = self;
		let program = namespace.program_mut(program_id)?;

		debug!("binding texture '{texture_id}' to sampler '{sampler}' of program '{program_id}' (unit {unit})");
		let sampler_location = backend.uniform_location(program.handle, &sampler);
		match sampler_location {
			Some(location) => backend.set_uniform_ints(location, 1, &[unit as i32]),
			None => warn!("program '{program_id}' has no sampler '{sampler}'"),
		}

		program.textures.insert(texture_id, TextureBinding {
			sampler_name: sampler,
			sampler_location,
			unit,
			handle,
		});
		Ok(())
	}

	fn draw(&mut self, program_id: &str, mode: DrawMode, selection: &Selection) -> Result<(), GlirError> {
		let Interpreter { backend, namespace, .. } = self;
		let program = namespace.program(program_id)?;

		trace!("drawing program '{program_id}' with {mode:?}");

		let mut activated = Vec::with_capacity(program.attributes.len());
		let result = draw_inner(backend, namespace, program, mode, selection, &mut activated);

		// Whatever the draw outcome, every attribute activated above is
		// deactivated before the next command runs.
		for location in activated.into_iter().rev() {
			backend.disable_attrib(location);
		}

		result
	}
}


fn draw_inner<B: GraphicsBackend>(
	backend: &mut B,
	namespace: &Namespace,
	program: &ProgramEntry,
	mode: DrawMode,
	selection: &Selection,
	activated: &mut Vec<AttribLocation>,
) -> Result<(), GlirError> {
	for (name, attribute) in &program.attributes {
		trace!("activating attribute '{name}'");
		let vbo = namespace.vertex_buffer(&attribute.vbo_id)?;

		backend.enable_attrib(attribute.location);
		backend.bind_buffer(BufferTarget::Array, Some(vbo.handle));
		backend.attrib_pointer(
			attribute.location,
			attribute.ty.dims,
			attribute.ty.kind,
			attribute.stride,
			attribute.offset,
		);
		activated.push(attribute.location);
	}

	for (texture_id, texture) in &program.textures {
		trace!("activating texture '{texture_id}' on unit {}", texture.unit);
		backend.active_texture(texture.unit);
		backend.bind_texture(Some(texture.handle));
	}

	backend.use_program(Some(program.handle));

	match selection {
		Selection::Arrays { start, count } => {
			backend.draw_arrays(mode, *start, *count);
		}
		Selection::Elements { index_buffer, kind, count } => {
			let index = namespace.index_buffer(index_buffer)?;
			backend.bind_buffer(BufferTarget::ElementArray, Some(index.handle));
			backend.draw_elements(mode, *count, *kind);
		}
	}

	Ok(())
}
