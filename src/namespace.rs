use crate::backend::{AttribLocation, BufferName, ProgramName, TextureName, UniformLocation};
use crate::command::{AttribType, UniformSetter};
use crate::error::GlirError;

use std::collections::HashMap;


/// Vertex attribute registered on a program. `vbo_id` references a
/// VertexBuffer entry by id; the binding never owns the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBinding {
	pub location: AttribLocation,
	pub ty: AttribType,
	pub vbo_id: String,
	pub stride: i32,
	pub offset: usize,
}

/// Cached uniform resolution. The location query and setter selection happen
/// once; later UNIFORM commands reuse this record and only re-apply the value.
/// A `None` location means the backend knows no uniform by that name and
/// applies are silently skipped, as the underlying context would.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
	pub location: Option<UniformLocation>,
	pub setter: UniformSetter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
	pub sampler_name: String,
	pub sampler_location: Option<UniformLocation>,
	pub unit: u32,
	pub handle: TextureName,
}


#[derive(Debug, Clone, PartialEq)]
pub struct BufferEntry {
	pub handle: BufferName,
	/// Allocated byte length. Zero until the first DATA command; the
	/// transition from zero happens exactly once per allocation lifetime.
	pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureEntry {
	pub handle: TextureName,
	/// Byte length of the most recent upload; textures are fully
	/// reallocated on every DATA command.
	pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramEntry {
	pub handle: ProgramName,
	pub attributes: HashMap<String, AttributeBinding>,
	pub uniforms: HashMap<String, UniformBinding>,
	pub textures: HashMap<String, TextureBinding>,
}

impl ProgramEntry {
	pub(crate) fn new(handle: ProgramName) -> ProgramEntry {
		ProgramEntry {
			handle,
			attributes: HashMap::new(),
			uniforms: HashMap::new(),
			textures: HashMap::new(),
		}
	}
}


/// One namespace record. The caller-chosen id is the map key; the class is
/// carried by the variant so a command that expects one class cannot
/// misread another's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
	VertexBuffer(BufferEntry),
	IndexBuffer(BufferEntry),
	Texture2D(TextureEntry),
	Program(ProgramEntry),
}


/// Id-indexed table of all objects owned by a session. Every component
/// reads and writes backend resources through this table exclusively.
#[derive(Debug, Default)]
pub struct Namespace {
	entries: HashMap<String, Entry>,
}

impl Namespace {
	pub fn new() -> Namespace {
		Namespace::default()
	}

	pub fn get(&self, id: &str) -> Option<&Entry> {
		self.entries.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Overwrites any existing entry with the same id. The previous backend
	/// handle is leaked in that case; guarding against it is the caller's
	/// responsibility.
	pub(crate) fn insert(&mut self, id: String, entry: Entry) {
		self.entries.insert(id, entry);
	}

	pub(crate) fn remove(&mut self, id: &str) -> Result<Entry, GlirError> {
		self.entries.remove(id)
			.ok_or_else(|| GlirError::reference(id, "object"))
	}

	pub(crate) fn lookup_mut(&mut self, id: &str) -> Result<&mut Entry, GlirError> {
		self.entries.get_mut(id)
			.ok_or_else(|| GlirError::reference(id, "object"))
	}

	pub(crate) fn vertex_buffer(&self, id: &str) -> Result<&BufferEntry, GlirError> {
		match self.entries.get(id) {
			Some(Entry::VertexBuffer(buffer)) => Ok(buffer),
			_ => Err(GlirError::reference(id, "vertex buffer")),
		}
	}

	pub(crate) fn index_buffer(&self, id: &str) -> Result<&BufferEntry, GlirError> {
		match self.entries.get(id) {
			Some(Entry::IndexBuffer(buffer)) => Ok(buffer),
			_ => Err(GlirError::reference(id, "index buffer")),
		}
	}

	pub(crate) fn texture(&self, id: &str) -> Result<&TextureEntry, GlirError> {
		match self.entries.get(id) {
			Some(Entry::Texture2D(texture)) => Ok(texture),
			_ => Err(GlirError::reference(id, "texture")),
		}
	}

	pub(crate) fn program(&self, id: &str) -> Result<&ProgramEntry, GlirError> {
		match self.entries.get(id) {
			Some(Entry::Program(program)) => Ok(program),
			_ => Err(GlirError::reference(id, "program")),
		}
	}

	pub(crate) fn program_mut(&mut self, id: &str) -> Result<&mut ProgramEntry, GlirError> {
		match self.entries.get_mut(id) {
			Some(Entry::Program(program)) => Ok(program),
			_ => Err(GlirError::reference(id, "program")),
		}
	}
}
