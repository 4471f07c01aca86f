use super::{
	AttribKind, AttribLocation, BufferName, BufferTarget, DrawMode, FilterMode, GraphicsBackend,
	IndexKind, PixelFormat, ProgramName, ShaderName, ShaderStage, TextureName, UniformLocation,
	WrapMode,
};
use crate::command::Value;
use crate::error::GlirError;

use std::collections::HashMap;


/// Everything a `RecordingBackend` is asked to do, in order. Uploads record
/// their byte lengths rather than the payloads themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	CreateBuffer(BufferName),
	DeleteBuffer(BufferName),
	CreateTexture(TextureName),
	DeleteTexture(TextureName),
	CreateProgram(ProgramName),
	DeleteProgram(ProgramName),

	CompileShader(ShaderStage),
	AttachShader(ProgramName, ShaderName),
	LinkProgram(ProgramName),
	UseProgram(Option<ProgramName>),

	BindBuffer(BufferTarget, Option<BufferName>),
	BufferData(BufferTarget, usize),
	BufferSubData(BufferTarget, usize, usize),

	BindTexture(Option<TextureName>),
	ActiveTexture(u32),
	TexImage2D(u32, u32, PixelFormat, usize),
	TexFilter(FilterMode, FilterMode),
	TexWrap(WrapMode, WrapMode),

	AttribLocationQuery(ProgramName, String),
	EnableAttrib(AttribLocation),
	DisableAttrib(AttribLocation),
	AttribPointer(AttribLocation, u8, AttribKind, i32, usize),

	UniformLocationQuery(ProgramName, String),
	UniformFloats(UniformLocation, u8, Vec<f32>),
	UniformInts(UniformLocation, u8, Vec<i32>),
	UniformMatrix(UniformLocation, u8, Vec<f32>),

	DrawArrays(DrawMode, i32, i32),
	DrawElements(DrawMode, i32, IndexKind),

	Func(String, Vec<Value>),
	Viewport(u32, u32),
	Clear([f32; 4]),
}


/// Headless backend that mints sequential handles and records every call.
/// Location queries hand out stable per-(program, name) locations, so the
/// call log can tell a cache hit from a re-resolution.
#[derive(Debug, Default)]
pub struct RecordingBackend {
	pub calls: Vec<Call>,
	/// When set, the next shader compilations fail with this diagnostic.
	pub compile_error: Option<String>,

	next_name: u32,
	next_location: u32,
	attrib_locations: HashMap<(ProgramName, String), AttribLocation>,
	uniform_locations: HashMap<(ProgramName, String), UniformLocation>,
}

impl RecordingBackend {
	pub fn new() -> RecordingBackend {
		RecordingBackend::default()
	}

	pub fn calls_matching(&self, predicate: impl Fn(&Call) -> bool) -> Vec<&Call> {
		self.calls.iter().filter(|call| predicate(call)).collect()
	}

	fn next_name(&mut self) -> u32 {
		self.next_name += 1;
		self.next_name
	}

	fn next_location(&mut self) -> u32 {
		self.next_location += 1;
		self.next_location
	}
}

impl GraphicsBackend for RecordingBackend {
	fn create_buffer(&mut self) -> BufferName {
		let name = BufferName(self.next_name());
		self.calls.push(Call::CreateBuffer(name));
		name
	}

	fn delete_buffer(&mut self, name: BufferName) {
		self.calls.push(Call::DeleteBuffer(name));
	}

	fn create_texture(&mut self) -> TextureName {
		let name = TextureName(self.next_name());
		self.calls.push(Call::CreateTexture(name));
		name
	}

	fn delete_texture(&mut self, name: TextureName) {
		self.calls.push(Call::DeleteTexture(name));
	}

	fn create_program(&mut self) -> ProgramName {
		let name = ProgramName(self.next_name());
		self.calls.push(Call::CreateProgram(name));
		name
	}

	fn delete_program(&mut self, name: ProgramName) {
		self.calls.push(Call::DeleteProgram(name));
	}

	fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderName, String> {
		self.calls.push(Call::CompileShader(stage));

		if let Some(error) = self.compile_error.clone() {
			return Err(error);
		}

		Ok(ShaderName(self.next_name()))
	}

	fn attach_shader(&mut self, program: ProgramName, shader: ShaderName) {
		self.calls.push(Call::AttachShader(program, shader));
	}

	fn link_program(&mut self, program: ProgramName) -> Result<(), String> {
		self.calls.push(Call::LinkProgram(program));
		Ok(())
	}

	fn use_program(&mut self, program: Option<ProgramName>) {
		self.calls.push(Call::UseProgram(program));
	}

	fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferName>) {
		self.calls.push(Call::BindBuffer(target, buffer));
	}

	fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
		self.calls.push(Call::BufferData(target, data.len()));
	}

	fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
		self.calls.push(Call::BufferSubData(target, offset, data.len()));
	}

	fn bind_texture(&mut self, texture: Option<TextureName>) {
		self.calls.push(Call::BindTexture(texture));
	}

	fn active_texture(&mut self, unit: u32) {
		self.calls.push(Call::ActiveTexture(unit));
	}

	fn tex_image_2d(&mut self, width: u32, height: u32, format: PixelFormat, data: &[u8]) {
		self.calls.push(Call::TexImage2D(width, height, format, data.len()));
	}

	fn tex_filter(&mut self, min: FilterMode, mag: FilterMode) {
		self.calls.push(Call::TexFilter(min, mag));
	}

	fn tex_wrap(&mut self, s: WrapMode, t: WrapMode) {
		self.calls.push(Call::TexWrap(s, t));
	}

	fn attrib_location(&mut self, program: ProgramName, name: &str) -> Option<AttribLocation> {
		self.calls.push(Call::AttribLocationQuery(program, name.to_owned()));

		let key = (program, name.to_owned());
		if let Some(&location) = self.attrib_locations.get(&key) {
			return Some(location);
		}

		let location = AttribLocation(self.next_location());
		self.attrib_locations.insert(key, location);
		Some(location)
	}

	fn enable_attrib(&mut self, location: AttribLocation) {
		self.calls.push(Call::EnableAttrib(location));
	}

	fn disable_attrib(&mut self, location: AttribLocation) {
		self.calls.push(Call::DisableAttrib(location));
	}

	fn attrib_pointer(&mut self, location: AttribLocation, dims: u8, kind: AttribKind, stride: i32, offset: usize) {
		self.calls.push(Call::AttribPointer(location, dims, kind, stride, offset));
	}

	fn uniform_location(&mut self, program: ProgramName, name: &str) -> Option<UniformLocation> {
		self.calls.push(Call::UniformLocationQuery(program, name.to_owned()));

		let key = (program, name.to_owned());
		if let Some(&location) = self.uniform_locations.get(&key) {
			return Some(location);
		}

		let location = UniformLocation(self.next_location() as i32);
		self.uniform_locations.insert(key, location);
		Some(location)
	}

	fn set_uniform_floats(&mut self, location: UniformLocation, dims: u8, values: &[f32]) {
		self.calls.push(Call::UniformFloats(location, dims, values.to_vec()));
	}

	fn set_uniform_ints(&mut self, location: UniformLocation, dims: u8, values: &[i32]) {
		self.calls.push(Call::UniformInts(location, dims, values.to_vec()));
	}

	fn set_uniform_matrix(&mut self, location: UniformLocation, dims: u8, values: &[f32]) {
		self.calls.push(Call::UniformMatrix(location, dims, values.to_vec()));
	}

	fn draw_arrays(&mut self, mode: DrawMode, start: i32, count: i32) {
		self.calls.push(Call::DrawArrays(mode, start, count));
	}

	fn draw_elements(&mut self, mode: DrawMode, count: i32, kind: IndexKind) {
		self.calls.push(Call::DrawElements(mode, count, kind));
	}

	fn call(&mut self, name: &str, args: &[Value]) -> Result<(), GlirError> {
		self.calls.push(Call::Func(name.to_owned(), args.to_vec()));
		Ok(())
	}

	fn viewport(&mut self, width: u32, height: u32) {
		self.calls.push(Call::Viewport(width, height));
	}

	fn clear(&mut self, color: [f32; 4]) {
		self.calls.push(Call::Clear(color));
	}
}
