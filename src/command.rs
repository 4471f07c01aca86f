use crate::backend::{AttribKind, DrawMode, FilterMode, IndexKind, PixelFormat, WrapMode};
use crate::error::GlirError;


/// One positional argument of a deserialized command tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Str(String),
	Int(i64),
	Float(f64),
	/// Raw byte payload, used for buffer and texture uploads.
	Bytes(Vec<u8>),
	/// Typed numeric array, used for uniform values.
	Ints(Vec<i32>),
	Floats(Vec<f32>),
	/// Heterogeneous tuple, used for draw selections and texture shapes.
	List(Vec<Value>),
}

impl Value {
	fn kind(&self) -> &'static str {
		match self {
			Value::Str(_) => "string",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Bytes(_) => "bytes",
			Value::Ints(_) => "int array",
			Value::Floats(_) => "float array",
			Value::List(_) => "list",
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			Value::Float(v) => Some(*v as i64),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Int(v) => Some(*v as f64),
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// Byte view of an upload payload. Typed arrays are flattened in native
	/// byte order, the way they already sit in memory.
	pub fn to_bytes(&self) -> Option<Vec<u8>> {
		match self {
			Value::Bytes(bytes) => Some(bytes.clone()),
			Value::Ints(values) => Some(values.iter().flat_map(|v| v.to_ne_bytes()).collect()),
			Value::Floats(values) => Some(values.iter().flat_map(|v| v.to_ne_bytes()).collect()),
			_ => None,
		}
	}
}


/// Object classes the CREATE command can allocate.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum ObjectClass {
	VertexBuffer,
	IndexBuffer,
	Texture2D,
	Program,
}

impl ObjectClass {
	fn parse(s: &str) -> Result<ObjectClass, GlirError> {
		Ok(match s {
			"VertexBuffer" => ObjectClass::VertexBuffer,
			"IndexBuffer" => ObjectClass::IndexBuffer,
			"Texture2D" => ObjectClass::Texture2D,
			"Program" => ObjectClass::Program,
			_ => return Err(GlirError::malformed(format!("unknown object class '{s}'"))),
		})
	}
}


/// Parsed attribute type tag, e.g. "vec3" or "ivec2". Parsed once at
/// registration so draws never re-parse the string.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct AttribType {
	pub kind: AttribKind,
	pub dims: u8,
}

impl AttribType {
	pub fn parse(tag: &str) -> Result<AttribType, GlirError> {
		let kind = if tag == "int" || tag.starts_with('i') {
			AttribKind::Int
		} else {
			AttribKind::Float
		};

		let dims = match tag {
			"int" | "float" => 1,
			_ => tag.chars()
				.last()
				.and_then(|c| c.to_digit(10))
				.filter(|d| (1..=4).contains(d))
				.ok_or_else(|| GlirError::malformed(format!("unknown type tag '{tag}'")))? as u8,
		};

		Ok(AttribType { kind, dims })
	}
}


/// Upload routine selected from a uniform's type tag, cached alongside the
/// resolved location.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum UniformSetter {
	Vector { kind: AttribKind, dims: u8 },
	Matrix { dims: u8 },
}

impl UniformSetter {
	pub fn parse(tag: &str) -> Result<UniformSetter, GlirError> {
		if let Some(rest) = tag.strip_prefix("mat") {
			let dims = rest.parse::<u8>()
				.ok()
				.filter(|d| (2..=4).contains(d))
				.ok_or_else(|| GlirError::malformed(format!("unknown type tag '{tag}'")))?;
			return Ok(UniformSetter::Matrix { dims });
		}

		let AttribType { kind, dims } = AttribType::parse(tag)?;
		Ok(UniformSetter::Vector { kind, dims })
	}
}


#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
	Floats(Vec<f32>),
	Ints(Vec<i32>),
}

impl UniformValue {
	fn parse(value: &Value) -> Result<UniformValue, GlirError> {
		Ok(match value {
			Value::Floats(v) => UniformValue::Floats(v.clone()),
			Value::Ints(v) => UniformValue::Ints(v.clone()),
			Value::Float(v) => UniformValue::Floats(vec![*v as f32]),
			Value::Int(v) => UniformValue::Ints(vec![*v as i32]),
			Value::List(items) => {
				let floats = items.iter()
					.map(|item| item.as_f64().map(|v| v as f32))
					.collect::<Option<Vec<_>>>()
					.ok_or_else(|| GlirError::malformed("uniform value must be numeric"))?;
				UniformValue::Floats(floats)
			}
			other => return Err(GlirError::malformed(
				format!("uniform value must be numeric, got {}", other.kind()))),
		})
	}

	pub fn to_floats(&self) -> Vec<f32> {
		match self {
			UniformValue::Floats(v) => v.clone(),
			UniformValue::Ints(v) => v.iter().map(|&i| i as f32).collect(),
		}
	}

	pub fn to_ints(&self) -> Vec<i32> {
		match self {
			UniformValue::Floats(v) => v.iter().map(|&f| f as i32).collect(),
			UniformValue::Ints(v) => v.clone(),
		}
	}
}


/// Draw range: either a plain `(start, count)` over the bound attributes or
/// `(index_buffer, element_type, count)` for indexed rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
	Arrays { start: i32, count: i32 },
	Elements { index_buffer: String, kind: IndexKind, count: i32 },
}

impl Selection {
	fn parse(value: &Value) -> Result<Selection, GlirError> {
		let Value::List(items) = value else {
			return Err(GlirError::malformed(
				format!("draw selection must be a list, got {}", value.kind())));
		};

		match items.as_slice() {
			[start, count] => {
				let start = start.as_i64()
					.ok_or_else(|| GlirError::malformed("draw start must be an integer"))?;
				let count = count.as_i64()
					.ok_or_else(|| GlirError::malformed("draw count must be an integer"))?;
				Ok(Selection::Arrays { start: start as i32, count: count as i32 })
			}

			[index_buffer, kind, count] => {
				let index_buffer = index_buffer.as_str()
					.ok_or_else(|| GlirError::malformed("indexed draw selection must name an index buffer"))?;
				let kind = kind.as_str()
					.ok_or_else(|| GlirError::malformed("index element type must be a string"))?
					.parse()?;
				let count = count.as_i64()
					.ok_or_else(|| GlirError::malformed("draw count must be an integer"))?;
				Ok(Selection::Elements {
					index_buffer: index_buffer.to_owned(),
					kind,
					count: count as i32,
				})
			}

			items => Err(GlirError::malformed(
				format!("draw selection must have 2 or 3 elements, got {}", items.len()))),
		}
	}
}


/// The closed set of commands the interpreter understands. Adding a command
/// means adding a variant here and a handler arm in the interpreter; there is
/// no runtime handler table.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	Create { id: String, class: ObjectClass },
	Delete { id: String },
	Shaders { program: String, vertex: String, fragment: String },
	Data {
		id: String,
		offset: usize,
		payload: Vec<u8>,
		shape: Option<(u32, u32)>,
		format: Option<PixelFormat>,
	},
	Attribute {
		program: String,
		name: String,
		ty: AttribType,
		vbo: String,
		stride: i32,
		offset: usize,
	},
	Uniform {
		program: String,
		name: String,
		setter: UniformSetter,
		value: UniformValue,
	},
	Texture { program: String, texture: String, sampler: String, unit: u32 },
	Interpolation { texture: String, min: FilterMode, mag: FilterMode },
	Wrapping { texture: String, wrap_s: WrapMode, wrap_t: WrapMode },
	Draw { program: String, mode: DrawMode, selection: Selection },
	Func { name: String, args: Vec<Value> },
}

impl Command {
	/// Parse one deserialized command tuple. The command name is matched
	/// case-insensitively; positional arguments are checked for arity and
	/// type here so handlers only see well-formed commands.
	pub fn parse(name: &str, args: &[Value]) -> Result<Command, GlirError> {
		match name.to_ascii_lowercase().as_str() {
			"create" => Ok(Command::Create {
				id: str_arg(args, 0)?.to_owned(),
				class: ObjectClass::parse(str_arg(args, 1)?)?,
			}),

			"delete" => Ok(Command::Delete {
				id: str_arg(args, 0)?.to_owned(),
			}),

			"shaders" => Ok(Command::Shaders {
				program: str_arg(args, 0)?.to_owned(),
				vertex: str_arg(args, 1)?.to_owned(),
				fragment: str_arg(args, 2)?.to_owned(),
			}),

			"data" => {
				let payload = arg(args, 2)?;
				let payload = payload.to_bytes()
					.ok_or_else(|| GlirError::malformed(
						format!("data payload must be bytes or a typed array, got {}", payload.kind())))?;

				let format = match args.get(4) {
					Some(value) => {
						let tag = value.as_str()
							.ok_or_else(|| GlirError::malformed("texture format must be a string"))?;
						Some(tag.parse::<PixelFormat>()?)
					}
					None => None,
				};

				Ok(Command::Data {
					id: str_arg(args, 0)?.to_owned(),
					offset: uint_arg(args, 1)? as usize,
					payload,
					shape: args.get(3).map(parse_shape).transpose()?,
					format,
				})
			}

			"attribute" => Ok(Command::Attribute {
				program: str_arg(args, 0)?.to_owned(),
				name: str_arg(args, 1)?.to_owned(),
				ty: AttribType::parse(str_arg(args, 2)?)?,
				vbo: str_arg(args, 3)?.to_owned(),
				stride: int_arg(args, 4)? as i32,
				offset: uint_arg(args, 5)? as usize,
			}),

			"uniform" => Ok(Command::Uniform {
				program: str_arg(args, 0)?.to_owned(),
				name: str_arg(args, 1)?.to_owned(),
				setter: UniformSetter::parse(str_arg(args, 2)?)?,
				value: UniformValue::parse(arg(args, 3)?)?,
			}),

			"texture" => Ok(Command::Texture {
				program: str_arg(args, 0)?.to_owned(),
				texture: str_arg(args, 1)?.to_owned(),
				sampler: str_arg(args, 2)?.to_owned(),
				unit: uint_arg(args, 3)? as u32,
			}),

			"interpolation" => Ok(Command::Interpolation {
				texture: str_arg(args, 0)?.to_owned(),
				min: str_arg(args, 1)?.parse()?,
				mag: str_arg(args, 2)?.parse()?,
			}),

			"wrapping" => Ok(Command::Wrapping {
				texture: str_arg(args, 0)?.to_owned(),
				wrap_s: str_arg(args, 1)?.parse()?,
				wrap_t: str_arg(args, 2)?.parse()?,
			}),

			"draw" => Ok(Command::Draw {
				program: str_arg(args, 0)?.to_owned(),
				mode: str_arg(args, 1)?.parse()?,
				selection: Selection::parse(arg(args, 2)?)?,
			}),

			"func" => Ok(Command::Func {
				name: str_arg(args, 0)?.to_owned(),
				args: args[1..].to_vec(),
			}),

			_ => Err(GlirError::UnsupportedCommand(name.to_owned())),
		}
	}
}


fn arg<'a>(args: &'a [Value], index: usize) -> Result<&'a Value, GlirError> {
	args.get(index)
		.ok_or_else(|| GlirError::malformed(format!("missing argument {index}")))
}

fn str_arg<'a>(args: &'a [Value], index: usize) -> Result<&'a str, GlirError> {
	let value = arg(args, index)?;
	value.as_str()
		.ok_or_else(|| GlirError::malformed(
			format!("argument {index} must be a string, got {}", value.kind())))
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, GlirError> {
	let value = arg(args, index)?;
	value.as_i64()
		.ok_or_else(|| GlirError::malformed(
			format!("argument {index} must be an integer, got {}", value.kind())))
}

fn uint_arg(args: &[Value], index: usize) -> Result<u64, GlirError> {
	let value = int_arg(args, index)?;
	u64::try_from(value)
		.map_err(|_| GlirError::malformed(format!("argument {index} must be non-negative")))
}

fn parse_shape(value: &Value) -> Result<(u32, u32), GlirError> {
	let items = match value {
		Value::List(items) => items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>(),
		Value::Ints(items) => Some(items.iter().map(|&v| v as i64).collect()),
		_ => None,
	};

	match items.as_deref() {
		Some(&[width, height]) if width >= 0 && height >= 0 => Ok((width as u32, height as u32)),
		_ => Err(GlirError::malformed("texture shape must be [width, height]")),
	}
}
