use glir::backend::{
	BufferTarget, Call, DrawMode, FilterMode, IndexKind, PixelFormat, RecordingBackend, WrapMode,
};
use glir::namespace::Entry;
use glir::{GlirError, Interpreter, Surface, Value};


fn interpreter() -> Interpreter<RecordingBackend> {
	let _ = env_logger::builder().is_test(true).try_init();
	Interpreter::new(RecordingBackend::new(), Surface { width: 640, height: 480 })
}

fn run(interp: &mut Interpreter<RecordingBackend>, name: &str, args: &[Value]) {
	interp.execute_raw(name, args)
		.unwrap_or_else(|err| panic!("{name} failed: {err}"));
}

fn str_value(s: &str) -> Value {
	Value::Str(s.to_owned())
}

/// Builds a program with one vec2 attribute fed from "buf1".
fn setup_program(interp: &mut Interpreter<RecordingBackend>) {
	run(interp, "create", &[str_value("prog1"), str_value("Program")]);
	run(interp, "create", &[str_value("buf1"), str_value("VertexBuffer")]);
	run(interp, "data", &[str_value("buf1"), Value::Int(0), Value::Bytes(vec![0; 48])]);
	run(interp, "attribute", &[
		str_value("prog1"),
		str_value("a_pos"),
		str_value("vec2"),
		str_value("buf1"),
		Value::Int(0),
		Value::Int(0),
	]);
}


#[test]
fn create_then_delete_releases_backend_object_once() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("buf1"), str_value("VertexBuffer")]);
	run(&mut interp, "delete", &[str_value("buf1")]);

	let backend = interp.backend();
	let creates = backend.calls_matching(|c| matches!(c, Call::CreateBuffer(_)));
	let deletes = backend.calls_matching(|c| matches!(c, Call::DeleteBuffer(_)));
	assert_eq!(creates.len(), 1);
	assert_eq!(deletes.len(), 1);

	assert!(interp.namespace().get("buf1").is_none());

	let err = interp.execute_raw("delete", &[str_value("buf1")]).unwrap_err();
	assert!(matches!(err, GlirError::Reference { .. }));
}

#[test]
fn deleted_id_can_be_reused() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("obj"), str_value("VertexBuffer")]);
	run(&mut interp, "delete", &[str_value("obj")]);
	run(&mut interp, "create", &[str_value("obj"), str_value("Texture2D")]);

	assert!(matches!(interp.namespace().get("obj"), Some(Entry::Texture2D(_))));
}

#[test]
fn first_buffer_upload_allocates_and_sets_size() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("buf1"), str_value("VertexBuffer")]);
	run(&mut interp, "data", &[str_value("buf1"), Value::Int(0), Value::Bytes(vec![0, 1, 2, 3])]);

	let Some(Entry::VertexBuffer(buffer)) = interp.namespace().get("buf1") else {
		panic!("expected vertex buffer entry");
	};
	assert_eq!(buffer.size, 4);

	assert_eq!(
		interp.backend().calls_matching(|c| matches!(c, Call::BufferData(..))),
		vec![&Call::BufferData(BufferTarget::Array, 4)],
	);
	assert!(interp.backend().calls_matching(|c| matches!(c, Call::BufferSubData(..))).is_empty());
}

#[test]
fn later_buffer_uploads_are_subrange_updates() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("buf1"), str_value("VertexBuffer")]);
	run(&mut interp, "data", &[str_value("buf1"), Value::Int(0), Value::Bytes(vec![0, 1, 2, 3])]);
	run(&mut interp, "data", &[str_value("buf1"), Value::Int(8), Value::Bytes(vec![9, 9])]);

	let Some(Entry::VertexBuffer(buffer)) = interp.namespace().get("buf1") else {
		panic!("expected vertex buffer entry");
	};
	// The second upload must not touch the allocated size.
	assert_eq!(buffer.size, 4);

	assert_eq!(
		interp.backend().calls_matching(|c| matches!(c, Call::BufferSubData(..))),
		vec![&Call::BufferSubData(BufferTarget::Array, 8, 2)],
	);
	assert_eq!(interp.backend().calls_matching(|c| matches!(c, Call::BufferData(..))).len(), 1);
}

#[test]
fn index_buffer_uploads_use_element_array_target() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("idx1"), str_value("IndexBuffer")]);
	run(&mut interp, "data", &[str_value("idx1"), Value::Int(0), Value::Bytes(vec![0; 12])]);

	assert_eq!(
		interp.backend().calls_matching(|c| matches!(c, Call::BufferData(..))),
		vec![&Call::BufferData(BufferTarget::ElementArray, 12)],
	);
}

#[test]
fn texture_uploads_always_reallocate_and_ignore_offset() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("tex1"), str_value("Texture2D")]);

	let shape = Value::List(vec![Value::Int(64), Value::Int(64)]);
	let pixels = Value::Bytes(vec![0; 64 * 64 * 4]);
	run(&mut interp, "data", &[
		str_value("tex1"), Value::Int(0), pixels.clone(), shape.clone(), str_value("RGBA"),
	]);
	// A wildly nonzero offset makes no difference for textures.
	run(&mut interp, "data", &[
		str_value("tex1"), Value::Int(4096), pixels, shape, str_value("RGBA"),
	]);

	let uploads = interp.backend().calls_matching(|c| matches!(c, Call::TexImage2D(..)));
	assert_eq!(uploads, vec![
		&Call::TexImage2D(64, 64, PixelFormat::Rgba, 64 * 64 * 4),
		&Call::TexImage2D(64, 64, PixelFormat::Rgba, 64 * 64 * 4),
	]);
	assert!(interp.backend().calls_matching(|c| matches!(c, Call::BufferSubData(..))).is_empty());
}

#[test]
fn data_on_missing_id_is_a_reference_error() {
	let mut interp = interpreter();

	let err = interp
		.execute_raw("data", &[str_value("ghost"), Value::Int(0), Value::Bytes(vec![1])])
		.unwrap_err();
	assert!(matches!(err, GlirError::Reference { .. }));
}

#[test]
fn shader_compile_failure_is_nonfatal() {
	// Both stages fail to compile; the command still completes and links
	// best-effort with nothing attached.
	let mut backend = RecordingBackend::new();
	backend.compile_error = Some("0:1: syntax error".to_owned());
	let mut interp = Interpreter::new(backend, Surface { width: 4, height: 4 });
	run(&mut interp, "create", &[str_value("prog1"), str_value("Program")]);
	run(&mut interp, "shaders", &[str_value("prog1"), str_value("bad vs"), str_value("bad fs")]);

	assert!(interp.backend().calls_matching(|c| matches!(c, Call::AttachShader(..))).is_empty());
	assert_eq!(interp.backend().calls_matching(|c| matches!(c, Call::LinkProgram(_))).len(), 1);
}

#[test]
fn shaders_compile_attach_and_link() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("prog1"), str_value("Program")]);
	run(&mut interp, "shaders", &[str_value("prog1"), str_value("void main(){}"), str_value("void main(){}")]);

	assert_eq!(interp.backend().calls_matching(|c| matches!(c, Call::CompileShader(_))).len(), 2);
	assert_eq!(interp.backend().calls_matching(|c| matches!(c, Call::AttachShader(..))).len(), 2);
	assert_eq!(interp.backend().calls_matching(|c| matches!(c, Call::LinkProgram(_))).len(), 1);
}

#[test]
fn uniform_location_is_resolved_once() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("prog1"), str_value("Program")]);
	run(&mut interp, "uniform", &[
		str_value("prog1"), str_value("u_color"), str_value("vec4"),
		Value::Floats(vec![1.0, 0.0, 0.0, 1.0]),
	]);
	run(&mut interp, "uniform", &[
		str_value("prog1"), str_value("u_color"), str_value("vec4"),
		Value::Floats(vec![0.0, 1.0, 0.0, 1.0]),
	]);

	let queries = interp.backend().calls_matching(|c| matches!(c, Call::UniformLocationQuery(..)));
	assert_eq!(queries.len(), 1, "location must be resolved on the first call only");

	let applies = interp.backend().calls_matching(|c| matches!(c, Call::UniformFloats(..)));
	assert_eq!(applies.len(), 2, "the setter runs on every call");
	let Call::UniformFloats(_, dims, values) = applies[1] else { unreachable!() };
	assert_eq!(*dims, 4);
	assert_eq!(values, &[0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn matrix_uniforms_use_the_matrix_setter() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("prog1"), str_value("Program")]);
	run(&mut interp, "uniform", &[
		str_value("prog1"), str_value("u_model"), str_value("mat4"),
		Value::Floats(vec![0.0; 16]),
	]);

	let applies = interp.backend().calls_matching(|c| matches!(c, Call::UniformMatrix(..)));
	assert_eq!(applies.len(), 1);
	let Call::UniformMatrix(_, dims, _) = applies[0] else { unreachable!() };
	assert_eq!(*dims, 4);
}

#[test]
fn int_uniforms_use_the_int_setter() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("prog1"), str_value("Program")]);
	run(&mut interp, "uniform", &[
		str_value("prog1"), str_value("u_mode"), str_value("int"), Value::Ints(vec![2]),
	]);

	assert_eq!(
		interp.backend().calls_matching(|c| matches!(c, Call::UniformInts(..))).len(),
		1,
	);
}

#[test]
fn attribute_registration_stores_parsed_type() {
	let mut interp = interpreter();
	setup_program(&mut interp);

	let Some(Entry::Program(program)) = interp.namespace().get("prog1") else {
		panic!("expected program entry");
	};

	let binding = &program.attributes["a_pos"];
	assert_eq!(binding.ty.dims, 2);
	assert_eq!(binding.ty.kind, glir::backend::AttribKind::Float);
	assert_eq!(binding.vbo_id, "buf1");
}

#[test]
fn draw_without_index_buffer() {
	let mut interp = interpreter();
	setup_program(&mut interp);

	run(&mut interp, "draw", &[
		str_value("prog1"),
		str_value("TRIANGLES"),
		Value::List(vec![Value::Int(0), Value::Int(6)]),
	]);

	assert_eq!(
		interp.backend().calls_matching(|c| matches!(c, Call::DrawArrays(..))),
		vec![&Call::DrawArrays(DrawMode::Triangles, 0, 6)],
	);
}

#[test]
fn indexed_draw_binds_the_index_buffer() {
	let mut interp = interpreter();
	setup_program(&mut interp);

	run(&mut interp, "create", &[str_value("idx1"), str_value("IndexBuffer")]);
	run(&mut interp, "data", &[str_value("idx1"), Value::Int(0), Value::Bytes(vec![0; 12])]);

	run(&mut interp, "draw", &[
		str_value("prog1"),
		str_value("TRIANGLES"),
		Value::List(vec![str_value("idx1"), str_value("UNSIGNED_SHORT"), Value::Int(6)]),
	]);

	assert_eq!(
		interp.backend().calls_matching(|c| matches!(c, Call::DrawElements(..))),
		vec![&Call::DrawElements(DrawMode::Triangles, 6, IndexKind::UnsignedShort)],
	);

	// The index buffer handle is bound to the element-array target before
	// the draw call.
	let index_handle = match interp.namespace().get("idx1") {
		Some(Entry::IndexBuffer(buffer)) => buffer.handle,
		_ => panic!("expected index buffer entry"),
	};
	let draw_position = interp.backend().calls.iter()
		.position(|c| matches!(c, Call::DrawElements(..)))
		.unwrap();
	assert_eq!(
		interp.backend().calls[draw_position - 1],
		Call::BindBuffer(BufferTarget::ElementArray, Some(index_handle)),
	);
}

#[test]
fn draw_activation_is_symmetric() {
	let mut interp = interpreter();
	setup_program(&mut interp);

	// A second attribute on the same buffer.
	run(&mut interp, "attribute", &[
		str_value("prog1"),
		str_value("a_uv"),
		str_value("vec2"),
		str_value("buf1"),
		Value::Int(0),
		Value::Int(16),
	]);

	run(&mut interp, "draw", &[
		str_value("prog1"),
		str_value("TRIANGLES"),
		Value::List(vec![Value::Int(0), Value::Int(6)]),
	]);

	let mut enabled: Vec<_> = interp.backend().calls.iter()
		.filter_map(|c| match c {
			Call::EnableAttrib(location) => Some(*location),
			_ => None,
		})
		.collect();
	let mut disabled: Vec<_> = interp.backend().calls.iter()
		.filter_map(|c| match c {
			Call::DisableAttrib(location) => Some(*location),
			_ => None,
		})
		.collect();

	assert_eq!(enabled.len(), 2);
	enabled.sort_by_key(|location| location.0);
	disabled.sort_by_key(|location| location.0);
	assert_eq!(enabled, disabled);

	// All deactivations come after the draw call.
	let draw_position = interp.backend().calls.iter()
		.position(|c| matches!(c, Call::DrawArrays(..)))
		.unwrap();
	for (position, call) in interp.backend().calls.iter().enumerate() {
		if matches!(call, Call::DisableAttrib(_)) {
			assert!(position > draw_position);
		}
	}
}

#[test]
fn draw_with_missing_vertex_buffer_still_deactivates() {
	let mut interp = interpreter();
	setup_program(&mut interp);
	run(&mut interp, "delete", &[str_value("buf1")]);

	let err = interp
		.execute_raw("draw", &[
			str_value("prog1"),
			str_value("TRIANGLES"),
			Value::List(vec![Value::Int(0), Value::Int(6)]),
		])
		.unwrap_err();
	assert!(matches!(err, GlirError::Reference { .. }));

	let enabled = interp.backend().calls_matching(|c| matches!(c, Call::EnableAttrib(_))).len();
	let disabled = interp.backend().calls_matching(|c| matches!(c, Call::DisableAttrib(_))).len();
	assert_eq!(enabled, disabled);
}

#[test]
fn draw_selection_of_bad_arity_is_malformed() {
	let mut interp = interpreter();
	setup_program(&mut interp);

	let err = interp
		.execute_raw("draw", &[
			str_value("prog1"),
			str_value("TRIANGLES"),
			Value::List(vec![Value::Int(0), Value::Int(6), Value::Int(99)]),
		])
		.unwrap_err();
	assert!(matches!(err, GlirError::Malformed(_)));

	// Nothing may reach the backend for a malformed command.
	assert!(interp.backend().calls_matching(|c| matches!(c, Call::DrawArrays(..))).is_empty());
	assert!(interp.backend().calls_matching(|c| matches!(c, Call::EnableAttrib(_))).is_empty());
}

#[test]
fn texture_command_sets_sampler_and_draw_activates_unit() {
	let mut interp = interpreter();
	setup_program(&mut interp);

	run(&mut interp, "create", &[str_value("tex1"), str_value("Texture2D")]);
	run(&mut interp, "data", &[
		str_value("tex1"), Value::Int(0), Value::Bytes(vec![0; 16]),
		Value::List(vec![Value::Int(2), Value::Int(2)]), str_value("RGBA"),
	]);
	run(&mut interp, "texture", &[
		str_value("prog1"), str_value("tex1"), str_value("u_sampler"), Value::Int(3),
	]);

	// The sampler uniform is set to the unit index immediately.
	let applies = interp.backend().calls_matching(|c| matches!(c, Call::UniformInts(..)));
	assert_eq!(applies.len(), 1);
	let Call::UniformInts(_, dims, values) = applies[0] else { unreachable!() };
	assert_eq!((*dims, values.as_slice()), (1, &[3][..]));

	run(&mut interp, "draw", &[
		str_value("prog1"),
		str_value("TRIANGLES"),
		Value::List(vec![Value::Int(0), Value::Int(6)]),
	]);

	assert_eq!(
		interp.backend().calls_matching(|c| matches!(c, Call::ActiveTexture(_))),
		vec![&Call::ActiveTexture(3)],
	);
}

#[test]
fn interpolation_and_wrapping_bind_and_unbind() {
	let mut interp = interpreter();

	run(&mut interp, "create", &[str_value("tex1"), str_value("Texture2D")]);
	run(&mut interp, "interpolation", &[str_value("tex1"), str_value("LINEAR"), str_value("NEAREST")]);
	run(&mut interp, "wrapping", &[str_value("tex1"), str_value("CLAMP_TO_EDGE"), str_value("REPEAT")]);

	let calls = &interp.backend().calls;
	let filter_position = calls.iter().position(|c| matches!(c, Call::TexFilter(..))).unwrap();
	assert_eq!(calls[filter_position], Call::TexFilter(FilterMode::Linear, FilterMode::Nearest));
	assert!(matches!(calls[filter_position - 1], Call::BindTexture(Some(_))));
	assert_eq!(calls[filter_position + 1], Call::BindTexture(None));

	let wrap_position = calls.iter().position(|c| matches!(c, Call::TexWrap(..))).unwrap();
	assert_eq!(calls[wrap_position], Call::TexWrap(WrapMode::ClampToEdge, WrapMode::Repeat));
	assert!(matches!(calls[wrap_position - 1], Call::BindTexture(Some(_))));
	assert_eq!(calls[wrap_position + 1], Call::BindTexture(None));
}

#[test]
fn func_commands_pass_through() {
	let mut interp = interpreter();

	run(&mut interp, "func", &[str_value("enable"), str_value("DEPTH_TEST")]);

	assert_eq!(
		interp.backend().calls,
		vec![Call::Func("enable".to_owned(), vec![str_value("DEPTH_TEST")])],
	);
}

#[test]
fn unknown_commands_are_rejected() {
	let mut interp = interpreter();

	let err = interp.execute_raw("transmogrify", &[]).unwrap_err();
	assert!(matches!(err, GlirError::UnsupportedCommand(name) if name == "transmogrify"));
}

#[test]
fn surface_utilities_forward_to_the_backend() {
	let mut interp = interpreter();

	interp.viewport();
	interp.clear([0.0, 0.0, 0.0, 1.0]);

	assert_eq!(interp.backend().calls, vec![
		Call::Viewport(640, 480),
		Call::Clear([0.0, 0.0, 0.0, 1.0]),
	]);
}
