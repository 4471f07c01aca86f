
use gl_generator::{Registry, Api, Profile, Fallbacks, GlobalGenerator};
use std::env;
use std::fs::File;
use std::path::Path;

fn main() {
    let dest = env::var("OUT_DIR").unwrap();
    let mut file = File::create(&Path::new(&dest).join("gl_bindings.rs")).unwrap();

	Registry::new(Api::Gl, (3, 3), Profile::Core, Fallbacks::All, [])
	    .write_bindings(GlobalGenerator, &mut file)
	    .unwrap();
}
