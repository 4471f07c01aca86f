#![allow(clippy::all)]

include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
