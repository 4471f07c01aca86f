//! GLIR command interpreter.
//!
//! A declarative front end drives a rendering surface by emitting ordered
//! `(name, args)` command tuples instead of touching the graphics context
//! directly. This crate interprets that stream: it owns every backend object
//! behind a caller-chosen string id, branches between first-allocation and
//! incremental-update uploads, caches resolved attribute and uniform
//! locations, and assembles complete draw sequences that leave the backend's
//! binding state clean between commands.
//!
//! The graphics context itself is reached through the [`GraphicsBackend`]
//! capability trait. [`backend::RawGl`] implements it over raw OpenGL;
//! [`backend::RecordingBackend`] implements it as a call log for headless
//! use and tests.

pub mod backend;
pub mod command;
pub mod error;
pub mod interpreter;
pub mod namespace;

pub use backend::{GraphicsBackend, RawGl, RecordingBackend};
pub use command::{Command, Selection, Value};
pub use error::GlirError;
pub use interpreter::{Interpreter, Surface};
