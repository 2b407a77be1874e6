//! Document content model and file records.
//!
//! # Responsibility
//! - Define the `FileObject` record passed to every file operation.
//! - Hold the arena document tree and the `Atom`/`Shell` views over it.
//! - Build logic concepts for the validation engine.
//!
//! # Invariants
//! - Views are constructed from node kind tags and never cached.
//! - A `FileObject::Folder` never carries contents.

pub mod atom;
pub mod document;
pub mod file_object;
pub mod logic;
pub mod shell;
