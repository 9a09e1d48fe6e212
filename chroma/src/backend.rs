//! Backend interfacing.
//!
//! Backends are types implementing the traits found in this module. The traits are `unsafe`:
//! implementors are trusted to talk to the driver correctly and to release the objects they
//! create.

pub mod shader;
