//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for chroma. The only
//! backend so far is [`GL33`], targeting an OpenGL 3.3 core context. The windowing crate is
//! responsible for creating that context and loading the function pointers (`gl::load_with`)
//! before creating the backend.

#![deny(missing_docs)]

pub mod gl33;

pub use gl33::GL33;
