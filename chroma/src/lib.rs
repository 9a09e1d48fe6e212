//! # Shader programs over an explicit rendering context
//!
//! chroma is a small crate wrapping the lifecycle of a GPU shader program: read the vertex and
//! fragment sources, compile each stage, link them into a program, set uniforms and release the
//! program once done. It doesn’t know how to talk to a GPU by itself; instead, everything goes
//! through a _backend_ type, reached from a value implementing [`GraphicsContext`].
//!
//! # What’s included?
//!
//! - **Stages**: a [`Stage`] is a single compiled unit of shading-language source, either a
//!   vertex shader or a fragment shader. Stages are transient: they only exist to be linked.
//! - **Programs**: a [`Program`] is the linked combination of a vertex and a fragment stage. It owns
//!   exactly one backend program object and releases it when dropped or explicitly released.
//! - **Uniforms**: named values set by the host application and read by the stages, via
//!   [`Program::set_bool`], [`Program::set_int`], [`Program::set_float`] or typed [`Uniform`]
//!   handles.
//!
//! # Implementation and architecture
//!
//! The crate only contains the abstract, common code. Backend types (conventionally named `S`
//! here as they implement [`backend::shader::Shader`]) are provided by other crates, such as
//! chroma-gl for OpenGL 3.3. If you want to plug another driver, implement the traits in
//! [`backend`]; the interface is `unsafe` because implementors must uphold the driver invariants
//! themselves.
//!
//! Windowing is not covered either. A windowing crate (chroma-glfw, for instance) creates the
//! native context and hands you something implementing [`GraphicsContext`].
//!
//! [`GraphicsContext`]: crate::context::GraphicsContext
//! [`Stage`]: crate::shader::Stage
//! [`Program`]: crate::shader::Program
//! [`Program::set_bool`]: crate::shader::Program::set_bool
//! [`Program::set_int`]: crate::shader::Program::set_int
//! [`Program::set_float`]: crate::shader::Program::set_float
//! [`Uniform`]: crate::shader::Uniform

#![deny(missing_docs)]

pub mod backend;
pub mod context;
pub mod shader;
