//! Graphics context.
//!
//! A graphics context is an object that abstracts all the low-level operations that happen on a
//! graphics device (it can be a GPU or a software implementation, for instance).
//!
//! This crate doesn’t provide you with creating such contexts. Instead, you must do it yourself
//! or rely on crates doing it for you.
//!
//! # On context and threads
//!
//! This crate is designed to work with the following principles:
//!
//!   - An object which type implements `GraphicsContext` must be `!Send` and `!Sync`. This enforces that it
//!     cannot be moved nor shared between threads.
//!   - You can only create a single context per thread. Doing otherwise is undefined behavior.
//!   - The context owns the _active program_ slot: at most one program is in use per context, and
//!     [`Program::use_program`] mutates that slot. Callers serialize their rendering code on the
//!     context’s thread.
//!
//! [`Program::use_program`]: crate::shader::Program::use_program

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext {
  /// Internal type used by the backend to cache, optimize and store data.
  type Backend: ?Sized;

  /// Access the underlying backend.
  fn backend(&mut self) -> &mut Self::Backend;
}
