//! Shader backend interface.
//!
//! This interface defines the low-level API shaders must implement to be usable. A backend
//! provides two representation types: one for compiled stages and one for linked programs. Both
//! own a driver object and must release it when dropped; that is the only way chroma deletes
//! stages and programs.

use crate::shader::{ProgramError, StageError, StageType, Uniform, UniformType, UniformWarning};

/// Shader support.
pub unsafe trait Shader {
  /// Backend representation of a compiled shader stage.
  type StageRepr;

  /// Backend representation of a linked shader program.
  type ProgramRepr;

  /// Create a stage of type `ty`, submit `src` to it and compile it.
  ///
  /// On compilation failure, the driver diagnostic log must be returned verbatim in
  /// [`StageError::CompilationFailed`] and the stage object must already be released.
  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Create a program, attach both stages to it and link it.
  ///
  /// On link failure, the driver diagnostic log must be returned verbatim in
  /// [`ProgramError::LinkFailed`] and the program object must already be released. The stages are
  /// left untouched; they belong to the caller.
  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError>;

  /// Make `program` the active program of the context.
  unsafe fn use_program(&mut self, program: &Self::ProgramRepr);

  /// Look a uniform location up by name.
  ///
  /// Returns [`None`] if the program doesn’t have any active uniform with that name.
  unsafe fn uniform_location(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32>;

  /// Ask for a typed uniform, checking that it exists and that its type matches `T`.
  unsafe fn ask_uniform<T>(
    &mut self,
    program: &Self::ProgramRepr,
    name: &str,
  ) -> Result<Uniform<T>, UniformWarning>
  where
    Self: Uniformable<T>;

  /// Build a uniform that is not bound to anything. Updating it must be a no-op.
  unsafe fn unbound<T>(&mut self) -> Uniform<T>
  where
    Self: Uniformable<T>;
}

/// Class of types that can be sent to shaders as uniform values.
pub unsafe trait Uniformable<T>: Shader {
  /// Reify the uniform type of `T`.
  unsafe fn ty() -> UniformType;

  /// Set the value of `uniform` in `program`.
  ///
  /// `program` is expected to be the active program.
  unsafe fn update(&mut self, program: &Self::ProgramRepr, uniform: &Uniform<T>, value: T);
}
