//! Shader stages, programs and uniforms.
//!
//! A shader [`Program`] is built out of two [`Stage`]s: a vertex shader and a fragment shader.
//! Most of the time you don’t need to deal with stages yourself: [`Program::from_files`] reads
//! both sources from disk, compiles them, links them and drops the intermediate stages.
//!
//! Building a program is atomic: if any step fails (a source can’t be read, a stage doesn’t
//! compile, the program doesn’t link), every driver object created so far is released and you get
//! a [`ProgramError`] carrying the driver diagnostics verbatim.
//!
//! # Uniforms
//!
//! Uniforms can be set by name with [`Program::set_bool`], [`Program::set_int`] and
//! [`Program::set_float`]. Setting a uniform that doesn’t exist in the program is not an error: it
//! is silently ignored and leaves the other uniforms untouched. If you’d rather know about it, ask
//! for a typed [`Uniform`] with [`Program::uniform`], which also checks the declared type, and
//! update it with [`Program::set_uniform`].
//!
//! In both cases the program must be the active one (see [`Program::use_program`]); this is not
//! checked.

use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::backend::shader::{Shader, Uniformable};
use crate::context::GraphicsContext;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile.
  ///
  /// The `String` is the driver compilation log.
  CompilationFailed(StageType, String),
}

impl StageError {
  /// Occurs when a shader fails to compile.
  pub fn compilation_failed(ty: StageType, reason: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, reason.into())
  }

  /// Type of the stage that emitted the error.
  pub fn stage_type(&self) -> StageType {
    match *self {
      StageError::CompilationFailed(ty, _) => ty,
    }
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProgramError {
  /// A shader source file couldn’t be opened or read.
  FileRead(PathBuf, io::Error),
  /// A shader stage failed to compile.
  StageError(StageError),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
}

impl ProgramError {
  /// A shader source file couldn’t be opened or read.
  pub fn file_read(path: impl Into<PathBuf>, e: io::Error) -> Self {
    ProgramError::FileRead(path.into(), e)
  }

  /// Program link failed.
  pub fn link_failed(reason: impl Into<String>) -> Self {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::FileRead(ref path, ref e) => {
        write!(f, "cannot read shader source {}: {}", path.display(), e)
      }

      ProgramError::StageError(ref e) => write!(f, "shader program has stage error: {}", e),

      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::FileRead(_, e) => Some(e),
      ProgramError::StageError(e) => Some(e),
      ProgramError::LinkFailed(_) => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::StageError(e)
  }
}

/// Warnings related to uniform issues.
///
/// Those are never emitted by the by-name setters; only explicit queries report them.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UniformWarning {
  /// Inactive uniform (not declared, or not in use / no participation to the final output in
  /// shaders).
  Inactive(String),
  /// Type mismatch between the static requested type (i.e. the `T` in [`Uniform<T>`] for instance)
  /// and the type that got reflected from the backend in the shaders.
  ///
  /// The `String` is the name of the uniform; the [`UniformType`] is the requested type.
  TypeMismatch(String, UniformType),
}

impl UniformWarning {
  /// Create an inactive uniform warning.
  pub fn inactive<N>(name: N) -> Self
  where
    N: Into<String>,
  {
    UniformWarning::Inactive(name.into())
  }

  /// Create a type mismatch.
  pub fn type_mismatch<N>(name: N, ty: UniformType) -> Self
  where
    N: Into<String>,
  {
    UniformWarning::TypeMismatch(name.into(), ty)
  }
}

impl fmt::Display for UniformWarning {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformWarning::Inactive(ref s) => write!(f, "inactive {} uniform", s),

      UniformWarning::TypeMismatch(ref n, ref t) => {
        write!(f, "type mismatch for uniform {}: {}", n, t)
      }
    }
  }
}

impl error::Error for UniformWarning {}

/// Type of a uniform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UniformType {
  /// 32-bit signed integer.
  Int,
  /// 32-bit unsigned integer.
  UInt,
  /// 32-bit floating-point number.
  Float,
  /// Boolean.
  Bool,
}

impl fmt::Display for UniformType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformType::Int => f.write_str("int"),
      UniformType::UInt => f.write_str("uint"),
      UniformType::Float => f.write_str("float"),
      UniformType::Bool => f.write_str("bool"),
    }
  }
}

/// A typed uniform location.
///
/// Uniforms are obtained from a [`Program`] and are only meaningful for that program.
#[derive(Debug)]
pub struct Uniform<T>
where
  T: ?Sized,
{
  index: i32,
  _t: PhantomData<*const T>,
}

impl<T> Uniform<T>
where
  T: ?Sized,
{
  /// Create a new uniform from a raw location.
  ///
  /// # Safety
  ///
  /// `index` must be a location handed by the backend, or `-1` for an unbound uniform.
  pub unsafe fn new(index: i32) -> Self {
    Uniform {
      index,
      _t: PhantomData,
    }
  }

  /// Raw location of the uniform. Negative for unbound uniforms.
  pub fn index(&self) -> i32 {
    self.index
  }

  /// Whether this uniform is bound to an actual location.
  pub fn is_bound(&self) -> bool {
    self.index >= 0
  }
}

/// A compiled shader stage.
///
/// The stage object is released when the [`Stage`] is dropped.
pub struct Stage<S>
where
  S: ?Sized + Shader,
{
  repr: S::StageRepr,
  ty: StageType,
}

impl<S> Stage<S>
where
  S: ?Sized + Shader,
{
  /// Compile a new stage of type `ty` from its source code.
  pub fn new<C, R>(ctx: &mut C, ty: StageType, src: R) -> Result<Self, StageError>
  where
    C: GraphicsContext<Backend = S>,
    R: AsRef<str>,
  {
    let repr = unsafe { ctx.backend().new_stage(ty, src.as_ref()) };

    match repr {
      Ok(repr) => {
        log::debug!("compiled {}", ty);
        Ok(Stage { repr, ty })
      }

      Err(e) => {
        log::warn!("{}", e);
        Err(e)
      }
    }
  }

  /// Type of this stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }
}

impl<S> fmt::Debug for Stage<S>
where
  S: ?Sized + Shader,
  S::StageRepr: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Stage")
      .field("repr", &self.repr)
      .field("ty", &self.ty)
      .finish()
  }
}

/// A linked shader program.
///
/// A [`Program`] owns exactly one backend program object. It’s released either explicitly with
/// [`Program::release`] or implicitly when the value is dropped; since releasing consumes the
/// program, it can neither be used nor released again afterwards.
pub struct Program<S>
where
  S: ?Sized + Shader,
{
  repr: S::ProgramRepr,
}

impl<S> Program<S>
where
  S: ?Sized + Shader,
{
  /// Link a vertex stage and a fragment stage into a program.
  ///
  /// The stages are borrowed: they can be reused to link other programs and are released when you
  /// drop them.
  pub fn from_stages<C>(
    ctx: &mut C,
    vertex: &Stage<S>,
    fragment: &Stage<S>,
  ) -> Result<Self, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
  {
    check_stage_type(vertex, StageType::VertexShader)?;
    check_stage_type(fragment, StageType::FragmentShader)?;

    let repr = unsafe { ctx.backend().new_program(&vertex.repr, &fragment.repr) };

    match repr {
      Ok(repr) => {
        log::debug!("linked shader program");
        Ok(Program { repr })
      }

      Err(e) => {
        log::warn!("{}", e);
        Err(e)
      }
    }
  }

  /// Compile and link a program out of the vertex and fragment sources.
  ///
  /// Both intermediate stages are released before returning, whether linking succeeds or not.
  pub fn from_strings<C, V, F>(ctx: &mut C, vertex: V, fragment: F) -> Result<Self, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
    V: AsRef<str>,
    F: AsRef<str>,
  {
    let vs_stage = Stage::new(ctx, StageType::VertexShader, vertex)?;
    let fs_stage = Stage::new(ctx, StageType::FragmentShader, fragment)?;

    Self::from_stages(ctx, &vs_stage, &fs_stage)
  }

  /// Read the vertex and fragment sources from files, then compile and link them.
  ///
  /// Both files are read before anything is submitted to the backend: if one of them can’t be
  /// read, no stage is created.
  pub fn from_files<C, V, F>(
    ctx: &mut C,
    vertex_path: V,
    fragment_path: F,
  ) -> Result<Self, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
    V: AsRef<Path>,
    F: AsRef<Path>,
  {
    let vertex = read_source(vertex_path.as_ref())?;
    let fragment = read_source(fragment_path.as_ref())?;

    Self::from_strings(ctx, vertex, fragment)
  }

  /// Make this program the active one for all subsequent rendering and uniform updates on `ctx`.
  pub fn use_program<C>(&self, ctx: &mut C)
  where
    C: GraphicsContext<Backend = S>,
  {
    unsafe { ctx.backend().use_program(&self.repr) }
  }

  /// Ask for a typed uniform by name.
  ///
  /// Fails with a [`UniformWarning`] if the uniform is inactive or if its declared type doesn’t
  /// match `T`.
  pub fn uniform<C, T>(&self, ctx: &mut C, name: &str) -> Result<Uniform<T>, UniformWarning>
  where
    C: GraphicsContext<Backend = S>,
    S: Uniformable<T>,
  {
    unsafe { ctx.backend().ask_uniform(&self.repr, name) }
  }

  /// Ask for a typed uniform by name, returning an unbound uniform if unavailable.
  ///
  /// Updating an unbound uniform does nothing.
  pub fn uniform_or_unbound<C, T>(&self, ctx: &mut C, name: &str) -> Uniform<T>
  where
    C: GraphicsContext<Backend = S>,
    S: Uniformable<T>,
  {
    let backend = ctx.backend();

    match unsafe { backend.ask_uniform(&self.repr, name) } {
      Ok(uniform) => uniform,
      Err(e) => {
        log::debug!("{}", e);
        unsafe { backend.unbound() }
      }
    }
  }

  /// Update a typed uniform.
  pub fn set_uniform<C, T>(&self, ctx: &mut C, uniform: &Uniform<T>, value: T)
  where
    C: GraphicsContext<Backend = S>,
    S: Uniformable<T>,
  {
    unsafe { ctx.backend().update(&self.repr, uniform, value) }
  }

  /// Set a uniform by name.
  ///
  /// Unknown names are silently ignored.
  pub fn set<C, T>(&self, ctx: &mut C, name: &str, value: T)
  where
    C: GraphicsContext<Backend = S>,
    S: Uniformable<T>,
  {
    let backend = ctx.backend();

    match unsafe { backend.uniform_location(&self.repr, name) } {
      Some(index) => unsafe {
        let uniform = Uniform::new(index);
        backend.update(&self.repr, &uniform, value);
      },

      None => log::trace!("ignoring unknown uniform {}", name),
    }
  }

  /// Set a boolean uniform by name.
  pub fn set_bool<C>(&self, ctx: &mut C, name: &str, value: bool)
  where
    C: GraphicsContext<Backend = S>,
    S: Uniformable<bool>,
  {
    self.set(ctx, name, value)
  }

  /// Set an integer uniform by name.
  pub fn set_int<C>(&self, ctx: &mut C, name: &str, value: i32)
  where
    C: GraphicsContext<Backend = S>,
    S: Uniformable<i32>,
  {
    self.set(ctx, name, value)
  }

  /// Set a floating-point uniform by name.
  pub fn set_float<C>(&self, ctx: &mut C, name: &str, value: f32)
  where
    C: GraphicsContext<Backend = S>,
    S: Uniformable<f32>,
  {
    self.set(ctx, name, value)
  }

  /// Release the program back to the backend.
  pub fn release(self) {
    drop(self)
  }
}

impl<S> fmt::Debug for Program<S>
where
  S: ?Sized + Shader,
  S::ProgramRepr: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Program").field("repr", &self.repr).finish()
  }
}

fn check_stage_type<S>(stage: &Stage<S>, expected: StageType) -> Result<(), ProgramError>
where
  S: ?Sized + Shader,
{
  if stage.ty == expected {
    Ok(())
  } else {
    Err(ProgramError::link_failed(format!(
      "expected a {}, got a {}",
      expected, stage.ty
    )))
  }
}

fn read_source(path: &Path) -> Result<String, ProgramError> {
  log::trace!("reading shader source {}", path.display());
  fs::read_to_string(path).map_err(|e| ProgramError::file_read(path, e))
}
