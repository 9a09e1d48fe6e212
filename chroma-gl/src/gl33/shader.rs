use crate::gl33::state::GLState;
use crate::gl33::GL33;
use chroma::{
  backend::shader::{Shader, Uniformable},
  shader::{ProgramError, StageError, StageType, Uniform, UniformType, UniformWarning},
};
use gl::types::*;
use std::{
  cell::RefCell,
  ffi::CString,
  ptr::{null, null_mut},
  rc::Rc,
};

#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

impl Drop for Stage {
  fn drop(&mut self) {
    log::trace!("deleting {} {}", self.ty, self.handle);

    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for Program {
  fn drop(&mut self) {
    log::trace!("deleting program {}", self.handle);

    self.state.borrow_mut().forget_program(self.handle);

    unsafe {
      gl::DeleteProgram(self.handle);
    }
  }
}

impl Program {
  fn link(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    unsafe {
      gl::LinkProgram(handle);

      let mut linked: GLint = gl::FALSE.into();
      gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

      if linked == gl::TRUE.into() {
        Ok(())
      } else {
        let mut log_len: GLint = 0;
        gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log = vec![0; log_len.max(0) as usize];
        let mut written: GLsizei = 0;
        gl::GetProgramInfoLog(
          handle,
          log_len,
          &mut written,
          log.as_mut_ptr() as *mut GLchar,
        );

        Err(ProgramError::link_failed(info_log(log, written)))
      }
    }
  }
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(src.as_bytes())
      .map_err(|_| StageError::compilation_failed(ty, "shader source contains a NUL byte"))?;

    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      return Err(StageError::compilation_failed(
        ty,
        "unable to create shader stage",
      ));
    }

    gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      Ok(Stage { handle, ty })
    } else {
      let mut log_len: GLint = 0;
      gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

      let mut log = vec![0; log_len.max(0) as usize];
      let mut written: GLsizei = 0;
      gl::GetShaderInfoLog(
        handle,
        log_len,
        &mut written,
        log.as_mut_ptr() as *mut GLchar,
      );

      gl::DeleteShader(handle);

      Err(StageError::compilation_failed(ty, info_log(log, written)))
    }
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(ProgramError::link_failed("unable to create shader program"));
    }

    gl::AttachShader(handle, vertex.handle);
    gl::AttachShader(handle, fragment.handle);

    let program = Program {
      handle,
      state: self.state.clone(),
    };
    let linked = program.link();

    // the stages are not needed by the program anymore once linked
    gl::DetachShader(handle, vertex.handle);
    gl::DetachShader(handle, fragment.handle);

    linked.map(move |_| program)
  }

  unsafe fn use_program(&mut self, program: &Self::ProgramRepr) {
    self.state.borrow_mut().use_program(program.handle);
  }

  unsafe fn uniform_location(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let location = gl::GetUniformLocation(program.handle, c_name.as_ptr() as *const GLchar);

    if location < 0 {
      None
    } else {
      Some(location)
    }
  }

  unsafe fn ask_uniform<T>(
    &mut self,
    program: &Self::ProgramRepr,
    name: &str,
  ) -> Result<Uniform<T>, UniformWarning>
  where
    Self: Uniformable<T>,
  {
    // ensure the location smells good
    let location = self
      .uniform_location(program, name)
      .ok_or_else(|| UniformWarning::inactive(name))?;

    // ensure the type is correct regarding what we have in the type-system
    uniform_type_match(program.handle, name, <Self as Uniformable<T>>::ty())?;

    Ok(Uniform::new(location))
  }

  unsafe fn unbound<T>(&mut self) -> Uniform<T>
  where
    Self: Uniformable<T>,
  {
    Uniform::new(-1)
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

// Turn an info log buffer into a string; `written` excludes the NUL terminator.
fn info_log(mut log: Vec<u8>, written: GLsizei) -> String {
  log.truncate(written.max(0) as usize);

  while log.last() == Some(&0) {
    log.pop();
  }

  String::from_utf8_lossy(&log).into_owned()
}

fn uniform_type_match(program: GLuint, name: &str, ty: UniformType) -> Result<(), UniformWarning> {
  let c_name = CString::new(name.as_bytes()).map_err(|_| UniformWarning::inactive(name))?;
  let mut index: GLuint = gl::INVALID_INDEX;
  let mut glty: GLenum = 0;
  let mut found_size: GLint = 0;

  unsafe {
    // get the index of the uniform
    gl::GetUniformIndices(
      program,
      1,
      [c_name.as_ptr() as *const GLchar].as_ptr(),
      &mut index,
    );

    if index == gl::INVALID_INDEX {
      return Err(UniformWarning::inactive(name));
    }

    // get its size and type; the name is not needed
    let mut name_ = [0 as GLchar; 1];
    gl::GetActiveUniform(
      program,
      index,
      name_.len() as GLsizei,
      null_mut(),
      &mut found_size,
      &mut glty,
      name_.as_mut_ptr(),
    );
  }

  check_uniform_type_match(name, ty, glty)
}

fn check_uniform_type_match(
  name: &str,
  ty: UniformType,
  glty: GLenum,
) -> Result<(), UniformWarning> {
  // helper macro to check type mismatch for each variant
  macro_rules! milkcheck {
    ($ty:expr, $( ( $v:tt, $t:tt ) ),* $(,)?) => {
      match $ty {
        $(
          UniformType::$v => {
            if glty == gl::$t {
              Ok(())
            } else {
              Err(UniformWarning::type_mismatch(name, ty))
            }
          }
        )*
      }
    }
  }

  milkcheck!(
    ty,
    (Int, INT),
    (UInt, UNSIGNED_INT),
    (Float, FLOAT),
    (Bool, BOOL),
  )
}

macro_rules! impl_Uniformable {
  ($t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(&mut self, _: &Program, uniform: &Uniform<$t>, value: $t) {
        gl::$f(uniform.index(), value);
      }
    }
  };
}

impl_Uniformable!(i32, Int, Uniform1i);
impl_Uniformable!(u32, UInt, Uniform1ui);
impl_Uniformable!(f32, Float, Uniform1f);

unsafe impl Uniformable<bool> for GL33 {
  unsafe fn ty() -> UniformType {
    UniformType::Bool
  }

  unsafe fn update(&mut self, _: &Program, uniform: &Uniform<bool>, value: bool) {
    gl::Uniform1i(uniform.index(), value as GLint);
  }
}
