//! In-memory driver used to exercise the shader API without a GPU.
//!
//! The “compiler” understands just enough GLSL for the tests:
//!
//! - a source containing `#error <msg>` fails to compile with `<msg>` in the log;
//! - a source without `void main` fails to compile;
//! - `out` declarations of the vertex stage must cover every `in` declaration of the fragment
//!   stage, otherwise linking fails;
//! - `uniform <type> <name>;` declarations get a location, in declaration order.
//!
//! Like a real driver, uniform updates go to the *active* program.

#![allow(dead_code)]

use chroma::backend::shader::{Shader, Uniformable};
use chroma::context::GraphicsContext;
use chroma::shader::{ProgramError, StageError, StageType, Uniform, UniformType, UniformWarning};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A value stored in a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
  Bool(bool),
  Int(i32),
  UInt(u32),
  Float(f32),
}

#[derive(Debug)]
struct LinkedProgram {
  uniforms: Vec<(String, Option<UniformType>)>,
  values: HashMap<i32, Value>,
}

/// Observable driver state.
#[derive(Debug, Default)]
pub struct DriverState {
  next_handle: u32,
  programs: HashMap<u32, LinkedProgram>,
  /// Stage objects currently alive.
  pub live_stages: HashSet<u32>,
  /// Program objects currently alive.
  pub live_programs: HashSet<u32>,
  /// Number of stage objects ever created.
  pub stages_created: usize,
  /// Active program; `0` means none.
  pub current_program: u32,
  /// Number of `use_program` calls.
  pub use_program_calls: usize,
  /// Number of invalid driver calls (e.g. uniform update without an active program).
  pub errors: usize,
}

impl DriverState {
  fn gen_handle(&mut self) -> u32 {
    self.next_handle += 1;
    self.next_handle
  }

  /// Value of a uniform of a live program, by name.
  pub fn uniform_value(&self, program: u32, name: &str) -> Option<Value> {
    let linked = self.programs.get(&program)?;
    let index = linked.uniforms.iter().position(|(n, _)| n == name)?;
    linked.values.get(&(index as i32)).copied()
  }

  fn write_uniform(&mut self, index: i32, value: Value) {
    if index < 0 {
      return;
    }

    let current = self.current_program;
    let linked = match self.programs.get_mut(&current) {
      Some(linked) => linked,
      None => {
        self.errors += 1;
        return;
      }
    };

    let accepted = match linked.uniforms.get(index as usize) {
      Some((_, Some(ty))) => accepts(*ty, value),
      _ => false,
    };

    if accepted {
      linked.values.insert(index, value);
    } else {
      self.errors += 1;
    }
  }
}

fn accepts(declared: UniformType, value: Value) -> bool {
  matches!(
    (declared, value),
    (UniformType::Bool, Value::Bool(_))
      | (UniformType::Bool, Value::Int(_))
      | (UniformType::Int, Value::Int(_))
      | (UniformType::UInt, Value::UInt(_))
      | (UniformType::Float, Value::Float(_))
  )
}

/// The in-memory backend.
#[derive(Debug)]
pub struct Driver {
  state: Rc<RefCell<DriverState>>,
}

#[derive(Debug)]
pub struct TestStage {
  handle: u32,
  ty: StageType,
  outputs: Vec<String>,
  inputs: Vec<String>,
  uniforms: Vec<(String, Option<UniformType>)>,
  state: Rc<RefCell<DriverState>>,
}

impl Drop for TestStage {
  fn drop(&mut self) {
    self.state.borrow_mut().live_stages.remove(&self.handle);
  }
}

#[derive(Debug)]
pub struct TestProgram {
  handle: u32,
  state: Rc<RefCell<DriverState>>,
}

impl TestProgram {
  pub fn handle(&self) -> u32 {
    self.handle
  }
}

impl Drop for TestProgram {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();
    state.live_programs.remove(&self.handle);
    state.programs.remove(&self.handle);

    if state.current_program == self.handle {
      state.current_program = 0;
    }
  }
}

unsafe impl Shader for Driver {
  type StageRepr = TestStage;

  type ProgramRepr = TestProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let handle = {
      let mut state = self.state.borrow_mut();
      let handle = state.gen_handle();
      state.stages_created += 1;
      state.live_stages.insert(handle);
      handle
    };

    let mut stage = TestStage {
      handle,
      ty,
      outputs: Vec::new(),
      inputs: Vec::new(),
      uniforms: Vec::new(),
      state: self.state.clone(),
    };

    // dropping the stage on the error paths releases it
    compile(&mut stage, src)?;

    Ok(stage)
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = {
      let mut state = self.state.borrow_mut();
      let handle = state.gen_handle();
      state.live_programs.insert(handle);
      handle
    };

    let program = TestProgram {
      handle,
      state: self.state.clone(),
    };

    if let Some(missing) = fragment
      .inputs
      .iter()
      .find(|input| !vertex.outputs.contains(input))
    {
      return Err(ProgramError::link_failed(format!(
        "error: fragment shader input `{}` has no matching vertex shader output",
        missing
      )));
    }

    let mut uniforms = vertex.uniforms.clone();
    for uniform in &fragment.uniforms {
      if !uniforms.iter().any(|(name, _)| *name == uniform.0) {
        uniforms.push(uniform.clone());
      }
    }

    self.state.borrow_mut().programs.insert(
      handle,
      LinkedProgram {
        uniforms,
        values: HashMap::new(),
      },
    );

    Ok(program)
  }

  unsafe fn use_program(&mut self, program: &Self::ProgramRepr) {
    let mut state = self.state.borrow_mut();
    state.use_program_calls += 1;
    state.current_program = program.handle;
  }

  unsafe fn uniform_location(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32> {
    let state = self.state.borrow();
    let linked = state.programs.get(&program.handle)?;

    linked
      .uniforms
      .iter()
      .position(|(n, _)| n == name)
      .map(|index| index as i32)
  }

  unsafe fn ask_uniform<T>(
    &mut self,
    program: &Self::ProgramRepr,
    name: &str,
  ) -> Result<Uniform<T>, UniformWarning>
  where
    Self: Uniformable<T>,
  {
    let index = self
      .uniform_location(program, name)
      .ok_or_else(|| UniformWarning::inactive(name))?;

    let state = self.state.borrow();
    let declared = state
      .programs
      .get(&program.handle)
      .and_then(|linked| linked.uniforms[index as usize].1);

    if declared != Some(<Self as Uniformable<T>>::ty()) {
      return Err(UniformWarning::type_mismatch(
        name,
        <Self as Uniformable<T>>::ty(),
      ));
    }

    Ok(Uniform::new(index))
  }

  unsafe fn unbound<T>(&mut self) -> Uniform<T>
  where
    Self: Uniformable<T>,
  {
    Uniform::new(-1)
  }
}

macro_rules! impl_Uniformable {
  ($t:ty, $uty:tt, $v:tt) => {
    unsafe impl Uniformable<$t> for Driver {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(&mut self, _: &Self::ProgramRepr, uniform: &Uniform<$t>, value: $t) {
        self
          .state
          .borrow_mut()
          .write_uniform(uniform.index(), Value::$v(value));
      }
    }
  };
}

impl_Uniformable!(bool, Bool, Bool);
impl_Uniformable!(i32, Int, Int);
impl_Uniformable!(u32, UInt, UInt);
impl_Uniformable!(f32, Float, Float);

fn compile(stage: &mut TestStage, src: &str) -> Result<(), StageError> {
  for (line_nb, line) in src.lines().enumerate() {
    if let Some(msg) = line.trim().strip_prefix("#error") {
      return Err(StageError::compilation_failed(
        stage.ty,
        format!("0:{}(1): error: {}", line_nb + 1, msg.trim()),
      ));
    }
  }

  if !src.contains("void main") {
    return Err(StageError::compilation_failed(
      stage.ty,
      "error: no function with name 'main'",
    ));
  }

  for decl in src.lines().filter_map(declaration) {
    match decl {
      ("in", _, name) => stage.inputs.push(name.to_owned()),
      ("out", _, name) => stage.outputs.push(name.to_owned()),
      ("uniform", ty, name) => stage.uniforms.push((name.to_owned(), glsl_type(ty))),
      _ => (),
    }
  }

  // vertex inputs are attributes and fragment outputs are color targets
  match stage.ty {
    StageType::VertexShader => stage.inputs.clear(),
    StageType::FragmentShader => stage.outputs.clear(),
  }

  Ok(())
}

// Parse `[layout(...)] <qualifier> <type> <name>;`.
fn declaration(line: &str) -> Option<(&str, &str, &str)> {
  let mut line = line.trim();

  if line.starts_with("layout") {
    let end = line.find(')')?;
    line = line[end + 1..].trim_start();
  }

  let line = line.strip_suffix(';')?;
  let mut words = line.split_whitespace();
  let qualifier = words.next()?;
  let ty = words.next()?;
  let name = words.next()?;

  if words.next().is_some() {
    return None;
  }

  Some((qualifier, ty, name))
}

fn glsl_type(ty: &str) -> Option<UniformType> {
  match ty {
    "bool" => Some(UniformType::Bool),
    "int" => Some(UniformType::Int),
    "uint" => Some(UniformType::UInt),
    "float" => Some(UniformType::Float),
    _ => None,
  }
}

/// A context wrapping the in-memory driver.
#[derive(Debug)]
pub struct TestContext {
  driver: Driver,
}

impl TestContext {
  pub fn new() -> Self {
    TestContext {
      driver: Driver {
        state: Rc::new(RefCell::new(DriverState::default())),
      },
    }
  }

  /// Shared access to the driver state, usable after programs are gone.
  pub fn state(&self) -> Rc<RefCell<DriverState>> {
    self.driver.state.clone()
  }
}

unsafe impl GraphicsContext for TestContext {
  type Backend = Driver;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.driver
  }
}

/// Path of a file in `tests/fixtures`.
pub fn fixture(name: &str) -> std::path::PathBuf {
  std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}
