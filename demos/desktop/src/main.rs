//! Colored quad demo.
//!
//! Renders a quad whose vertices carry a color. The shader program is read from files and gets two
//! uniforms every frame: `ratio`, animated over time, and `grayscale`, toggled with <kbd>Space</kbd>.
//!
//! Press <kbd>Escape</kbd> or close the window to quit.

use chroma::shader::{Program, ProgramError};
use chroma_gl::GL33;
use chroma_glfw::{GlfwSurface, GlfwSurfaceError};
use chroma_windowing::{WindowDim, WindowOpt};
use gl::types::*;
use glfw::{Action, Key, WindowEvent};
use std::{
  error::Error,
  fmt, mem,
  path::{Path, PathBuf},
  process,
  ptr::null,
  time::Instant,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(long)]
  /// Vertex shader to use instead of the bundled one.
  vertex: Option<PathBuf>,

  #[structopt(long)]
  /// Fragment shader to use instead of the bundled one.
  fragment: Option<PathBuf>,

  #[structopt(long, default_value = "800")]
  /// Width of the window.
  width: u32,

  #[structopt(long, default_value = "600")]
  /// Height of the window.
  height: u32,
}

// Bundled shader, resolved from the package directory.
fn bundled_shader(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("shaders")
    .join(name)
}

#[derive(Debug)]
enum DemoError {
  Surface(GlfwSurfaceError),
  Program(ProgramError),
}

impl fmt::Display for DemoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DemoError::Surface(ref e) => write!(f, "cannot create surface: {}", e),
      DemoError::Program(ref e) => write!(f, "cannot create shader program: {}", e),
    }
  }
}

impl Error for DemoError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      DemoError::Surface(e) => Some(e),
      DemoError::Program(e) => Some(e),
    }
  }
}

impl From<GlfwSurfaceError> for DemoError {
  fn from(e: GlfwSurfaceError) -> Self {
    DemoError::Surface(e)
  }
}

impl From<ProgramError> for DemoError {
  fn from(e: ProgramError) -> Self {
    DemoError::Program(e)
  }
}

// position, color
const VERTICES: [[f32; 6]; 4] = [
  [0.5, 0.5, 0., 1., 0., 0.],
  [0.5, -0.5, 0., 0., 1., 0.],
  [-0.5, -0.5, 0., 0., 0., 1.],
  [-0.5, 0.5, 0., 1., 1., 0.],
];

const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// GPU-side quad: vertex array, vertex buffer and element buffer.
///
/// Must be dropped while the OpenGL context is still alive.
struct Quad {
  vao: GLuint,
  vbo: GLuint,
  ebo: GLuint,
}

impl Quad {
  fn new() -> Self {
    let (mut vao, mut vbo, mut ebo) = (0, 0, 0);

    unsafe {
      gl::GenVertexArrays(1, &mut vao);
      gl::GenBuffers(1, &mut vbo);
      gl::GenBuffers(1, &mut ebo);

      gl::BindVertexArray(vao);

      gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
      gl::BufferData(
        gl::ARRAY_BUFFER,
        mem::size_of_val(&VERTICES) as GLsizeiptr,
        VERTICES.as_ptr() as *const _,
        gl::STATIC_DRAW,
      );

      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
      gl::BufferData(
        gl::ELEMENT_ARRAY_BUFFER,
        mem::size_of_val(&INDICES) as GLsizeiptr,
        INDICES.as_ptr() as *const _,
        gl::STATIC_DRAW,
      );

      let stride = mem::size_of::<[f32; 6]>() as GLsizei;

      // aPos
      gl::VertexAttribPointer(0, 3, gl::FLOAT, gl::FALSE, stride, null());
      gl::EnableVertexAttribArray(0);

      // aColor
      gl::VertexAttribPointer(
        1,
        3,
        gl::FLOAT,
        gl::FALSE,
        stride,
        (3 * mem::size_of::<f32>()) as *const _,
      );
      gl::EnableVertexAttribArray(1);

      gl::BindVertexArray(0);
    }

    Quad { vao, vbo, ebo }
  }

  fn draw(&self) {
    unsafe {
      gl::BindVertexArray(self.vao);
      gl::DrawElements(
        gl::TRIANGLES,
        INDICES.len() as GLsizei,
        gl::UNSIGNED_INT,
        null(),
      );
      gl::BindVertexArray(0);
    }
  }
}

impl Drop for Quad {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteBuffers(1, &self.ebo);
      gl::DeleteBuffers(1, &self.vbo);
      gl::DeleteVertexArrays(1, &self.vao);
    }
  }
}

fn run(cli_opts: CLIOpts) -> Result<(), DemoError> {
  let dim = WindowDim::Windowed {
    width: cli_opts.width,
    height: cli_opts.height,
  };
  let surface = GlfwSurface::new_gl33("chroma", WindowOpt::default().set_dim(dim))?;
  let mut context = surface.context;
  let events = surface.events_rx;

  let vertex = cli_opts
    .vertex
    .unwrap_or_else(|| bundled_shader("quad.vert"));
  let fragment = cli_opts
    .fragment
    .unwrap_or_else(|| bundled_shader("quad.frag"));

  let program: Program<GL33> = Program::from_files(&mut context, &vertex, &fragment)?;
  let quad = Quad::new();

  let [fb_w, fb_h] = context.framebuffer_size();
  unsafe {
    gl::Viewport(0, 0, fb_w as GLsizei, fb_h as GLsizei);
  }

  let start_t = Instant::now();
  let mut grayscale = false;

  'app: loop {
    // handle events
    context.window.glfw.poll_events();

    for (_, event) in glfw::flush_messages(&events) {
      match event {
        WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => break 'app,

        WindowEvent::Key(Key::Space, _, Action::Release, _) => {
          grayscale = !grayscale;
          log::info!("grayscale: {}", grayscale);
        }

        WindowEvent::FramebufferSize(width, height) => unsafe {
          gl::Viewport(0, 0, width, height);
        },

        _ => (),
      }
    }

    let t = start_t.elapsed().as_secs_f32();
    let ratio = 0.75 + 0.25 * t.sin();

    unsafe {
      gl::ClearColor(0.2, 0.3, 0.3, 1.);
      gl::Clear(gl::COLOR_BUFFER_BIT);
    }

    program.use_program(&mut context);
    program.set_float(&mut context, "ratio", ratio);
    program.set_bool(&mut context, "grayscale", grayscale);
    quad.draw();

    context.swap_buffers();
  }

  drop(quad);
  program.release();

  Ok(())
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if let Err(e) = run(cli_opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}
