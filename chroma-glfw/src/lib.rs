//! [GLFW](https://crates.io/crates/glfw) backend for chroma.
//!
//! [`GlfwSurface`] opens a window with an OpenGL 3.3 core context, loads the OpenGL function
//! pointers and hands you a [`GL33Context`] to build shader programs with.

#![deny(missing_docs)]

use chroma::context::GraphicsContext;
pub use chroma_gl::gl33::StateQueryError;
use chroma_gl::GL33;
use chroma_windowing::{CursorMode, WindowDim, WindowOpt};
use glfw::{self, Context, InitError, Window, WindowEvent, WindowMode};
use std::{error, fmt, os::raw::c_void, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  WindowCreationFailed,

  /// No primary monitor detected; fullscreen is not available.
  NoPrimaryMonitor,

  /// No video mode available for the primary monitor.
  NoVideoMode,

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlfwSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::NoVideoMode => f.write_str("no video mode"),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl From<InitError> for GlfwSurfaceError {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl From<StateQueryError> for GlfwSurfaceError {
  fn from(e: StateQueryError) -> Self {
    GlfwSurfaceError::GraphicsStateError(e)
  }
}

impl error::Error for GlfwSurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you can use it with to
/// poll events and the [`GL33Context`], which allows you to perform the rendering part.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped chroma context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Initialize GLFW and open a window with an OpenGL 3.3 core context.
  ///
  /// The context is made current on the calling thread, which then owns the graphics state.
  pub fn new_gl33(title: impl AsRef<str>, win_opt: WindowOpt) -> Result<Self, GlfwSurfaceError> {
    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));
    glfw.window_hint(glfw::WindowHint::Samples(*win_opt.num_samples()));

    let title = title.as_ref();

    let (mut window, events_rx) = match *win_opt.dim() {
      WindowDim::Windowed { width, height } => glfw
        .create_window(width, height, title, WindowMode::Windowed)
        .ok_or(GlfwSurfaceError::WindowCreationFailed)?,

      WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
        let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;
        let vmode = monitor
          .get_video_mode()
          .ok_or(GlfwSurfaceError::NoVideoMode)?;

        glfw
          .create_window(
            vmode.width,
            vmode.height,
            title,
            WindowMode::FullScreen(monitor),
          )
          .ok_or(GlfwSurfaceError::WindowCreationFailed)
      })?,

      WindowDim::FullscreenRestricted { width, height } => {
        glfw.with_primary_monitor(|glfw, monitor| {
          let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

          glfw
            .create_window(width, height, title, WindowMode::FullScreen(monitor))
            .ok_or(GlfwSurfaceError::WindowCreationFailed)
        })?
      }
    };

    window.make_current();

    match *win_opt.cursor_mode() {
      CursorMode::Visible => window.set_cursor_mode(glfw::CursorMode::Normal),
      CursorMode::Invisible => window.set_cursor_mode(glfw::CursorMode::Hidden),
      CursorMode::Disabled => window.set_cursor_mode(glfw::CursorMode::Disabled),
    }

    window.set_all_polling(true);
    glfw.set_swap_interval(glfw::SwapInterval::Sync(1));

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new()?;
    log::debug!("OpenGL 3.3 context ready for window “{}”", title);

    let context = GL33Context { window, gl };
    let surface = GlfwSurface { events_rx, context };

    Ok(surface)
  }
}

/// chroma OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

impl GL33Context {
  /// Size of the framebuffer, in pixels.
  pub fn framebuffer_size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  /// Present the back buffer.
  pub fn swap_buffers(&mut self) {
    self.window.swap_buffers();
  }
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_messages() {
    assert_eq!(
      GlfwSurfaceError::WindowCreationFailed.to_string(),
      "failed to create window"
    );
    assert_eq!(
      GlfwSurfaceError::from(StateQueryError::UnavailableGLState).to_string(),
      format!(
        "failed to get graphics state: {}",
        StateQueryError::UnavailableGLState
      )
    );
  }
}
