//! Renderer crate for glslview.
//!
//! Opens a window with an OpenGL ES 3.0 context, links a user fragment shader
//! against a built-in full-screen triangle, and redraws it every loop
//! iteration. The overall flow is:
//!
//! ```text
//!   glslview CLI
//!          │ ViewerConfig
//!          ▼
//!   Viewer::run ──▶ RenderSession ──▶ winit event loop (Poll)
//!                                        │ drain events ─▶ LoopState
//!                                        └─ AboutToWait ─▶ draw ─▶ [screenshot] ─▶ swap
//! ```
//!
//! `RenderSession` owns every GL resource and releases them on drop, so both
//! the normal exit and every setup failure unwind through the same path.

mod compile;
mod input;
mod runtime;
mod screenshot;
mod session;
mod types;
mod window;

use anyhow::Result;

pub use compile::ProgramError;
pub use screenshot::ScreenshotError;
pub use session::SessionError;
pub use types::{ScreenshotConfig, ViewerConfig, DEFAULT_SCREENSHOT_PREFIX};

/// High-level entry point that owns the start-up configuration.
pub struct Viewer {
    config: ViewerConfig,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Opens the window and runs until `Escape` or a close request.
    ///
    /// Returns an error if any part of window, context or program setup fails,
    /// or if presenting a frame fails later on. Screenshot failures are logged
    /// and do not end the loop.
    pub fn run(&self) -> Result<()> {
        window::run_event_loop(&self.config)
    }
}
