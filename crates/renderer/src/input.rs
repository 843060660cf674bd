//! Loop state mutated by window events.
//!
//! winit events are first translated into [`LoopEvent`]s so the transitions
//! (quit, screenshot request, resize) can be exercised without a display.

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Transitions recognised by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// Close box, system quit or `Escape`.
    Quit,
    /// `P` pressed: capture the frame rendered in this iteration.
    Screenshot,
    /// Drawable surface changed size (physical pixels).
    Resized { width: u32, height: u32 },
}

/// Work requested for the frame about to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub drawable: (u32, u32),
    pub screenshot: bool,
}

#[derive(Debug, Clone)]
pub struct LoopState {
    running: bool,
    screenshot_requested: bool,
    drawable: (u32, u32),
}

impl LoopState {
    pub fn new(drawable: (u32, u32)) -> Self {
        Self {
            running: true,
            screenshot_requested: false,
            drawable,
        }
    }

    pub fn drawable_size(&self) -> (u32, u32) {
        self.drawable
    }

    pub fn apply(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Quit => self.running = false,
            LoopEvent::Screenshot => self.screenshot_requested = true,
            LoopEvent::Resized { width, height } => self.drawable = (width, height),
        }
    }

    /// Called once all pending events are drained. Returns `None` once the
    /// loop has been asked to stop, so nothing is drawn or presented after a
    /// quit request. The screenshot flag is consumed by this call.
    pub fn begin_frame(&mut self) -> Option<FrameRequest> {
        if !self.running {
            return None;
        }
        let screenshot = std::mem::take(&mut self.screenshot_requested);
        Some(FrameRequest {
            drawable: self.drawable,
            screenshot,
        })
    }
}

/// Maps a winit window event onto a viewer transition.
pub fn translate_window_event(event: &WindowEvent) -> Option<LoopEvent> {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(LoopEvent::Quit),
        WindowEvent::KeyboardInput { event, .. } => {
            classify_key(&event.logical_key, event.state, event.repeat)
        }
        WindowEvent::Resized(size) => Some(LoopEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        _ => None,
    }
}

pub fn classify_key(key: &Key, state: ElementState, repeat: bool) -> Option<LoopEvent> {
    if state != ElementState::Pressed {
        return None;
    }
    match key {
        Key::Named(NamedKey::Escape) => Some(LoopEvent::Quit),
        Key::Character(value) if value.eq_ignore_ascii_case("p") && !repeat => {
            Some(LoopEvent::Screenshot)
        }
        _ => None,
    }
}
