use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info};
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::input::{translate_window_event, FrameRequest, LoopEvent, LoopState};
use crate::screenshot::{ScreenshotError, ScreenshotWriter};
use crate::session::{RenderSession, SessionError};
use crate::types::ViewerConfig;

/// Opens the viewer window and polls it until the user quits.
///
/// Every loop iteration drains all pending events first; winit then emits
/// `AboutToWait`, where exactly one frame is drawn, optionally captured and
/// presented. The loop never blocks on events, so the only wait is inside the
/// buffer swap.
pub(crate) fn run_event_loop(config: &ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialise event loop")?;
    let session =
        RenderSession::new(&event_loop, config).context("failed to initialise render session")?;
    let writer = ScreenshotWriter::new(&config.screenshots);
    let mut state = LoopState::new(session.drawable_size());

    let (width, height) = state.drawable_size();
    info!(
        width,
        height,
        screenshots = %writer.directory().display(),
        "viewer running (Esc quits, P saves a screenshot)"
    );

    event_loop.set_control_flow(ControlFlow::Poll);
    let mut failure: Option<SessionError> = None;
    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == session.window().id() => {
            let Some(transition) = translate_window_event(&event) else {
                return;
            };
            state.apply(transition);
            match transition {
                LoopEvent::Quit => elwt.exit(),
                LoopEvent::Resized { width, height } => {
                    debug!(width, height, "drawable resized");
                    session.resize(width, height);
                }
                LoopEvent::Screenshot => {}
            }
        }
        Event::AboutToWait => {
            let Some(frame) = state.begin_frame() else {
                return;
            };
            if let Err(err) = render_frame(&session, &writer, frame) {
                failure = Some(err);
                state.apply(LoopEvent::Quit);
                elwt.exit();
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))?;
    if let Some(err) = failure {
        return Err(err).context("render loop aborted");
    }
    debug!("event loop finished");
    Ok(())
}

fn render_frame(
    session: &RenderSession,
    writer: &ScreenshotWriter,
    frame: FrameRequest,
) -> Result<(), SessionError> {
    session.draw(&session.uniforms(frame.drawable));
    if frame.screenshot {
        save_screenshot(session, writer, frame.drawable);
    }
    session.present()
}

/// Captures the frame just drawn. Failures are reported and the loop carries on.
fn save_screenshot(session: &RenderSession, writer: &ScreenshotWriter, drawable: (u32, u32)) {
    let (width, height) = drawable;
    write_screenshot(writer, width, height, session.read_pixels(width, height));
}

/// Encodes read-back pixels and logs the outcome. Returns the written path,
/// or `None` when the capture failed and was reported.
fn write_screenshot(
    writer: &ScreenshotWriter,
    width: u32,
    height: u32,
    pixels: Result<Vec<u8>, ScreenshotError>,
) -> Option<PathBuf> {
    match pixels.and_then(|pixels| writer.save(width, height, pixels)) {
        Ok(path) => {
            info!("saved screenshot \"{}\"", path.display());
            Some(path)
        }
        Err(err) => {
            let err = anyhow::Error::new(err);
            error!("can't save screenshot: {err:#}");
            None
        }
    }
}
