use std::num::NonZeroU32;

use glow::HasContext;
use glutin::config::{Api, Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::GlWindow;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle, RawWindowHandle};
use tracing::{debug, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Window, WindowBuilder};

use crate::compile::{
    assemble_stage_source, LinkFailure, ProgramError, TIME_UNIFORM, VERTEX_SHADER_BODY,
    WINDOW_SIZE_UNIFORM,
};
use crate::runtime::{FrameUniforms, SessionClock};
use crate::screenshot::{allocate_pixels, ScreenshotError};
use crate::types::{initial_window_size, ViewerConfig};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to create window")]
    Window(#[source] winit::error::OsError),
    #[error("failed to connect to the GL display")]
    Display(#[source] glutin::error::Error),
    #[error("failed to query GL configs")]
    Config(#[source] glutin::error::Error),
    #[error("no OpenGL ES 3.0 config is available for this window")]
    NoConfig,
    #[error("failed to create OpenGL ES 3.0 context")]
    Context(#[source] glutin::error::Error),
    #[error("failed to create window surface")]
    Surface(#[source] glutin::error::Error),
    #[error("failed to make GL context current")]
    MakeCurrent(#[source] glutin::error::Error),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error("failed to present frame")]
    Present(#[source] glutin::error::Error),
}

/// Compiled program plus the objects it was built from.
struct ShaderProgram {
    program: glow::Program,
    vertex: glow::Shader,
    fragment: glow::Shader,
    vertex_array: glow::VertexArray,
    window_size: Option<glow::UniformLocation>,
    time: Option<glow::UniformLocation>,
}

/// Window, GL ES 3.0 context and the linked full-screen program.
///
/// Field order is drop order: GL objects are deleted in `Drop` while the
/// context is still current, then the context, surface and finally the window
/// are released.
pub struct RenderSession {
    gl: glow::Context,
    program: ShaderProgram,
    clock: SessionClock,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
}

impl RenderSession {
    /// Opens the window and builds the program. Any failure is fatal; objects
    /// created before the failing step are released together with the context
    /// and window.
    pub fn new(
        event_loop: &EventLoopWindowTarget<()>,
        config: &ViewerConfig,
    ) -> Result<Self, SessionError> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let display_size = monitor.as_ref().map(|m| (m.size().width, m.size().height));
        if display_size.is_none() {
            warn!("can't query display bounds; assuming 1920x1080");
        }
        let (width, height) = config
            .requested_size
            .unwrap_or_else(|| initial_window_size(display_size));

        let mut window_builder = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_visible(true);
        if let Some(monitor) = &monitor {
            let origin = monitor.position();
            let size = monitor.size();
            let (x, y) = centered_position(
                (origin.x, origin.y),
                (size.width, size.height),
                (width, height),
            );
            window_builder = window_builder.with_position(PhysicalPosition::new(x, y));
        }

        let window = window_builder
            .build(event_loop)
            .map_err(SessionError::Window)?;
        let raw_window = window.raw_window_handle();
        let gl_display = unsafe {
            Display::new(window.raw_display_handle(), display_preference(raw_window))
        }
        .map_err(SessionError::Display)?;

        let template = ConfigTemplateBuilder::new()
            .with_api(Api::GLES3)
            .compatible_with_native_window(raw_window)
            .build();
        let configs = unsafe { gl_display.find_configs(template) }.map_err(SessionError::Config)?;
        let gl_config = pick_config(configs).ok_or(SessionError::NoConfig)?;
        debug!(
            samples = gl_config.num_samples(),
            srgb = gl_config.srgb_capable(),
            "selected GL config"
        );

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
            .build(Some(raw_window));
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(SessionError::Context)?;

        let surface_attributes = window.build_surface_attributes(
            SurfaceAttributesBuilder::<WindowSurface>::new().with_srgb(Some(false)),
        );
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(SessionError::Surface)?;
        let context = not_current
            .make_current(&surface)
            .map_err(SessionError::MakeCurrent)?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = surface.set_swap_interval(&context, interval) {
            warn!("can't set swap interval: {err}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        let program = unsafe { build_program(&gl, &config.fragment_source)? };

        let drawable = window.inner_size();
        unsafe {
            gl.use_program(Some(program.program));
            gl.bind_vertex_array(Some(program.vertex_array));
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.pixel_store_i32(glow::PACK_ROW_LENGTH, 0);
            gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            gl.viewport(0, 0, drawable.width as i32, drawable.height as i32);
        }
        debug!(
            width = drawable.width,
            height = drawable.height,
            window_size_uniform = program.window_size.is_some(),
            time_uniform = program.time.is_some(),
            "render session ready"
        );

        Ok(Self {
            gl,
            program,
            clock: SessionClock::start(),
            context,
            surface,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Drawable size in physical pixels; larger than the logical window size
    /// on high-DPI displays.
    pub fn drawable_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    pub fn uniforms(&self, drawable: (u32, u32)) -> FrameUniforms {
        FrameUniforms::new(drawable, self.clock.elapsed_seconds())
    }

    /// Resizes the GL surface and viewport. A zero-sized (minimised) window
    /// keeps the previous surface.
    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, w, h);
        }
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
    }

    pub fn draw(&self, uniforms: &FrameUniforms) {
        let gl = &self.gl;
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT);
            if let Some(location) = &self.program.window_size {
                gl.uniform_2_f32(Some(location), uniforms.window_size[0], uniforms.window_size[1]);
            }
            if let Some(location) = &self.program.time {
                gl.uniform_1_f32(Some(location), uniforms.time);
            }
            gl.draw_arrays(glow::TRIANGLES, 0, 3);
        }
    }

    /// Reads the back buffer as tightly packed RGBA8, bottom row first.
    pub fn read_pixels(&self, width: u32, height: u32) -> Result<Vec<u8>, ScreenshotError> {
        let mut pixels = allocate_pixels(width, height)?;
        unsafe {
            self.gl.read_pixels(
                0,
                0,
                width as i32,
                height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut pixels[..]),
            );
        }
        Ok(pixels)
    }

    pub fn present(&self) -> Result<(), SessionError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(SessionError::Present)
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        let gl = &self.gl;
        unsafe {
            gl.use_program(None);
            gl.bind_vertex_array(None);
            gl.delete_vertex_array(self.program.vertex_array);
            gl.delete_program(self.program.program);
            gl.delete_shader(self.program.vertex);
            gl.delete_shader(self.program.fragment);
        }
        debug!("render session released");
    }
}

/// Config with the fewest samples; `None` when the driver matched nothing.
fn pick_config(configs: impl Iterator<Item = Config>) -> Option<Config> {
    configs.min_by_key(|config| config.num_samples())
}

#[cfg(target_os = "windows")]
fn display_preference(window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Wgl(Some(window))
}

#[cfg(target_os = "macos")]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

unsafe fn build_program(gl: &glow::Context, fragment_body: &str) -> Result<ShaderProgram, ProgramError> {
    let program = gl.create_program().map_err(|reason| ProgramError::Create {
        what: "shader program",
        reason,
    })?;
    let vertex = gl
        .create_shader(glow::VERTEX_SHADER)
        .map_err(|reason| ProgramError::Create {
            what: "vertex shader",
            reason,
        })?;
    let fragment = gl
        .create_shader(glow::FRAGMENT_SHADER)
        .map_err(|reason| ProgramError::Create {
            what: "fragment shader",
            reason,
        })?;
    let vertex_array = gl.create_vertex_array().map_err(|reason| ProgramError::Create {
        what: "vertex array",
        reason,
    })?;

    gl.shader_source(vertex, &assemble_stage_source(VERTEX_SHADER_BODY));
    gl.shader_source(fragment, &assemble_stage_source(fragment_body));
    gl.compile_shader(vertex);
    gl.compile_shader(fragment);
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    if !gl.get_program_link_status(program) {
        let failure = LinkFailure {
            program_log: gl.get_program_info_log(program),
            vertex_log: (!gl.get_shader_compile_status(vertex))
                .then(|| gl.get_shader_info_log(vertex)),
            fragment_log: (!gl.get_shader_compile_status(fragment))
                .then(|| gl.get_shader_info_log(fragment)),
        };
        failure.log();
        return Err(ProgramError::Link(failure));
    }

    Ok(ShaderProgram {
        program,
        vertex,
        fragment,
        vertex_array,
        window_size: gl.get_uniform_location(program, WINDOW_SIZE_UNIFORM),
        time: gl.get_uniform_location(program, TIME_UNIFORM),
    })
}

/// Top-left corner that centres a window of `window` pixels on a monitor.
pub fn centered_position(
    monitor_origin: (i32, i32),
    monitor_size: (u32, u32),
    window: (u32, u32),
) -> (i32, i32) {
    let offset = |monitor: u32, window: u32| (monitor.saturating_sub(window) / 2) as i32;
    (
        monitor_origin.0 + offset(monitor_size.0, window.0),
        monitor_origin.1 + offset(monitor_size.1, window.1),
    )
}
