use std::path::PathBuf;

/// Screenshot prefix used when the shader did not come from a named file.
pub const DEFAULT_SCREENSHOT_PREFIX: &str = "glslview";

/// Display resolution assumed when no monitor can be queried.
pub const FALLBACK_DISPLAY_SIZE: (u32, u32) = (1920, 1080);

/// Where and under which name screenshots are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotConfig {
    /// Directory receiving `<prefix>-<seq>.png` files.
    pub directory: PathBuf,
    /// Stem shared by every screenshot of this session.
    pub prefix: String,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: DEFAULT_SCREENSHOT_PREFIX.to_string(),
        }
    }
}

/// Immutable configuration passed to the viewer at start-up.
///
/// The application builds this from CLI flags and the loaded shader text; the
/// renderer never reads files or arguments on its own.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title.
    pub title: String,
    /// GLSL ES fragment shader body, without `#version` or precision lines.
    pub fragment_source: String,
    /// Explicit window size in physical pixels. `None` means half the display.
    pub requested_size: Option<(u32, u32)>,
    /// Request a swap interval of one (vertical sync).
    pub vsync: bool,
    /// Screenshot naming.
    pub screenshots: ScreenshotConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_SCREENSHOT_PREFIX.to_string(),
            fragment_source: String::new(),
            requested_size: None,
            vsync: true,
            screenshots: ScreenshotConfig::default(),
        }
    }
}

/// Computes the initial window size: half of the display, at least 1×1.
pub fn initial_window_size(display: Option<(u32, u32)>) -> (u32, u32) {
    let (width, height) = display
        .filter(|(w, h)| *w > 0 && *h > 0)
        .unwrap_or(FALLBACK_DISPLAY_SIZE);
    ((width / 2).max(1), (height / 2).max(1))
}
