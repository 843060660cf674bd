use std::io::IsTerminal;

use anyhow::{Context, Result};
use renderer::{ScreenshotConfig, Viewer, ViewerConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::source::{self, SourceError, USAGE};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let source = source::load(cli.shader.as_deref()).map_err(|err| {
        if matches!(err, SourceError::InteractiveStdin) {
            eprintln!("{USAGE}");
        }
        err
    })?;
    info!(
        origin = %source.origin,
        bytes = source.text.len(),
        "loaded fragment shader"
    );

    let config = ViewerConfig {
        title: source.window_title(),
        fragment_source: source.text,
        requested_size: cli.size,
        vsync: !cli.no_vsync,
        screenshots: ScreenshotConfig {
            directory: cli.screenshot_dir,
            prefix: source.prefix,
        },
    };
    debug!(
        title = %config.title,
        requested_size = ?config.requested_size,
        vsync = config.vsync,
        screenshot_prefix = %config.screenshots.prefix,
        "starting viewer"
    );

    Viewer::new(config).run().context("viewer failed")
}
