use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "glslview",
    author,
    version,
    about = "Render a GLSL ES fragment shader full-screen in a window",
    after_help = "Controls: Esc quits, P saves a screenshot.\n\
                  The shader may declare `uniform vec2 u_window_size;` and `uniform float u_time;`."
)]
pub struct Cli {
    /// Fragment shader file; read from standard input when omitted.
    #[arg(value_name = "SHADER")]
    pub shader: Option<PathBuf>,

    /// Directory that receives `<name>-<seq>.png` screenshots.
    #[arg(
        long,
        value_name = "DIR",
        env = "GLSLVIEW_SCREENSHOT_DIR",
        default_value = "."
    )]
    pub screenshot_dir: PathBuf,

    /// Window size in physical pixels (e.g. `1280x720`); defaults to half the display.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Present frames as fast as possible instead of waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_reads_stdin() {
        let cli = Cli::try_parse_from(["glslview"]).unwrap();
        assert!(cli.shader.is_none());
        assert_eq!(cli.size, None);
        assert!(!cli.no_vsync);
    }

    #[test]
    fn single_positional_is_the_shader() {
        let cli = Cli::try_parse_from(["glslview", "demo/plasma.frag"]).unwrap();
        assert_eq!(cli.shader, Some(PathBuf::from("demo/plasma.frag")));
    }

    #[test]
    fn extra_positionals_are_rejected() {
        let err = Cli::try_parse_from(["glslview", "a.frag", "b.frag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn size_and_directory_flags() {
        let cli = Cli::try_parse_from([
            "glslview",
            "--size",
            "1280x720",
            "--screenshot-dir",
            "/tmp/shots",
            "--no-vsync",
            "wave.frag",
        ])
        .unwrap();
        assert_eq!(cli.size, Some((1280, 720)));
        assert_eq!(cli.screenshot_dir, PathBuf::from("/tmp/shots"));
        assert!(cli.no_vsync);
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert_eq!(parse_size(" 1920X1080 "), Ok((1920, 1080)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("0x600").is_err());
        assert!(parse_size("widex600").is_err());
    }
}
