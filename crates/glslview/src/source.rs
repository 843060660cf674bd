use std::fmt;
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use renderer::DEFAULT_SCREENSHOT_PREFIX;
use thiserror::Error;

/// Largest shader accepted, in bytes. Longer input is rejected, never truncated.
pub const MAX_SOURCE_BYTES: u64 = 1 << 20;

pub const USAGE: &str = "Usage:\tglslview shader.glsl\n\tcat shader.glsl | glslview";

/// Where the shader text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    Stdin,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::File(path) => write!(f, "\"{}\"", path.display()),
            SourceOrigin::Stdin => f.write_str("stdin"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no shader file given and standard input is a terminal")]
    InteractiveStdin,
    #[error("can't open \"{}\"", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{origin}: can't read")]
    Read {
        origin: SourceOrigin,
        #[source]
        source: io::Error,
    },
    #[error("{origin}: shader is larger than {limit} bytes")]
    TooLarge { origin: SourceOrigin, limit: u64 },
    #[error("{origin}: shader is not valid UTF-8")]
    NotUtf8 { origin: SourceOrigin },
}

/// Fragment shader text plus the naming details derived from its origin.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub text: String,
    pub origin: SourceOrigin,
    /// Stem used for screenshot file names.
    pub prefix: String,
}

impl ShaderSource {
    pub fn window_title(&self) -> String {
        match &self.origin {
            SourceOrigin::File(path) => format!("glslview - \"{}\"", path.display()),
            SourceOrigin::Stdin => "glslview".to_string(),
        }
    }
}

/// Reads the shader from `path`, or from standard input when no path is given.
pub fn load(path: Option<&Path>) -> Result<ShaderSource, SourceError> {
    match path {
        Some(path) => load_file(path),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(SourceError::InteractiveStdin);
            }
            read_bounded(stdin.lock(), SourceOrigin::Stdin)
        }
    }
}

pub fn load_file(path: &Path) -> Result<ShaderSource, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_bounded(file, SourceOrigin::File(path.to_path_buf()))
}

pub fn read_bounded<R: Read>(reader: R, origin: SourceOrigin) -> Result<ShaderSource, SourceError> {
    let mut bytes = Vec::new();
    if let Err(source) = reader.take(MAX_SOURCE_BYTES + 1).read_to_end(&mut bytes) {
        return Err(SourceError::Read { origin, source });
    }
    if bytes.len() as u64 > MAX_SOURCE_BYTES {
        return Err(SourceError::TooLarge {
            origin,
            limit: MAX_SOURCE_BYTES,
        });
    }
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => return Err(SourceError::NotUtf8 { origin }),
    };

    let prefix = match &origin {
        SourceOrigin::File(path) => screenshot_prefix(path),
        SourceOrigin::Stdin => DEFAULT_SCREENSHOT_PREFIX.to_string(),
    };
    Ok(ShaderSource {
        text,
        origin,
        prefix,
    })
}

/// Base name of `path` without its last extension, e.g. `foo/bar.frag` → `bar`.
pub fn screenshot_prefix(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_SCREENSHOT_PREFIX.to_string())
}
