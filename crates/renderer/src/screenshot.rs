//! PNG screenshots of the current framebuffer.
//!
//! Files are named `{directory}/{prefix}-{seq:04x}.png`. The sequence number
//! is found by probing upwards from zero until a free name turns up; another
//! process creating the same name between the probe and the write is not
//! guarded against.

use std::collections::TryReserveError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::imageops::flip_vertical_in_place;
use image::{ImageFormat, RgbaImage};

use crate::types::ScreenshotConfig;

pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("drawable surface is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("drawable size {width}x{height} is too large to capture")]
    Oversized { width: u32, height: u32 },
    #[error("out of memory allocating {bytes} bytes for readback")]
    Allocation {
        bytes: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("failed to prepare screenshot directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Byte length of a tightly packed RGBA8 image.
pub fn pixel_buffer_len(width: u32, height: u32) -> Result<usize, ScreenshotError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or(ScreenshotError::Oversized { width, height })
}

/// Allocates a zeroed readback buffer, reporting allocation failure instead of
/// aborting.
pub fn allocate_pixels(width: u32, height: u32) -> Result<Vec<u8>, ScreenshotError> {
    let bytes = pixel_buffer_len(width, height)?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(bytes)
        .map_err(|source| ScreenshotError::Allocation { bytes, source })?;
    pixels.resize(bytes, 0);
    Ok(pixels)
}

#[derive(Debug, Clone)]
pub struct ScreenshotWriter {
    directory: PathBuf,
    prefix: String,
}

impl ScreenshotWriter {
    pub fn new(config: &ScreenshotConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            prefix: config.prefix.clone(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn candidate_path(&self, sequence: u64) -> PathBuf {
        self.directory
            .join(format!("{}-{:04x}.png", self.prefix, sequence))
    }

    /// First candidate path that does not exist yet.
    pub fn next_free_path(&self) -> PathBuf {
        let mut sequence = 0u64;
        loop {
            let candidate = self.candidate_path(sequence);
            if !candidate.exists() {
                return candidate;
            }
            sequence += 1;
        }
    }

    /// Writes pixels read back from GL (rows bottom-up) as a top-down PNG.
    pub fn save(&self, width: u32, height: u32, pixels: Vec<u8>) -> Result<PathBuf, ScreenshotError> {
        if width == 0 || height == 0 {
            return Err(ScreenshotError::EmptyFrame { width, height });
        }
        let expected = pixel_buffer_len(width, height)?;
        let actual = pixels.len();
        let mut image = RgbaImage::from_raw(width, height, pixels)
            .filter(|_| actual == expected)
            .ok_or(ScreenshotError::BufferSize { expected, actual })?;
        flip_vertical_in_place(&mut image);

        fs::create_dir_all(&self.directory).map_err(|source| ScreenshotError::Directory {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.next_free_path();
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| ScreenshotError::Encode {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn writer(dir: &Path, prefix: &str) -> ScreenshotWriter {
        ScreenshotWriter::new(&ScreenshotConfig {
            directory: dir.to_path_buf(),
            prefix: prefix.to_string(),
        })
    }

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn candidate_uses_four_lowercase_hex_digits() {
        let writer = writer(Path::new("shots"), "plasma");
        assert_eq!(writer.candidate_path(0), Path::new("shots/plasma-0000.png"));
        assert_eq!(writer.candidate_path(0xab), Path::new("shots/plasma-00ab.png"));
        assert_eq!(writer.candidate_path(0x1_0000), Path::new("shots/plasma-10000.png"));
    }

    #[test]
    fn sequential_saves_count_up_from_zero() {
        let root = TempDir::new().unwrap();
        let writer = writer(root.path(), "glslview");

        let names: Vec<String> = (0..3)
            .map(|_| file_name(&writer.save(1, 1, vec![0, 0, 0, 255]).unwrap()))
            .collect();

        assert_eq!(
            names,
            vec!["glslview-0000.png", "glslview-0001.png", "glslview-0002.png"]
        );
    }

    #[test]
    fn existing_file_is_skipped() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("bar-0000.png"), b"taken").unwrap();
        let writer = writer(root.path(), "bar");

        let saved = writer.save(1, 1, vec![1, 2, 3, 255]).unwrap();

        assert_eq!(file_name(&saved), "bar-0001.png");
        assert_eq!(fs::read(root.path().join("bar-0000.png")).unwrap(), b"taken");
    }

    #[test]
    fn rows_are_flipped_to_top_down() {
        let root = TempDir::new().unwrap();
        let writer = writer(root.path(), "flip");
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        // GL row 0 is the bottom of the frame.
        let pixels = [red, blue].concat();

        let saved = writer.save(1, 2, pixels).unwrap();
        let decoded = image::open(&saved).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (1, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, blue);
        assert_eq!(decoded.get_pixel(0, 1).0, red);
    }

    #[test]
    fn missing_directory_is_created() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("captures/today");
        let writer = writer(&nested, "x");

        let saved = writer.save(1, 1, vec![0; 4]).unwrap();

        assert_eq!(saved, nested.join("x-0000.png"));
        assert!(saved.exists());
    }

    #[test]
    fn short_buffer_is_rejected() {
        let root = TempDir::new().unwrap();
        let writer = writer(root.path(), "short");
        let err = writer.save(2, 2, vec![0; 8]).unwrap_err();
        assert!(matches!(
            err,
            ScreenshotError::BufferSize {
                expected: 16,
                actual: 8
            }
        ));
        assert!(!writer.candidate_path(0).exists());
    }

    #[test]
    fn empty_frame_writes_nothing() {
        let root = TempDir::new().unwrap();
        let writer = writer(root.path(), "min");
        let err = writer.save(0, 480, Vec::new()).unwrap_err();
        assert!(matches!(err, ScreenshotError::EmptyFrame { width: 0, height: 480 }));
        assert!(!writer.candidate_path(0).exists());
    }

    #[test]
    fn directory_that_is_a_file_is_rejected() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("shots");
        fs::write(&blocker, b"plain file").unwrap();
        let writer = writer(&blocker, "blocked");

        let err = writer.save(1, 1, vec![0; 4]).unwrap_err();

        assert!(matches!(err, ScreenshotError::Directory { ref path, .. } if *path == blocker));
        assert_eq!(fs::read(&blocker).unwrap(), b"plain file");
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn readback_buffer_is_width_height_rgba() {
        assert_eq!(allocate_pixels(3, 2).unwrap().len(), 24);
        assert!(allocate_pixels(0, 10).unwrap().is_empty());
    }
}
