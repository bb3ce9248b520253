//! Shared test utilities for the spicy test suite.
//!
//! Provides synthetic source images and a ready-made configuration rooted
//! in a temp directory, so pipeline tests run against real files without
//! checking binary fixtures into the repo.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let config = temp_config(tmp.path(), &[("Spicy_Dark", 1000, 2000)]);
//! // tmp/in/Spicy_Dark.png exists; config.output_dir is tmp/out
//! ```

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

use crate::config::RunConfig;
use crate::naming::source_path;
use crate::types::Target;

// =========================================================================
// Synthetic images
// =========================================================================

/// A deterministic RGB gradient of the given size.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

/// The gradient encoded as PNG bytes.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Write a gradient PNG to `path`, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, png_bytes(width, height)).unwrap();
}

// =========================================================================
// Configuration
// =========================================================================

/// Config reading from `root/in` and writing to `root/out`, with one PNG
/// written per `(name, width, height)` and two small targets.
pub fn temp_config(root: &Path, sources: &[(&str, u32, u32)]) -> RunConfig {
    let config = RunConfig {
        input_dir: root.join("in"),
        output_dir: root.join("out"),
        images: sources.iter().map(|(name, _, _)| name.to_string()).collect(),
        targets: vec![
            Target::new("Small Landscape", 64, 36),
            Target::new("Small Portrait", 36, 64),
        ],
        ..RunConfig::default()
    };
    for (name, width, height) in sources {
        write_png(
            &source_path(&config.input_dir, name, &config.extension),
            *width,
            *height,
        );
    }
    config
}
