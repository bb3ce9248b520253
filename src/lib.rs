//! # Spicy
//!
//! Batch wallpaper generator. One set of source images goes in; one folder
//! per device profile comes out, each holding every source center-cropped by
//! that device's normalized ratio and resampled to its exact resolution.
//!
//! # Architecture: Geometry, Pixels, Batch
//!
//! ```text
//! 1. Geometry   target size + source size  →  centered crop window   (pure math)
//! 2. Pixels     decoded image + crop       →  encoded bytes          (ImageBackend)
//! 3. Batch      RunConfig                  →  resized/<target>/<image>.<ext>
//! ```
//!
//! The geometry layer never sees pixels and the pixel layer never sees the
//! filesystem, so both are unit tested without writing a file. Only the
//! batch layer touches disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Ratio and crop-window math, the [`imaging::ImageBackend`] trait and its `image`-crate implementation |
//! | [`process`] | The [`process::Pipeline`]: wipe output, decode sources once, render every (target, image) pair in parallel |
//! | [`config`] | `spicy.toml` loading over stock defaults, validation, the built-in device list |
//! | [`types`] | [`types::Target`] and [`types::SourceImage`] |
//! | [`naming`] | Output path layout and path-segment checks for target and image names |
//! | [`output`] | CLI output formatting for `plan` and `build` |
//!
//! # Design Decisions
//!
//! ## Crop Then Resize
//!
//! Each wallpaper is a centered crop followed by an exact resize. The crop
//! scales each source axis by the target's normalized ratio: the axis that
//! matches the target's longer side is kept whole, the other is cut to
//! `short / long` of its length with equal margins on both sides. The window
//! therefore has the target's aspect ratio only for a square source; any
//! other source is stretched by the final resize. Nothing is letterboxed.
//! Crop sizes are truncated, never rounded, so the window always fits.
//!
//! ## Skip, Log, Continue
//!
//! A missing source or a failed pair never stops the batch. Each failure is
//! logged once through `tracing`, reported on stdout, and recorded in the
//! [`process::BatchReport`]. Only configuration errors and an output tree
//! that cannot be prepared are fatal.
//!
//! ## Fresh Output Every Run
//!
//! The output root is deleted and recreated before anything is written, so
//! the tree always reflects exactly the current configuration. Running twice
//! produces byte-identical files.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all go through the `image`
//! crate. No ImageMagick, no system libraries; the binary is self-contained.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
