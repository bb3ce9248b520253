//! Shared types used across configuration, processing and output.

use crate::imaging::Dimensions;
use serde::{Deserialize, Serialize};

/// A named display profile the batch produces one wallpaper per image for.
///
/// The name becomes the output folder verbatim, so it may carry spaces and
/// commas (`"iPhone 8, 7, 6, 6s"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Target {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn display(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// A source decoded once at load and shared read-only by every target.
#[derive(Debug)]
pub struct SourceImage<I> {
    /// Base name without extension; reused as the output file stem.
    pub name: String,
    pub dimensions: Dimensions,
    pub image: I,
}
