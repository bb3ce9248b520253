//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which derives crop geometry for a target) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`ResampleFilter`]: Resampling kernel for the final resize (Lanczos3 by default).
//! - [`CropParams`]: Centered crop: origin and window size in source pixels.
//! - [`ResizeParams`]: Exact output dimensions plus filter.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Resampling kernel used when scaling the cropped region.
///
/// Nearest-neighbour is intentionally absent: wallpapers change scale by
/// large factors and it aliases visibly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    #[default]
    Lanczos3,
    CatmullRom,
    Gaussian,
    Triangle,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Lanczos3 => FilterType::Lanczos3,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Triangle => FilterType::Triangle,
        }
    }
}

/// Parameters for a crop operation. Coordinates are in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropParams {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Parameters for an exact-size resize. Aspect ratio is not preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub filter: ResampleFilter,
}
