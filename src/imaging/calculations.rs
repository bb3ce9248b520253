//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Arithmetic is done in `f32` and crop sizes are truncated, never rounded,
//! so a window can never grow past the source extent.

use super::backend::Dimensions;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("degenerate {what} dimensions {width}x{height}")]
    Degenerate {
        what: &'static str,
        width: u32,
        height: u32,
    },
    #[error("crop window for {width}x{height} source truncates to zero")]
    EmptyWindow { width: u32, height: u32 },
}

/// Aspect ratio normalized so the larger side is exactly `1.0`.
///
/// Only [`compute_ratio`] builds one, so `max(width, height) == 1.0` always
/// holds and neither component exceeds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    width: f32,
    height: f32,
}

impl AspectRatio {
    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }
}

/// Size of the centered region extracted from a source before resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub width: u32,
    pub height: u32,
}

/// Derive the normalized aspect ratio of a display.
///
/// # Examples
/// ```
/// # use spicy::imaging::{Dimensions, compute_ratio};
/// let ratio = compute_ratio(Dimensions { width: 1280, height: 720 }).unwrap();
/// assert_eq!(ratio.width(), 1.0);
/// assert_eq!(ratio.height(), 0.5625);
/// ```
pub fn compute_ratio(display: Dimensions) -> Result<AspectRatio, GeometryError> {
    let Dimensions { width, height } = display;
    if width == 0 || height == 0 {
        return Err(GeometryError::Degenerate {
            what: "target",
            width,
            height,
        });
    }

    let ratio = if width > height {
        AspectRatio {
            width: 1.0,
            height: height as f32 / width as f32,
        }
    } else if height > width {
        AspectRatio {
            width: width as f32 / height as f32,
            height: 1.0,
        }
    } else {
        AspectRatio {
            width: 1.0,
            height: 1.0,
        }
    };
    Ok(ratio)
}

/// Scale the source extent by the ratio, truncating each axis.
///
/// One ratio component is always `1.0`, so one axis keeps the full source
/// extent and the other is reduced proportionally.
pub fn compute_crop_window(
    image: Dimensions,
    ratio: AspectRatio,
) -> Result<CropWindow, GeometryError> {
    if image.width == 0 || image.height == 0 {
        return Err(GeometryError::Degenerate {
            what: "source",
            width: image.width,
            height: image.height,
        });
    }

    let window = CropWindow {
        width: (image.width as f32 * ratio.width).floor() as u32,
        height: (image.height as f32 * ratio.height).floor() as u32,
    };

    if window.width == 0 || window.height == 0 {
        return Err(GeometryError::EmptyWindow {
            width: image.width,
            height: image.height,
        });
    }
    Ok(window)
}

/// Top-left corner that centers `window` inside `image`.
///
/// Both halves are integer-divided separately, so for odd margins the extra
/// pixel is dropped on the leading edge.
pub fn centered_origin(image: Dimensions, window: CropWindow) -> (u32, u32) {
    (
        (image.width / 2).saturating_sub(window.width / 2),
        (image.height / 2).saturating_sub(window.height / 2),
    )
}
