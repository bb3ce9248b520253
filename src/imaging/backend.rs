//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the primitives the pipeline needs:
//! identify, decode, crop, resize, and encode. Buffers stay opaque to the
//! caller through the associated [`ImageBackend::Image`] type, so geometry and
//! orchestration can be exercised against a mock that never touches pixels.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{CropParams, ResizeParams};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("crop {width}x{height} at ({x}, {y}) exceeds {image_width}x{image_height} image")]
    CropOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel extent of a source image or target display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Reject a crop that does not lie entirely inside the image.
///
/// Shared by every backend so they agree on what counts as out of bounds.
pub fn check_crop_bounds(image: Dimensions, params: &CropParams) -> Result<(), BackendError> {
    let fits_x = params
        .x
        .checked_add(params.width)
        .is_some_and(|right| right <= image.width);
    let fits_y = params
        .y
        .checked_add(params.height)
        .is_some_and(|bottom| bottom <= image.height);
    if params.width == 0 || params.height == 0 || !fits_x || !fits_y {
        return Err(BackendError::CropOutOfBounds {
            x: params.x,
            y: params.y,
            width: params.width,
            height: params.height,
            image_width: image.width,
            image_height: image.height,
        });
    }
    Ok(())
}

/// Trait for image processing backends.
///
/// Every backend must implement all primitives so the rest of the codebase
/// is backend-agnostic. `Sync` because pairs are rendered on a rayon pool
/// sharing one backend.
pub trait ImageBackend: Sync {
    /// Decoded pixel buffer. Shared read-only across worker threads.
    type Image: Send + Sync;

    /// Read dimensions from encoded bytes without a full decode.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode encoded bytes into a pixel buffer.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, BackendError>;

    /// Actual extent of a decoded buffer.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Extract the region described by `params`.
    fn crop(&self, image: &Self::Image, params: &CropParams) -> Result<Self::Image, BackendError>;

    /// Resample to exactly `params.width` x `params.height`.
    fn resize(&self, image: &Self::Image, params: &ResizeParams)
    -> Result<Self::Image, BackendError>;

    /// Encode a buffer into the given container format.
    fn encode(&self, image: &Self::Image, format: ImageFormat) -> Result<Vec<u8>, BackendError>;
}
