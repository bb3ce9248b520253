//! High-level image operations.
//!
//! These functions combine calculations with backend execution: derive the
//! crop geometry for a display, then drive crop → resize → encode through
//! the backend. Nothing here touches the filesystem.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{GeometryError, centered_origin, compute_crop_window, compute_ratio};
use super::params::{CropParams, ResampleFilter, ResizeParams};
use image::ImageFormat;
use thiserror::Error;

/// Failure of one stage of the crop → resize → encode chain.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("crop failed: {0}")]
    Crop(#[source] BackendError),
    #[error("resize failed: {0}")]
    Resize(#[source] BackendError),
    #[error("encode failed: {0}")]
    Encode(#[source] BackendError),
}

/// Get image dimensions from encoded bytes using the backend.
pub fn get_dimensions(
    backend: &impl ImageBackend,
    bytes: &[u8],
) -> Result<Dimensions, BackendError> {
    backend.identify(bytes)
}

/// Plan the centered crop of `source` for a `display`, without executing it.
///
/// Useful for dry runs and for testing parameter generation.
pub fn plan_crop(source: Dimensions, display: Dimensions) -> Result<CropParams, GeometryError> {
    let ratio = compute_ratio(display)?;
    let window = compute_crop_window(source, ratio)?;
    let (x, y) = centered_origin(source, window);
    Ok(CropParams {
        x,
        y,
        width: window.width,
        height: window.height,
    })
}

/// Encoded output for one display, plus the crop that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub crop: CropParams,
    pub bytes: Vec<u8>,
}

/// Crop `image` for `display`, resample to exactly its size, and encode.
pub fn render_for_display<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    display: Dimensions,
    filter: ResampleFilter,
    format: ImageFormat,
) -> Result<Rendered, RenderError> {
    let crop = plan_crop(backend.dimensions(image), display)?;

    let cropped = backend.crop(image, &crop).map_err(RenderError::Crop)?;
    let resized = backend
        .resize(
            &cropped,
            &ResizeParams {
                width: display.width,
                height: display.height,
                filter,
            },
        )
        .map_err(RenderError::Resize)?;
    let bytes = backend
        .encode(&resized, format)
        .map_err(RenderError::Encode)?;

    Ok(Rendered { crop, bytes })
}
