//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Crop** | `DynamicImage::crop_imm` at a centered origin |
//! | **Resize** | `DynamicImage::resize_exact` with Lanczos3 |
//! | **Encode** | `DynamicImage::write_to` (PNG by default) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for ratio and crop-window math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    AspectRatio, CropWindow, GeometryError, centered_origin, compute_crop_window, compute_ratio,
};
pub use operations::{RenderError, Rendered, get_dimensions, plan_crop, render_for_display};
pub use params::{CropParams, ResampleFilter, ResizeParams};
pub use rust_backend::RustBackend;
