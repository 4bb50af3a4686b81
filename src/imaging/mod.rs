//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Decode** | `image::load_from_memory` / `ImageReader` |
//! | **EXIF orientation** | custom parser (JPEG APP1 + TIFF IFD0) |
//! | **Scale + rotate → JPEG** | bilinear resize, quarter-turn rotation, `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for scale and dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub(crate) mod exif_parser;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use operations::{ResizeBounds, get_dimensions, plan_resize, resize_image};
pub use params::{Quality, Rotation, TransformParams};
pub use rust_backend::{RustBackend, encode_jpeg};
