//! Image processing — pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | `resize_exact` + Lanczos3 |
//! | **Encode** | JPEG (tiered quality), PNG (best compression), WebP (lossless) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for width planning and quality tiers (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{candidate_widths, quality_for_width, scaled_height};
pub use operations::{RenderedVariant, VariantConfig, get_dimensions, render_variants, variant_file_name};
pub use params::{OutputFormat, Quality, ResizeParams};
pub use rust_backend::{RustBackend, supported_output_extensions};
