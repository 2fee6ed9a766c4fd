//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! identify (header-only dimension read) and resize (decode, scale, encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure-Rust
//! `image` crate.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` because the renders for one source run on the rayon pool against a
/// shared backend reference.
pub trait ImageBackend: Sync {
    /// Read the true pixel dimensions without decoding the image.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Render one resized copy of `params.source` to `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
