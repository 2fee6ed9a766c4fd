//! Parameter types for image operations.
//!
//! These structs describe *what* to render, not *how*. They are the interface
//! between [`operations`](super::operations), which decides which variants a
//! source needs, and the [`backend`](super::backend), which does the pixel
//! work. Keeping them plain data lets the decision logic run against a mock.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`] — Container format of a derived file, chosen from the source extension.
//! - [`ResizeParams`] — One render: source, output path, exact target dimensions, format, quality.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Container format of a derived file.
///
/// Derived files keep the source's format. Only JPEG takes a quality; PNG is
/// written with maximum compression and WebP losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// Format for a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Whether the encoder honours a [`Quality`].
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

/// Parameters for one resize-and-encode operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}
