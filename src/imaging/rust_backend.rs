//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` with best compression, adaptive filter |
//! | Encode → WebP | `WebPEncoder::new_lossless` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Extensions the compiled-in codecs can both decode and re-encode.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Returns the image file extensions this backend can process.
pub fn supported_output_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from content so a mislabelled extension still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode `img` to `path` in `format`.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: u32,
) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let mut writer = BufWriter::new(file);

    let encoded = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100) as u8);
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut writer, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
        }
        OutputFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut writer);
            // The lossless encoder takes 8-bit RGB(A) only
            let img = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            img.write_with_encoder(encoder)
        }
    };

    encoded.map_err(|e| {
        BackendError::ProcessingFailed(format!("Encode to {} failed: {}", path.display(), e))
    })?;
    writer.flush().map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = if img.width() == params.width && img.height() == params.height {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_image(&resized, &params.output, params.format, params.quality.value())
    }
}
