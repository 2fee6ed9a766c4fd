//! Shared test utilities for the photo-data test suite.
//!
//! Builds real, decodable source images so tests that go through
//! [`RustBackend`](crate::imaging::RustBackend) exercise the actual codecs.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let root = tmp.path().join("images");
//! add_jpeg(&root, "Weddings/Smith & Jones/IMG001.jpg", 300, 200);
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Image files
// =========================================================================

/// Write a small valid JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid RGBA PNG with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, 64, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Source trees
// =========================================================================

/// Create `root/<rel>` as a JPEG, making parent directories.
pub fn add_jpeg(root: &Path, rel: &str, width: u32, height: u32) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    create_test_jpeg(&path, width, height);
    path
}

/// Create `root/<rel>` as a PNG, making parent directories.
pub fn add_png(root: &Path, rel: &str, width: u32, height: u32) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    create_test_png(&path, width, height);
    path
}

#[test]
fn helpers_produce_decodable_images() {
    let tmp = tempfile::TempDir::new().unwrap();
    let jpg = add_jpeg(tmp.path(), "C/E/a.jpg", 30, 20);
    let png = add_png(tmp.path(), "C/E/b.png", 12, 8);
    assert_eq!(image::image_dimensions(jpg).unwrap(), (30, 20));
    assert_eq!(image::image_dimensions(png).unwrap(), (12, 8));
}
