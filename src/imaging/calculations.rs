//! Pure calculation functions for variant planning.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use super::params::Quality;
use crate::config::QualityConfig;

/// Widths above this use the high quality tier.
const HIGH_QUALITY_ABOVE: u32 = 256;
/// Widths above this (and up to [`HIGH_QUALITY_ABOVE`]) use the medium tier.
const MEDIUM_QUALITY_ABOVE: u32 = 96;

/// One derived render: exact output dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSize {
    pub width: u32,
    pub height: u32,
}

/// Widths to render for a source of `original_width` pixels.
///
/// The configured targets plus the original width, deduplicated, sorted
/// ascending, with everything wider than the original dropped. The original
/// width is always present, so a source narrower than every target renders
/// exactly once.
///
/// ```
/// # use photo_data::imaging::candidate_widths;
/// assert_eq!(candidate_widths(&[640, 64, 256], 300), vec![64, 256, 300]);
/// assert_eq!(candidate_widths(&[640, 64], 40), vec![40]);
/// ```
pub fn candidate_widths(targets: &[u32], original_width: u32) -> Vec<u32> {
    let mut widths: Vec<u32> = targets
        .iter()
        .copied()
        .filter(|&w| w > 0 && w <= original_width)
        .chain(std::iter::once(original_width))
        .collect();
    widths.sort_unstable();
    widths.dedup();
    widths
}

/// Height preserving the aspect ratio at `width`, never below one pixel.
///
/// `round(original.height × width / original.width)`.
pub fn scaled_height(original: Dimensions, width: u32) -> u32 {
    if width == original.width {
        return original.height;
    }
    let h = (original.height as f64 * width as f64 / original.width as f64).round() as u32;
    h.max(1)
}

/// Plan every variant of a source, ascending by width.
pub fn plan_variants(original: Dimensions, targets: &[u32]) -> Vec<VariantSize> {
    candidate_widths(targets, original.width)
        .into_iter()
        .map(|width| VariantSize {
            width,
            height: scaled_height(original, width),
        })
        .collect()
}

/// Lossy quality for an output width: smaller renders tolerate more loss.
pub fn quality_for_width(width: u32, tiers: &QualityConfig) -> Quality {
    let value = if width > HIGH_QUALITY_ABOVE {
        tiers.high
    } else if width > MEDIUM_QUALITY_ABOVE {
        tiers.medium
    } else {
        tiers.low
    };
    Quality::new(value)
}
