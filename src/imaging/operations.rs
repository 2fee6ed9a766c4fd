//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{VariantSize, plan_variants, quality_for_width};
use super::params::{OutputFormat, ResizeParams};
use crate::config::QualityConfig;
use rayon::prelude::*;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Configuration for variant rendering.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    /// Target widths; the original width is always added.
    pub widths: Vec<u32>,
    pub quality: QualityConfig,
}

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVariant {
    /// Bare file name inside the output directory.
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// Output file name for one width: `<id>-<width>w.<ext>`.
pub fn variant_file_name(id: &str, width: u32, extension: &str) -> String {
    format!("{}-{}w.{}", id, width, extension.to_ascii_lowercase())
}

/// Build the resize parameters for every variant of one source without
/// executing them.
pub fn plan_renders(
    source: &Path,
    output_dir: &Path,
    id: &str,
    extension: &str,
    original: Dimensions,
    config: &VariantConfig,
) -> Result<Vec<(RenderedVariant, ResizeParams)>> {
    let format = OutputFormat::from_extension(extension)
        .ok_or_else(|| BackendError::UnsupportedFormat(extension.to_string()))?;

    Ok(plan_variants(original, &config.widths)
        .into_iter()
        .map(|VariantSize { width, height }| {
            let file_name = variant_file_name(id, width, extension);
            let params = ResizeParams {
                source: source.to_path_buf(),
                output: output_dir.join(&file_name),
                width,
                height,
                format,
                quality: quality_for_width(width, &config.quality),
            };
            (
                RenderedVariant {
                    file_name,
                    width,
                    height,
                },
                params,
            )
        })
        .collect())
}

/// Render every variant of one source, ascending by width.
///
/// Renders run concurrently on the rayon pool and are all joined before
/// returning. If any render fails, every file attempted for this source is
/// removed and the first error is returned, so a failed source leaves no
/// partial output behind.
pub fn render_variants(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    id: &str,
    extension: &str,
    original: Dimensions,
    config: &VariantConfig,
) -> Result<Vec<RenderedVariant>> {
    let planned = plan_renders(source, output_dir, id, extension, original, config)?;

    let results: Vec<Result<()>> = planned
        .par_iter()
        .map(|(_, params)| backend.resize(params))
        .collect();

    if let Some(pos) = results.iter().position(|r| r.is_err()) {
        for (_, params) in &planned {
            remove_attempted(&params.output);
        }
        // position() guarantees an Err at pos
        return match results.into_iter().nth(pos) {
            Some(Err(e)) => Err(e),
            _ => Err(BackendError::ProcessingFailed(format!(
                "render of {} failed",
                source.display()
            ))),
        };
    }

    Ok(planned.into_iter().map(|(variant, _)| variant).collect())
}

fn remove_attempted(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not remove partial output");
        }
    }
}
