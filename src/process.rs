//! Pipeline driver: incremental derivation of every source photo.
//!
//! One run walks the source tree, decides per photo whether the cached
//! render is still valid, re-renders the ones that are not, prunes the output
//! directory, and writes the manifest and cache.
//!
//! ## Per-photo decision
//!
//! ```text
//! fingerprint matches cache ─┬─ all derived files present ──▶ skip (reuse record)
//!                            └─ something missing ──────────▶ re-render
//! fingerprint differs ───────── delete old derived files ───▶ re-render
//! no cache entry ───────────────────────────────────────────▶ render
//! ```
//!
//! Whatever the outcome, the photo's derived files join the "keep" set and
//! its record joins the manifest. A photo that fails at any step is reported
//! and left out of both, so its leftovers are pruned.
//!
//! ## Output Structure
//!
//! ```text
//! resized/
//! ├── weddings_smith_jones_img001-48w.jpg
//! ├── weddings_smith_jones_img001-64w.jpg
//! ├── ...
//! └── weddings_smith_jones_img001-2400w.jpg   # original width
//! ```
//!
//! ## Parallel Processing
//!
//! Sources are visited one at a time in traversal order; the renders for a
//! single source run in parallel on the [rayon](https://docs.rs/rayon) pool.

use crate::cache::{Cache, CacheEntry, RunSummary, SourceFingerprint};
use crate::config::PipelineConfig;
use crate::gc::prune_output_dir;
use crate::imaging::{
    BackendError, ImageBackend, RenderedVariant, RustBackend, VariantConfig, get_dimensions,
    render_variants,
};
use crate::manifest::write_manifest;
use crate::naming::{disambiguate, photo_id};
use crate::scan::{self, ScanError, SourceImage};
use crate::types::{PhotoRecord, SrcSetEntry};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Image has zero width or height: {0}")]
    EmptyImage(PathBuf),
    #[error("Failed to write {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}

impl ProcessError {
    fn output(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Output {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Progress events emitted during a run.
///
/// Sent over an optional channel so the caller can display progress while
/// the run continues. Formatting lives in [`crate::output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// The previous cache was read (zero entries on first run or `--no-cache`).
    CacheLoaded { entries: usize },
    /// Cached render reused.
    PhotoSkipped { id: String, source: String },
    /// Source rendered at these widths, ascending.
    PhotoProcessed {
        id: String,
        source: String,
        widths: Vec<u32>,
    },
    /// Source left out of this run's output.
    PhotoFailed { source: String, error: String },
    /// Stale derived file deleted from the output directory.
    Pruned { file_name: String },
}

/// How one photo was handled.
enum Outcome {
    Skipped(CacheEntry),
    Processed(CacheEntry),
}

/// State built up while visiting sources.
#[derive(Default)]
struct Accumulator {
    photos: Vec<PhotoRecord>,
    keep: HashSet<String>,
    cache: Cache,
    summary: RunSummary,
}

impl Accumulator {
    fn record(&mut self, id: String, entry: CacheEntry) {
        self.keep.extend(entry.derived_files.iter().cloned());
        self.photos.push(entry.photo.clone());
        self.cache.insert(id, entry);
    }
}

/// Run the pipeline with the pure-Rust image backend.
pub fn run(
    config: &PipelineConfig,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, ProcessError> {
    run_with_backend(&RustBackend::new(), config, use_cache, progress)
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    config: &PipelineConfig,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, ProcessError> {
    let paths = &config.paths;
    std::fs::create_dir_all(&paths.output_dir).map_err(ProcessError::output(&paths.output_dir))?;

    let previous = if use_cache {
        Cache::load(&paths.cache_file)
    } else {
        Cache::empty()
    };
    emit(&progress, ProcessEvent::CacheLoaded {
        entries: previous.len(),
    });

    let sources = scan::scan(&paths.source_dir, |ext| config.accepts_extension(ext))?;
    let variants = VariantConfig {
        widths: config.images.widths.clone(),
        quality: config.images.quality,
    };

    let mut acc = Accumulator::default();
    for (id, source) in assign_ids(&sources) {
        let relative = source.relative_path();
        match derive_photo(backend, config, &variants, &previous, &id, source) {
            Ok(Outcome::Skipped(entry)) => {
                acc.summary.skipped += 1;
                emit(&progress, ProcessEvent::PhotoSkipped {
                    id: id.clone(),
                    source: relative,
                });
                acc.record(id, entry);
            }
            Ok(Outcome::Processed(entry)) => {
                acc.summary.processed += 1;
                let mut widths: Vec<u32> = entry.photo.src_set.iter().map(|s| s.width).collect();
                widths.push(entry.photo.width);
                emit(&progress, ProcessEvent::PhotoProcessed {
                    id: id.clone(),
                    source: relative,
                    widths,
                });
                acc.record(id, entry);
            }
            Err(e) => {
                acc.summary.failed += 1;
                tracing::error!(source = %relative, error = %e, "failed to process photo");
                emit(&progress, ProcessEvent::PhotoFailed {
                    source: relative,
                    error: e.to_string(),
                });
            }
        }
    }

    acc.summary.deleted = prune_output_dir(&paths.output_dir, &acc.keep, progress.as_ref())
        .map_err(ProcessError::output(&paths.output_dir))?;
    acc.summary.total = acc.photos.len() as u32;

    write_manifest(&paths.manifest_file, &acc.photos)
        .map_err(ProcessError::output(&paths.manifest_file))?;
    acc.cache
        .save(&paths.cache_file)
        .map_err(ProcessError::output(&paths.cache_file))?;

    Ok(acc.summary)
}

fn emit(progress: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = progress {
        // Receiver gone means nobody is listening; the run carries on.
        tx.send(event).ok();
    }
}

/// Give every source a unique photo id, in traversal order.
///
/// The first source to produce an id keeps it; later sources that sanitize
/// to the same id get a hash suffix of their relative path.
pub fn assign_ids(sources: &[SourceImage]) -> Vec<(String, &SourceImage)> {
    let mut claimed: HashMap<String, &SourceImage> = HashMap::new();
    let mut assigned = Vec::with_capacity(sources.len());

    for source in sources {
        let base = photo_id(&source.category, &source.event, &source.stem);
        let mut id = base.clone();
        let mut digits = 8;
        while let Some(owner) = claimed.get(&id) {
            if digits == 8 {
                tracing::warn!(
                    id = %base,
                    first = %owner.relative_path(),
                    second = %source.relative_path(),
                    "photo id collision, disambiguating"
                );
            }
            id = disambiguate(&base, &source.relative_path(), digits);
            digits += 4;
        }
        claimed.insert(id.clone(), source);
        assigned.push((id, source));
    }
    assigned
}

/// Decide and perform the work for one source.
fn derive_photo(
    backend: &impl ImageBackend,
    config: &PipelineConfig,
    variants: &VariantConfig,
    previous: &Cache,
    id: &str,
    source: &SourceImage,
) -> Result<Outcome, ProcessError> {
    let output_dir = &config.paths.output_dir;
    let fingerprint = SourceFingerprint::of(&source.path)?;
    let cached = previous.get(id);

    if let Some(entry) = cached {
        if entry.is_fresh(&fingerprint) && all_present(output_dir, &entry.derived_files) {
            return Ok(Outcome::Skipped(entry.clone()));
        }
        for name in &entry.derived_files {
            remove_stale(&output_dir.join(name));
        }
    }

    let original = get_dimensions(backend, &source.path)?;
    if original.width == 0 || original.height == 0 {
        return Err(ProcessError::EmptyImage(source.path.clone()));
    }

    let rendered = render_variants(
        backend,
        &source.path,
        output_dir,
        id,
        &source.extension,
        original,
        variants,
    )?;

    let photo = build_record(config, source, &rendered);
    Ok(Outcome::Processed(CacheEntry {
        fingerprint,
        derived_files: rendered.into_iter().map(|v| v.file_name).collect(),
        photo,
    }))
}

fn all_present<'a>(dir: &Path, names: impl IntoIterator<Item = &'a String>) -> bool {
    names.into_iter().all(|name| dir.join(name).is_file())
}

fn remove_stale(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not delete stale file"),
    }
}

/// Manifest record from renders sorted ascending by width; the widest is
/// the original.
fn build_record(config: &PipelineConfig, source: &SourceImage, rendered: &[RenderedVariant]) -> PhotoRecord {
    let (full, smaller) = match rendered.split_last() {
        Some((full, smaller)) => (Some(full), smaller),
        None => (None, rendered),
    };
    let public = |v: &RenderedVariant| config.paths.public_url(&v.file_name);

    PhotoRecord {
        src: full.map(public).unwrap_or_default(),
        width: full.map(|v| v.width).unwrap_or_default(),
        height: full.map(|v| v.height).unwrap_or_default(),
        category: source.category.clone(),
        event: source.event.clone(),
        src_set: smaller
            .iter()
            .map(|v| SrcSetEntry {
                src: public(v),
                width: v.width,
                height: v.height,
            })
            .collect(),
    }
}
