//! Processing cache for incremental runs.
//!
//! Re-encoding every variant of every photo on each run is the expensive
//! part of the pipeline. The cache remembers, per photo id, what the source
//! looked like the last time it was rendered and which derived files that
//! produced, so unchanged sources are re-emitted from the cache instead.
//!
//! # Design
//!
//! ## Change detection
//!
//! A source is identified by its [`photo_id`](crate::naming::photo_id) and
//! compared through a [`SourceFingerprint`]: modification time plus byte size.
//! This is a cheap stat-only proxy, not a content hash, and both fields must
//! match exactly for the source to count as unmodified. Touching a file is
//! enough to force a re-render.
//!
//! ## Entry contents
//!
//! Each [`CacheEntry`] holds the fingerprint, the exact set of derived file
//! names the last render wrote (the deletion list if the source changes), and
//! the [`PhotoRecord`] that went into the manifest.
//!
//! ## Lifecycle
//!
//! The previous run's cache is loaded once, read-only. A fresh [`Cache`] is
//! built while walking the source tree: unchanged entries are carried over,
//! re-rendered ones are replaced, and ids that were not visited are simply
//! never copied. The fresh cache replaces the file at the end of the run.
//!
//! ## Storage
//!
//! A single JSON object mapping photo id to entry. Keys are kept in a
//! `BTreeMap` so an unchanged tree serializes to identical bytes. A missing
//! file is a first run; an unreadable or unparsable file is logged and treated
//! the same way, which makes every source look new.

use crate::manifest::write_json_atomic;
use crate::types::PhotoRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Stat-level identity of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    /// Whole seconds of the modification time since the Unix epoch.
    pub mtime_secs: u64,
    /// Sub-second part of the modification time.
    pub mtime_nanos: u32,
    /// File size in bytes.
    pub size: u64,
}

impl SourceFingerprint {
    /// Fingerprint from file metadata.
    ///
    /// Modification times before the epoch collapse to zero; platforms
    /// without mtime support fail with the underlying I/O error.
    pub fn from_metadata(metadata: &fs::Metadata) -> io::Result<Self> {
        let since_epoch = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Ok(Self {
            mtime_secs: since_epoch.as_secs(),
            mtime_nanos: since_epoch.subsec_nanos(),
            size: metadata.len(),
        })
    }

    /// Stat `path` and fingerprint it.
    pub fn of(path: &Path) -> io::Result<Self> {
        Self::from_metadata(&fs::metadata(path)?)
    }
}

/// Everything remembered about one processed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: SourceFingerprint,
    /// Derived files written by the last render of this source.
    pub derived_files: BTreeSet<String>,
    /// Manifest record emitted for this source.
    pub photo: PhotoRecord,
}

impl CacheEntry {
    /// Whether the cached render still matches the source on disk.
    pub fn is_fresh(&self, current: &SourceFingerprint) -> bool {
        self.fingerprint == *current
    }
}

/// Photo id → cache entry, persisted as a bare JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cache {
    entries: BTreeMap<String, CacheEntry>,
}

impl Cache {
    /// An empty cache (first run, or `--no-cache`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the cache file.
    ///
    /// Never fails: a missing file yields an empty cache silently, an
    /// unreadable or corrupt one yields an empty cache with a warning.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::empty(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read cache, starting fresh");
                return Self::empty();
            }
        };
        match serde_json::from_str(&content) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not parse cache, starting fresh");
                Self::empty()
            }
        }
    }

    /// Atomically replace the cache file with this cache.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        write_json_atomic(path, self)
    }

    pub fn get(&self, id: &str) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Record the entry for `id`, returning the one it replaced.
    pub fn insert(&mut self, id: String, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(id, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }
}

/// Outcome counts for one pipeline run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Sources rendered this run (new or modified).
    pub processed: u32,
    /// Sources re-emitted from the cache.
    pub skipped: u32,
    /// Sources that failed and were left out of the manifest.
    pub failed: u32,
    /// Stale derived files removed from the output directory.
    pub deleted: u32,
    /// Records in the written manifest.
    pub total: u32,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} processed, {} skipped", self.processed, self.skipped)?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, ", {} deleted ({} photos)", self.deleted, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn photo(src: &str) -> PhotoRecord {
        PhotoRecord {
            src: src.to_string(),
            width: 100,
            height: 80,
            category: "Cat".to_string(),
            event: "Ev".to_string(),
            src_set: Vec::new(),
        }
    }

    fn entry(size: u64, files: &[&str]) -> CacheEntry {
        CacheEntry {
            fingerprint: SourceFingerprint {
                mtime_secs: 1_700_000_000,
                mtime_nanos: 123,
                size,
            },
            derived_files: files.iter().map(|f| f.to_string()).collect(),
            photo: photo("/r/x-100w.jpg"),
        }
    }

    // =========================================================================
    // Fingerprints
    // =========================================================================

    #[test]
    fn fingerprint_reads_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        fs::write(&path, b"12345").unwrap();
        let fp = SourceFingerprint::of(&path).unwrap();
        assert_eq!(fp.size, 5);
        assert!(fp.mtime_secs > 0);
    }

    #[test]
    fn fingerprint_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(SourceFingerprint::of(&tmp.path().join("nope.jpg")).is_err());
    }

    #[test]
    fn fresh_requires_both_fields() {
        let e = entry(10, &[]);
        let mut current = e.fingerprint;
        assert!(e.is_fresh(&current));

        current.size = 11;
        assert!(!e.is_fresh(&current));

        current = e.fingerprint;
        current.mtime_nanos += 1;
        assert!(!e.is_fresh(&current));
    }

    // =========================================================================
    // Load / save
    // =========================================================================

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::load(&tmp.path().join("processing_cache.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processing_cache.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Cache::load(&path).is_empty());
    }

    #[test]
    fn load_wrong_shape_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processing_cache.json");
        fs::write(&path, r#"{"a": {"mtimeMs": 1, "size": 2}}"#).unwrap();
        assert!(Cache::load(&path).is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processing_cache.json");
        let mut cache = Cache::empty();
        cache.insert("b".into(), entry(2, &["b-48w.jpg", "b-100w.jpg"]));
        cache.insert("a".into(), entry(1, &["a-100w.jpg"]));
        cache.save(&path).unwrap();

        let loaded = Cache::load(&path);
        assert_eq!(loaded, cache);
        assert_eq!(loaded.len(), 2);
        assert!(loaded.get("b").unwrap().derived_files.contains("b-48w.jpg"));
    }

    #[test]
    fn saved_file_is_bare_object_keyed_by_id() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processing_cache.json");
        let mut cache = Cache::empty();
        cache.insert("cat_ev_x".into(), entry(1, &["cat_ev_x-100w.jpg"]));
        cache.save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["cat_ev_x"]["fingerprint"]["size"].is_number());
        assert_eq!(value["cat_ev_x"]["derived_files"][0], "cat_ev_x-100w.jpg");
        assert_eq!(value["cat_ev_x"]["photo"]["srcSet"], serde_json::json!([]));
    }

    #[test]
    fn save_is_byte_stable_regardless_of_insert_order() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("one.json");
        let second = tmp.path().join("two.json");

        let mut a = Cache::empty();
        a.insert("x".into(), entry(1, &["x-2.jpg", "x-1.jpg"]));
        a.insert("y".into(), entry(2, &["y-1.jpg"]));
        a.save(&first).unwrap();

        let mut b = Cache::empty();
        b.insert("y".into(), entry(2, &["y-1.jpg"]));
        b.insert("x".into(), entry(1, &["x-1.jpg", "x-2.jpg"]));
        b.save(&second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut cache = Cache::empty();
        assert!(cache.insert("a".into(), entry(1, &[])).is_none());
        let old = cache.insert("a".into(), entry(2, &[])).unwrap();
        assert_eq!(old.fingerprint.size, 1);
        assert_eq!(cache.get("a").unwrap().fingerprint.size, 2);
        assert_eq!(cache.len(), 1);
    }

    // =========================================================================
    // RunSummary
    // =========================================================================

    #[test]
    fn summary_display_without_failures() {
        let s = RunSummary {
            processed: 2,
            skipped: 5,
            failed: 0,
            deleted: 3,
            total: 7,
        };
        assert_eq!(s.to_string(), "2 processed, 5 skipped, 3 deleted (7 photos)");
    }

    #[test]
    fn summary_display_with_failures() {
        let s = RunSummary {
            processed: 1,
            skipped: 0,
            failed: 1,
            deleted: 0,
            total: 1,
        };
        assert_eq!(s.to_string(), "1 processed, 0 skipped, 1 failed, 0 deleted (1 photos)");
    }
}
