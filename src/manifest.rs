//! Manifest writer.
//!
//! The manifest and the cache are the two files a run leaves behind besides
//! the derived images. Both are overwritten every run, and a crash half-way
//! through a write must not leave a truncated file that the UI (or the next
//! run) would choke on. [`write_json_atomic`] writes to a sibling `.tmp` file,
//! syncs it, and renames it over the destination.

use crate::types::PhotoRecord;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Write the ordered photo list as pretty-printed JSON.
pub fn write_manifest(path: &Path, photos: &[PhotoRecord]) -> io::Result<()> {
    write_json_atomic(path, photos)
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// Parent directories are created as needed.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// `photoData.json` → `photoData.json.tmp`, in the same directory so the
/// final rename never crosses a filesystem boundary.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("manifest"));
    name.push(".tmp");
    path.with_file_name(name)
}
