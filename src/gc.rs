//! Output directory reconciliation.
//!
//! After every source has been visited, the output directory should contain
//! exactly the derived files named in this run's cache entries. Anything else
//! belongs to a source that was deleted or renamed, to an old width list, or
//! to a derivation that failed part way, and is removed.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::mpsc::Sender;

use crate::process::ProcessEvent;

/// Delete every regular file in `output_dir` whose name is not in `keep`.
///
/// Returns the number of files actually removed. Failing to list the
/// directory is an error; failing to remove one file is logged and that file
/// is not counted. Sub-directories are never touched.
pub fn prune_output_dir(
    output_dir: &Path,
    keep: &HashSet<String>,
    progress: Option<&Sender<ProcessEvent>>,
) -> io::Result<u32> {
    let mut stale: Vec<(String, std::path::PathBuf)> = Vec::new();
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            tracing::debug!(path = %path.display(), "leaving sub-directory in output dir");
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !keep.contains(&name) {
            stale.push((name, path));
        }
    }
    stale.sort();

    let mut deleted = 0;
    for (name, path) in stale {
        match fs::remove_file(&path) {
            Ok(()) => {
                deleted += 1;
                if let Some(tx) = progress {
                    tx.send(ProcessEvent::Pruned { file_name: name }).ok();
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not delete stale file");
            }
        }
    }
    Ok(deleted)
}
