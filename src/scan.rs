//! Source tree discovery.
//!
//! Walks the image root and yields every photo to process, tagged with the
//! category and event it belongs to.
//!
//! ## Directory Structure
//!
//! ```text
//! images/                          # Source root
//! ├── Weddings/                    # Category
//! │   ├── Smith & Jones/           # Event
//! │   │   ├── IMG001.jpg           # Photo
//! │   │   ├── IMG002.JPG
//! │   │   └── .DS_Store            # Hidden: skipped
//! │   └── notes.txt                # File at category level: ignored
//! └── Portraits/
//!     └── Studio/
//!         └── headshot.png
//! ```
//!
//! Only regular files exactly two directories below the root whose extension
//! is on the allow-list become photos. Anything else at any level is ignored.
//!
//! ## Ordering
//!
//! Entries are sorted by file name at every level, so the output order is
//! (category, event, file name) in byte order regardless of what order the
//! platform lists directories in. The manifest inherits this order.
//!
//! ## Errors
//!
//! A missing or non-directory root is fatal. Anything unreadable below it
//! (permission denied on one event, a dangling symlink) is logged and
//! skipped so one bad directory cannot stop the run.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    MissingRoot(PathBuf),
}

/// Position of a directory in the tree, by the kind of entries it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// The source root; its sub-directories are categories.
    Root,
    /// A category directory; its sub-directories are events.
    InCategory,
    /// An event directory; its files are photos.
    InEvent,
}

impl Level {
    /// Level of the directory containing an entry found at walk `depth`
    /// (root children are depth 1).
    fn of_parent(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(Self::Root),
            2 => Some(Self::InCategory),
            3 => Some(Self::InEvent),
            _ => None,
        }
    }
}

/// One photo found in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Category directory name, verbatim.
    pub category: String,
    /// Event directory name, verbatim.
    pub event: String,
    /// File name including extension.
    pub file_name: String,
    /// File name without its final extension.
    pub stem: String,
    /// Extension without the dot, as it appears on disk.
    pub extension: String,
    /// Full path to the file.
    pub path: PathBuf,
}

impl SourceImage {
    /// `category/event/file name`, independent of where the root lives.
    pub fn relative_path(&self) -> String {
        format!("{}/{}/{}", self.category, self.event, self.file_name)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Walk `root` and collect every photo whose extension passes `accept`.
pub fn scan(root: &Path, accept: impl Fn(&str) -> bool) -> Result<Vec<SourceImage>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let mut images = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(3)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if Level::of_parent(entry.depth()) != Some(Level::InEvent) || !entry.file_type().is_file() {
            continue;
        }
        if let Some(image) = source_image(root, entry.path(), &accept) {
            images.push(image);
        }
    }

    tracing::debug!(root = %root.display(), count = images.len(), "scan complete");
    Ok(images)
}

/// Build a [`SourceImage`] from a file at event level, or `None` if its
/// extension is not accepted or its path is not valid UTF-8.
fn source_image(root: &Path, path: &Path, accept: &impl Fn(&str) -> bool) -> Option<SourceImage> {
    let extension = path.extension()?.to_str()?;
    if !accept(extension) {
        return None;
    }
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = relative.iter().map(|p| p.to_str());
    let (Some(Some(category)), Some(Some(event)), Some(Some(file_name))) =
        (parts.next(), parts.next(), parts.next())
    else {
        tracing::warn!(path = %path.display(), "skipping file with non UTF-8 path");
        return None;
    };
    let stem = path.file_stem()?.to_str()?;

    Some(SourceImage {
        category: category.to_string(),
        event: event.to_string(),
        file_name: file_name.to_string(),
        stem: stem.to_string(),
        extension: extension.to_string(),
        path: path.to_path_buf(),
    })
}
