//! Manifest types shared by the pipeline, the cache, and the UI.
//!
//! These are serialized verbatim into the photo manifest that the site's
//! front-end loads, so field names follow the UI's camelCase convention
//! (`srcSet`), and into each cache entry so that an unchanged source can be
//! re-emitted without touching its image.

use serde::{Deserialize, Serialize};

/// One photo in the output manifest.
///
/// `src` is the derived file at the source's full width. `src_set` lists the
/// smaller renders, strictly ascending by width, never including the full
/// width itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub category: String,
    pub event: String,
    pub src_set: Vec<SrcSetEntry>,
}

/// An alternate-resolution render offered for responsive display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrcSetEntry {
    pub src: String,
    pub width: u32,
    pub height: u32,
}
