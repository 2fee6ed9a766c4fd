//! # Photo Data
//!
//! Incremental generator for a photo gallery's image data. Walks a
//! `category/event/photo` source tree, renders every photo at a ladder of
//! widths, and writes the JSON manifest the gallery UI reads.
//!
//! # Architecture: One Incremental Pass
//!
//! ```text
//! images/ ──scan──▶ sources ──derive──▶ resized/ ──prune──▶ resized/
//!                      │         ▲                             │
//!                      │   processing_cache.json               ▼
//!                      └─────────────────────────────▶ photoData.json
//! ```
//!
//! Each run compares every source against the cache from the previous run.
//! Unchanged sources reuse their cached record, changed ones are re-rendered
//! (old renders deleted first), and anything in the output directory that no
//! current source claims is pruned. The manifest and cache are then replaced
//! atomically. Re-running on an unchanged tree does no image work and writes
//! byte-identical files.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the source tree in sorted order, yields photos with category and event |
//! | [`naming`] | Name sanitizer and photo id derivation |
//! | [`process`] | Per-photo skip/render decision and the run driver |
//! | [`imaging`] | Pure-Rust image operations: identify, width planning, resize + encode |
//! | [`cache`] | Persisted source fingerprints and derived file lists |
//! | [`gc`] | Removes derived files no current source claims |
//! | [`manifest`] | Atomic JSON writes for the manifest and cache |
//! | [`config`] | `photo-data.toml` loading, merging, and validation |
//! | [`types`] | Manifest types shared with the UI (`PhotoRecord`, `SrcSetEntry`) |
//! | [`output`] | CLI output formatting for progress and `check` |
//!
//! # Design Decisions
//!
//! ## Stat-Based Change Detection
//!
//! Sources are compared by modification time and size rather than content
//! hash. Stat is free, and a gallery tree is edited by a person copying files
//! in, which always bumps mtime. A cache hit also requires every derived file
//! to still exist, so wiping the output directory forces a full re-render.
//!
//! ## Same Format In, Same Format Out
//!
//! A JPEG source yields JPEG renders, a PNG yields PNGs. The UI uses
//! `<img srcset>` without `<picture>` fallbacks, so no format negotiation is
//! needed. JPEG quality steps down with width; PNG and WebP are lossless.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, Lanczos3
//! resampling and encoding. No system libraries, so the binary runs wherever
//! it is copied.

pub mod cache;
pub mod config;
pub mod gc;
pub mod imaging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
