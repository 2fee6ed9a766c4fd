//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Weddings (3 photos)
//!     Smith & Jones (2 photos)
//!         001 weddings_smith_jones_img001
//!             Source: Weddings/Smith & Jones/IMG001.jpg
//!         002 weddings_smith_jones_img002
//!             Source: Weddings/Smith & Jones/IMG002.jpg
//!     Garden (1 photos)
//!         001 weddings_garden_dsc_1042
//!             Source: Weddings/Garden/DSC_1042.png
//!
//! 3 photos in 1 categories, 2 events
//! ```
//!
//! ## Build
//!
//! ```text
//! Cache: 12 entries
//! weddings_smith_jones_img001: cached
//! weddings_smith_jones_img002: rendered 48, 64, 96, 128, 256, 384, 640, 1080, 2400
//!     Source: Weddings/Smith & Jones/IMG002.jpg
//! FAILED Weddings/Garden/broken.jpg
//!     Error: Image processing failed: ...
//! Pruned weddings_old_event_img007-640w.jpg
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::process::ProcessEvent;
use crate::scan::SourceImage;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn group_header(depth: usize, title: &str, count: usize) -> String {
    format!("{}{} ({} photos)", indent(depth), title, count)
}

// ============================================================================
// Check output
// ============================================================================

/// Format the photos a build would process, grouped by category and event.
///
/// Input is in traversal order, so each category and event is contiguous.
pub fn format_scan_output(photos: &[(String, &SourceImage)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut categories = 0;
    let mut events = 0;

    let mut i = 0;
    while i < photos.len() {
        let category = &photos[i].1.category;
        let cat_len = photos[i..]
            .iter()
            .take_while(|(_, s)| &s.category == category)
            .count();
        categories += 1;
        lines.push(group_header(0, category, cat_len));

        let mut j = i;
        while j < i + cat_len {
            let event = &photos[j].1.event;
            let ev_len = photos[j..i + cat_len]
                .iter()
                .take_while(|(_, s)| &s.event == event)
                .count();
            events += 1;
            lines.push(group_header(1, event, ev_len));
            for (pos, (id, source)) in photos[j..j + ev_len].iter().enumerate() {
                lines.push(format!("{}{} {}", indent(2), format_index(pos + 1), id));
                lines.push(format!("{}Source: {}", indent(3), source.relative_path()));
            }
            j += ev_len;
        }
        i += cat_len;
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "{} photos in {} categories, {} events",
        photos.len(),
        categories,
        events
    ));
    lines
}

/// Print check output to stdout.
pub fn print_scan_output(photos: &[(String, &SourceImage)]) {
    for line in format_scan_output(photos) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::CacheLoaded { entries } => {
            vec![format!("Cache: {} entries", entries)]
        }
        ProcessEvent::PhotoSkipped { id, .. } => vec![format!("{}: cached", id)],
        ProcessEvent::PhotoProcessed { id, source, widths } => {
            let widths: Vec<String> = widths.iter().map(|w| w.to_string()).collect();
            vec![
                format!("{}: rendered {}", id, widths.join(", ")),
                format!("{}Source: {}", indent(1), source),
            ]
        }
        ProcessEvent::PhotoFailed { source, error } => vec![
            format!("FAILED {}", source),
            format!("{}Error: {}", indent(1), error),
        ],
        ProcessEvent::Pruned { file_name } => vec![format!("Pruned {}", file_name)],
    }
}
