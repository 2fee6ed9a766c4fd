//! Name sanitization and photo identity.
//!
//! Category, event, and file names come straight from the photographer's
//! directory tree (`Weddings/Smith & Jones/IMG001.jpg`). They end up in derived
//! file names and cache keys, so they are folded into lowercase tokens first:
//!
//! - `"Weddings"` → `"weddings"`
//! - `"Smith & Jones"` → `"smith_jones"`
//! - `"Trip (2019)"` → `"trip_2019_"`
//!
//! A [`photo_id`] joins the three tokens with `_`. Two different sources can
//! sanitize to the same id (`a b.jpg` and `a(b).jpg` in one event, or
//! `x.jpg` next to `x.png`); [`disambiguate`] derives a stable alternative from
//! the source's relative path.

use sha2::{Digest, Sha256};

/// Fold a free-form name into a lowercase, file-name-safe token.
///
/// Whitespace, parentheses, and any other character that is not alphanumeric,
/// `-`, or `_` act as separators. Every run of separators and underscores
/// becomes a single `_`. Leading and trailing whitespace is trimmed first.
/// Empty input yields an empty string.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '-' {
            if pending_separator {
                out.push('_');
                pending_separator = false;
            }
            out.push(c);
        } else {
            pending_separator = true;
        }
    }
    if pending_separator {
        out.push('_');
    }
    out
}

/// Stable identifier for a source photo.
///
/// `file_stem` is the file name without its extension.
pub fn photo_id(category: &str, event: &str, file_stem: &str) -> String {
    format!(
        "{}_{}_{}",
        sanitize_name(category),
        sanitize_name(event),
        sanitize_name(file_stem)
    )
}

/// Alternative id for a source whose [`photo_id`] is already taken.
///
/// Appends the first `digits` hex characters of the SHA-256 of the source's
/// relative path (`category/event/file name`). Callers start at 8 digits and
/// lengthen on the rare second collision.
pub fn disambiguate(id: &str, relative_path: &str, digits: usize) -> String {
    let digest = format!("{:x}", Sha256::digest(relative_path.as_bytes()));
    let digits = digits.clamp(1, digest.len());
    format!("{}_{}", id, &digest[..digits])
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // sanitize_name
    // =========================================================================

    #[test]
    fn lowercases_plain_names() {
        assert_eq!(sanitize_name("Weddings"), "weddings");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(sanitize_name("Summer   in\tParis"), "summer_in_paris");
    }

    #[test]
    fn ampersand_between_spaces_collapses() {
        assert_eq!(sanitize_name("Smith & Jones"), "smith_jones");
    }

    #[test]
    fn parentheses_become_separators() {
        assert_eq!(sanitize_name("Trip (2019)"), "trip_2019_");
        assert_eq!(sanitize_name("A ( B )"), "a_b_");
    }

    #[test]
    fn existing_underscores_collapse() {
        assert_eq!(sanitize_name("a__b___c"), "a_b_c");
        assert_eq!(sanitize_name("a _ b"), "a_b");
    }

    #[test]
    fn dashes_are_kept() {
        assert_eq!(sanitize_name("Black-and-White"), "black-and-white");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(sanitize_name("  Portraits  "), "portraits");
    }

    #[test]
    fn empty_input_yields_empty() {
        assert_eq!(sanitize_name(""), "");
        assert_eq!(sanitize_name("   "), "");
    }

    #[test]
    fn non_ascii_letters_survive() {
        assert_eq!(sanitize_name("Café Été"), "café_été");
    }

    // =========================================================================
    // photo_id
    // =========================================================================

    #[test]
    fn photo_id_joins_sanitized_parts() {
        assert_eq!(
            photo_id("Weddings", "Smith & Jones", "IMG001"),
            "weddings_smith_jones_img001"
        );
    }

    #[test]
    fn photo_id_is_deterministic() {
        assert_eq!(
            photo_id("Travel", "Japan 2020", "Tokyo Tower"),
            photo_id("Travel", "Japan 2020", "Tokyo Tower")
        );
    }

    #[test]
    fn photo_id_known_collision() {
        assert_eq!(
            photo_id("Cat", "Ev", "a b"),
            photo_id("Cat", "Ev", "a(b")
        );
    }

    // =========================================================================
    // disambiguate
    // =========================================================================

    #[test]
    fn disambiguate_appends_hash_prefix() {
        let id = disambiguate("cat_ev_x", "Cat/Ev/x.png", 8);
        assert!(id.starts_with("cat_ev_x_"));
        assert_eq!(id.len(), "cat_ev_x_".len() + 8);
    }

    #[test]
    fn disambiguate_depends_on_path() {
        assert_ne!(
            disambiguate("cat_ev_x", "Cat/Ev/x.png", 8),
            disambiguate("cat_ev_x", "Cat/Ev/x.jpeg", 8)
        );
    }

    #[test]
    fn disambiguate_is_stable() {
        assert_eq!(
            disambiguate("cat_ev_x", "Cat/Ev/x.png", 8),
            disambiguate("cat_ev_x", "Cat/Ev/x.png", 8)
        );
    }
}
