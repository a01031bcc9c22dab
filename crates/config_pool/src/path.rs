//! Config path parsing.
//!
//! Paths are hierarchical keys such as `video/width` or `video.width`.
//! Both `/` and `.` separate segments; the canonical form joins segments
//! with `/`, so `video.width` and `video/width` name the same entry.

use crate::error::{ConfigError, ConfigResult};

/// Segment delimiters accepted in config paths.
pub const DELIMITERS: [char; 2] = ['/', '.'];

/// Canonical delimiter used when storing and printing paths.
pub const SEPARATOR: char = '/';

/// Split a path into its segments.
///
/// Rejects empty paths, empty segments and leading or trailing delimiters.
pub fn segments(path: &str) -> ConfigResult<Vec<&str>> {
    if path.is_empty() {
        return Err(ConfigError::InvalidPath(path.to_string()));
    }

    let parts: Vec<&str> = path.split(DELIMITERS).collect();
    if parts.iter().any(|segment| segment.is_empty()) {
        return Err(ConfigError::InvalidPath(path.to_string()));
    }

    Ok(parts)
}

/// Canonicalize a path (validates it and joins segments with `/`).
pub fn canonicalize(path: &str) -> ConfigResult<String> {
    Ok(segments(path)?.join("/"))
}

/// Canonicalize a section name. The empty section denotes the whole tree.
pub fn canonical_section(section: &str) -> ConfigResult<String> {
    if section.is_empty() {
        Ok(String::new())
    } else {
        canonicalize(section)
    }
}

/// Check whether a canonical path lies in a canonical section's subtree.
pub fn is_within(path: &str, section: &str) -> bool {
    if section.is_empty() {
        return true;
    }
    match path.strip_prefix(section) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Canonical paths of every proper ancestor, outermost first.
///
/// `a/b/c` yields `["a", "a/b"]`.
pub fn ancestors(canonical: &str) -> Vec<&str> {
    canonical
        .match_indices(SEPARATOR)
        .map(|(idx, _)| &canonical[..idx])
        .collect()
}

/// Last segment of a canonical path.
pub fn leaf_name(canonical: &str) -> &str {
    canonical
        .rsplit_once(SEPARATOR)
        .map_or(canonical, |(_, leaf)| leaf)
}
