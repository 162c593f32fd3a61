//! Tag version ordering
//!
//! Picks the newest release tag. Tags that parse as semver (with or
//! without a leading `v`) are compared by semver rules, including
//! pre-release ordering; anything else falls back to a numeric
//! part-by-part comparison.

use semver::Version;
use std::cmp::Ordering;

/// Newest tag in a list, or `None` for an empty list
pub fn newest_tag(tags: &[String]) -> Option<&str> {
    tags.iter()
        .map(String::as_str)
        .max_by(|a, b| compare_tags(a, b))
}

/// Compare two tags as versions
pub fn compare_tags(a: &str, b: &str) -> Ordering {
    match (parse_semver(a), parse_semver(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        _ => compare_versions(a, b),
    }
}

fn parse_semver(tag: &str) -> Option<Version> {
    let tag = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(tag).ok()
}

/// Compare two version strings by their numeric parts
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse_parts = |s: &str| -> Vec<u64> {
        let s = s.strip_prefix('v').unwrap_or(s);
        s.split(['.', '-']).filter_map(|p| p.parse().ok()).collect()
    };

    let parts_a = parse_parts(a);
    let parts_b = parse_parts(b);

    for (pa, pb) in parts_a.iter().zip(parts_b.iter()) {
        match pa.cmp(pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    // If all common parts are equal, the longer version is greater
    parts_a.len().cmp(&parts_b.len())
}
