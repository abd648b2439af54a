//! Stable anchor identifiers linking the table of contents to the body.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;

use chrono::{DateTime, Utc};

fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Derives the anchor id for one project run from its path and start time.
///
/// Pure and deterministic, so a table-of-contents link emitted after the
/// body anchor resolves to it. Collisions between two different runs are
/// possible and acceptable: the id is a best-effort navigation aid, and a
/// collision only degrades a cross-link.
#[must_use]
pub fn anchor_id(project_path: &str, started_at: DateTime<Utc>) -> String {
    let id = hash_one(&project_path).wrapping_add(hash_one(&started_at.timestamp_micros()));
    let stem = Path::new(project_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("project");
    format!("{stem}-{id}")
}
