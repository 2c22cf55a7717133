//! Shortest unique path resolution for wikilink targets.
//!
//! A wikilink resolves by matching the trailing segments of a document's
//! extension-stripped path, so the shortest link that still points at exactly
//! one document is the shortest suffix no other document ends with.

use tracing::debug;

use crate::types::{Document, DocumentCollection, PATH_DELIMITER, PathOptions};

/// Compute the shortest path suffix that identifies `target` among `all`.
///
/// Returns the base name when the document sits at the vault root or no other
/// document shares its base name. Otherwise suffixes are tried shortest first
/// and the first unique one wins. Falls back to the full extension-stripped
/// path if no suffix is unique.
pub fn shortest_unique_path(target: &Document, all: &DocumentCollection) -> PathOptions {
    let segments = target.segments();

    if segments.len() == 1 || !has_namesake(target, all) {
        debug!(path = target.path(), "base name is unique");
        return PathOptions::single(target.base_name());
    }

    for candidate in suffixes_shortest_first(&segments) {
        if is_unique_suffix(candidate, target, all) {
            let joined = join_segments(candidate);
            debug!(path = target.path(), candidate = %joined, "unique suffix found");
            return PathOptions::single(joined);
        }
    }

    debug!(path = target.path(), "no unique suffix, using full path");
    return PathOptions::single(target.stem());
}

/// Whether any other document shares the target's base name.
fn has_namesake(target: &Document, all: &DocumentCollection) -> bool {
    return all
        .iter()
        .any(|doc| return doc.path() != target.path() && doc.base_name() == target.base_name());
}

/// A candidate is unique when no other document's path ends with the same segments.
/// Documents with fewer segments than the candidate never collide with it.
fn is_unique_suffix(candidate: &[&str], target: &Document, all: &DocumentCollection) -> bool {
    return !all
        .iter()
        .filter(|doc| return doc.path() != target.path())
        .any(|doc| return doc.segments().ends_with(candidate));
}

fn join_segments(segments: &[&str]) -> String {
    let mut joined = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            joined.push(PATH_DELIMITER);
        }
        joined.push_str(segment);
    }
    return joined;
}

/// Yield `[last]`, `[second-last, last]`, ... up to the whole slice.
fn suffixes_shortest_first<'s, 'a>(
    segments: &'s [&'a str],
) -> impl Iterator<Item = &'s [&'a str]> {
    return (0..segments.len()).rev().filter_map(|start| return segments.get(start..));
}
