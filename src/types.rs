/// Core domain types: documents, the vault snapshot, path options, and block identifiers.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Separator between path segments in vault-relative paths.
pub const PATH_DELIMITER: char = '/';

/// Matches a single trailing extension (`.md`), never crossing a `/`.
static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\.[^/.]+$").expect("valid regex"));

/// A short token anchoring one block of a document, written as `^<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockId(
    /// Token text without the leading caret.
    pub String,
);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// One document of the vault, identified by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Full vault-relative path, extension included (`Notes/Projects/Alpha.md`).
    path: String,
    /// Path with the single trailing extension removed (`Notes/Projects/Alpha`).
    stem: String,
}

impl Document {
    /// Build a document from a `/`-delimited vault-relative path.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let stem = EXTENSION.replace(&path, "").into_owned();
        return Self { path, stem };
    }

    /// Final segment of the extension-stripped path.
    pub fn base_name(&self) -> &str {
        return self.stem.rsplit(PATH_DELIMITER).next().unwrap_or(&self.stem);
    }

    /// Extension without the dot, if the path has one.
    pub fn extension(&self) -> Option<&str> {
        return self.path.strip_prefix(self.stem.as_str())?.strip_prefix('.');
    }

    /// Whether the document is a markdown note.
    pub fn is_markdown(&self) -> bool {
        return self.extension() == Some("md");
    }

    /// Full vault-relative path.
    pub fn path(&self) -> &str {
        return &self.path;
    }

    /// Segments of the extension-stripped path, root to leaf.
    pub fn segments(&self) -> Vec<&str> {
        return self.stem.split(PATH_DELIMITER).collect();
    }

    /// Extension-stripped path.
    pub fn stem(&self) -> &str {
        return &self.stem;
    }
}

/// Read-only snapshot of every document in the vault, keyed by full path.
#[derive(Debug, Clone, Default)]
pub struct DocumentCollection {
    /// Documents keyed by their full path; the store guarantees key uniqueness.
    documents: BTreeMap<String, Document>,
}

impl DocumentCollection {
    /// Iterate documents in path order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        return self.documents.values();
    }

    /// Number of documents in the snapshot.
    pub fn len(&self) -> usize {
        return self.documents.len();
    }
}

impl FromIterator<Document> for DocumentCollection {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let documents = iter
            .into_iter()
            .map(|doc| return (doc.path().to_string(), doc))
            .collect();
        return Self { documents };
    }
}

/// Candidate reference strings for one document, most preferred first.
/// Never empty: constructed only through `PathOptions::single`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOptions {
    /// Ordered candidates; index zero is the shortest unique path.
    candidates: Vec<String>,
}

impl PathOptions {
    /// The most preferred candidate.
    pub fn shortest(&self) -> &str {
        return self.candidates.first().map_or("", String::as_str);
    }

    /// Options holding exactly one candidate.
    pub fn single(candidate: impl Into<String>) -> Self {
        return Self { candidates: vec![candidate.into()] };
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn strips_only_the_last_extension() {
        let doc = Document::new("Notes/archive.2023/Plan.v2.md");
        assert_eq!(doc.stem(), "Notes/archive.2023/Plan.v2");
        assert_eq!(doc.base_name(), "Plan.v2");
        assert_eq!(doc.extension(), Some("md"));
    }

    #[test]
    fn dotted_folder_is_not_an_extension() {
        let doc = Document::new("v1.0/README");
        assert_eq!(doc.stem(), "v1.0/README");
        assert_eq!(doc.extension(), None);
        assert!(!doc.is_markdown());
    }

    #[test]
    fn root_document_has_one_segment() {
        let doc = Document::new("Index.md");
        assert_eq!(doc.segments(), vec!["Index"]);
        assert_eq!(doc.base_name(), "Index");
    }

    #[test]
    fn collection_is_keyed_by_full_path() {
        let all: DocumentCollection =
            ["b.md", "a.md", "a.md"].into_iter().map(Document::new).collect();
        assert_eq!(all.len(), 2);
        let order: Vec<&str> = all.iter().map(Document::path).collect();
        assert_eq!(order, vec!["a.md", "b.md"]);
    }
}
