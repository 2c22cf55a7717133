use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::Error;
use crate::types::{Document, DocumentCollection, PATH_DELIMITER};

/// Source of documents for disambiguation and heading lookup.
pub trait DocumentStore {
    /// Snapshot every markdown document in the store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the store cannot be listed.
    fn list_documents(&self) -> Result<DocumentCollection, Error>;

    /// Read a document's full text.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentNotFound` if the document is gone,
    /// or `Error::Io` for other read failures.
    fn read_content(&self, document: &Document) -> Result<String, Error>;
}

/// A vault on disk: every `.md` file under `root`, addressed by `/`-delimited
/// paths relative to it. Dot-prefixed entries (`.git`, `.obsidian`) are skipped.
pub struct FsVault {
    /// Vault root directory.
    root: PathBuf,
}

impl FsVault {
    /// Open a vault rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        return Self { root: root.into() };
    }

    /// Resolve a user-supplied vault-relative path to a document.
    /// Accepts `./` prefixes and `\` separators; the file must exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentNotFound` if nothing exists at that path.
    pub fn document(&self, raw: &str) -> Result<Document, Error> {
        let relative = normalize_relative(raw);
        if relative.is_empty() || !self.disk_path_of(&relative).is_file() {
            return Err(Error::DocumentNotFound { path: raw.to_string() });
        }
        return Ok(Document::new(relative));
    }

    /// Overwrite a document's text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be written.
    pub fn write_content(&self, document: &Document, content: &str) -> Result<(), Error> {
        std::fs::write(self.disk_path_of(document.path()), content)?;
        return Ok(());
    }

    fn disk_path_of(&self, relative: &str) -> PathBuf {
        return self.root.join(relative.split(PATH_DELIMITER).collect::<PathBuf>());
    }
}

impl DocumentStore for FsVault {
    fn list_documents(&self) -> Result<DocumentCollection, Error> {
        let mut documents = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| return e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry.map_err(|e| return Error::Io(e.into()))?;
            if !entry.file_type().is_file()
                || !entry.path().extension().is_some_and(|ext| return ext == "md")
            {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            documents.push(Document::new(to_vault_path(relative)));
        }
        return Ok(documents.into_iter().collect());
    }

    fn read_content(&self, document: &Document) -> Result<String, Error> {
        return match std::fs::read_to_string(self.disk_path_of(document.path())) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::DocumentNotFound { path: document.path().to_string() })
            },
            Err(e) => Err(Error::Io(e)),
        };
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    return entry.file_name().to_string_lossy().starts_with('.');
}

/// Collapse a user path to `a/b/c.md` form: no `./`, no empty segments, `/` only.
fn normalize_relative(raw: &str) -> String {
    return raw
        .split(['/', '\\'])
        .filter(|segment| return !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
}

/// Join the normal components of a relative path with `/`.
fn to_vault_path(relative: &Path) -> String {
    return relative
        .components()
        .filter_map(|c| {
            return match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            };
        })
        .collect::<Vec<_>>()
        .join("/");
}
