//! Reference string composition: note links, footnotes, block links and embeds.
//!
//! Each composer resolves the shortest unique path once and, for block forms,
//! anchors the cursor line once. Alongside the emitted reference it builds the
//! caption candidates an interactive chooser would offer; nothing presents them yet.

use std::fmt;

use rand::Rng;
use tracing::debug;

use crate::block::{TextBuffer, ensure_block_id};
use crate::disambiguate::shortest_unique_path;
use crate::error::Error;
use crate::heading::extract_leading_heading;
use crate::types::{BlockId, Document, DocumentCollection};

/// One entry of the caption chooser: the label shown and the link target it yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionCandidate {
    /// `target|^` caption.
    Caret(String),
    /// Placeholder for a caption typed by the user.
    Custom,
    /// `target|<leading heading>` caption.
    Heading(String),
    /// `target|<base name>` caption.
    NoteTitle(String),
    /// The uncaptioned reference, which is what gets copied today.
    Plain(String),
    /// Visual divider between the plain entry and the caption entries.
    Separator,
}

impl CaptionCandidate {
    /// Label the chooser would display.
    pub fn label(&self) -> String {
        return match self {
            Self::Caret(_) => "^".to_string(),
            Self::Custom => "Custom caption".to_string(),
            Self::Heading(_) => "H1".to_string(),
            Self::NoteTitle(_) => "Note title".to_string(),
            Self::Plain(target) => format!("[[{target}]]"),
            Self::Separator => "─".repeat(21),
        };
    }

    /// Link target the entry resolves to; empty for the separator.
    pub fn value(&self) -> &str {
        return match self {
            Self::Caret(value) | Self::Heading(value) | Self::NoteTitle(value) | Self::Plain(value) => {
                value
            },
            Self::Custom => "custom",
            Self::Separator => "",
        };
    }
}

/// What a composer produced: the reference to copy and the unused caption list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    /// Caption candidates, plain entry first.
    pub captions: Vec<CaptionCandidate>,
    /// The reference written to the clipboard.
    pub reference: Reference,
    /// Whether composing wrote a new block marker into the buffer.
    pub wrote_block_id: bool,
}

/// A finished reference string. `Display` renders the exact wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `![[path#^id]]`
    BlockEmbed {
        /// Block identifier.
        id: BlockId,
        /// Shortest unique path of the document.
        path: String,
    },
    /// `[[path#^id]]`
    BlockLink {
        /// Block identifier.
        id: BlockId,
        /// Shortest unique path of the document.
        path: String,
    },
    /// `^[[[path]]]`
    Footnote {
        /// Shortest unique path of the document.
        path: String,
    },
    /// `[[path]]`
    NoteLink {
        /// Shortest unique path of the document.
        path: String,
    },
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Self::BlockEmbed { path, id } => write!(f, "![[{path}#^{id}]]"),
            Self::BlockLink { path, id } => write!(f, "[[{path}#^{id}]]"),
            Self::Footnote { path } => write!(f, "^[[[{path}]]]"),
            Self::NoteLink { path } => write!(f, "[[{path}]]"),
        };
    }
}

/// Build the caption chooser entries for a link target.
/// The heading entry is present only when a leading heading exists.
pub fn caption_candidates(target: &str, base_name: &str, heading: Option<&str>) -> Vec<CaptionCandidate> {
    let mut captions = vec![
        CaptionCandidate::Plain(target.to_string()),
        CaptionCandidate::Separator,
        CaptionCandidate::Custom,
    ];
    if let Some(heading) = heading {
        captions.push(CaptionCandidate::Heading(format!("{target}|{heading}")));
    }
    captions.push(CaptionCandidate::NoteTitle(format!("{target}|{base_name}")));
    captions.push(CaptionCandidate::Caret(format!("{target}|^")));
    return captions;
}

/// `![[path#^id]]` for the cursor line, creating the block id if needed.
///
/// # Errors
///
/// Returns `Error::LineOutOfRange` if the cursor is not on a buffer line,
/// or an insertion error from the buffer.
pub fn compose_block_embed<B, R>(
    document: &Document,
    all: &DocumentCollection,
    buffer: &mut B,
    rng: &mut R,
) -> Result<Composed, Error>
where
    B: TextBuffer + ?Sized,
    R: Rng + ?Sized,
{
    return compose_block(document, all, buffer, rng, |path, id| return Reference::BlockEmbed { id, path });
}

/// `[[path#^id]]` for the cursor line, creating the block id if needed.
///
/// # Errors
///
/// Returns `Error::LineOutOfRange` if the cursor is not on a buffer line,
/// or an insertion error from the buffer.
pub fn compose_block_link<B, R>(
    document: &Document,
    all: &DocumentCollection,
    buffer: &mut B,
    rng: &mut R,
) -> Result<Composed, Error>
where
    B: TextBuffer + ?Sized,
    R: Rng + ?Sized,
{
    return compose_block(document, all, buffer, rng, |path, id| return Reference::BlockLink { id, path });
}

/// `^[[[path]]]` for a document.
pub fn compose_footnote(document: &Document, all: &DocumentCollection) -> Composed {
    let options = shortest_unique_path(document, all);
    let path = options.shortest().to_string();
    let captions = caption_candidates(&path, document.base_name(), None);
    debug!(path = %path, captions = %describe_captions(&captions), "footnote captions");
    return Composed { captions, reference: Reference::Footnote { path }, wrote_block_id: false };
}

/// `[[path]]` for a document; `content` supplies the heading caption.
pub fn compose_note_link(document: &Document, all: &DocumentCollection, content: &str) -> Composed {
    let options = shortest_unique_path(document, all);
    let path = options.shortest().to_string();
    let heading = extract_leading_heading(content);
    let captions = caption_candidates(&path, document.base_name(), heading.as_deref());
    debug!(path = %path, captions = %describe_captions(&captions), "note link captions");
    return Composed { captions, reference: Reference::NoteLink { path }, wrote_block_id: false };
}

/// Shared body of the two block composers: anchor first, then resolve the path.
fn compose_block<B, R, F>(
    document: &Document,
    all: &DocumentCollection,
    buffer: &mut B,
    rng: &mut R,
    build: F,
) -> Result<Composed, Error>
where
    B: TextBuffer + ?Sized,
    R: Rng + ?Sized,
    F: FnOnce(String, BlockId) -> Reference,
{
    let anchor = ensure_block_id(buffer, rng)?;
    let wrote_block_id = anchor.was_created();

    let options = shortest_unique_path(document, all);
    let path = options.shortest().to_string();
    let target = format!("{path}#^{}", anchor.id);
    let captions = caption_candidates(&target, document.base_name(), None);
    debug!(target = %target, captions = %describe_captions(&captions), "block captions");

    return Ok(Composed { captions, reference: build(path, anchor.id), wrote_block_id });
}

/// One `label = value` pair per caption, for the debug log.
fn describe_captions(captions: &[CaptionCandidate]) -> String {
    return captions
        .iter()
        .map(|caption| return format!("{} = {}", caption.label(), caption.value()))
        .collect::<Vec<_>>()
        .join("; ");
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::block::LineBuffer;

    fn vault(paths: &[&str]) -> DocumentCollection {
        return paths.iter().copied().map(Document::new).collect();
    }

    #[test]
    fn wire_formats_are_exact() {
        let id = BlockId("k3x9q1".to_string());
        let path = "Projects/Alpha".to_string();
        assert_eq!(Reference::NoteLink { path: path.clone() }.to_string(), "[[Projects/Alpha]]");
        assert_eq!(Reference::Footnote { path: path.clone() }.to_string(), "^[[[Projects/Alpha]]]");
        assert_eq!(
            Reference::BlockLink { path: path.clone(), id: id.clone() }.to_string(),
            "[[Projects/Alpha#^k3x9q1]]"
        );
        assert_eq!(Reference::BlockEmbed { path, id }.to_string(), "![[Projects/Alpha#^k3x9q1]]");
    }

    #[test]
    fn note_links_for_same_named_notes() {
        let all = vault(&["Notes/Projects/Alpha.md", "Notes/Archive/Alpha.md"]);
        let first = compose_note_link(&Document::new("Notes/Projects/Alpha.md"), &all, "");
        let second = compose_note_link(&Document::new("Notes/Archive/Alpha.md"), &all, "");
        assert_eq!(first.reference.to_string(), "[[Projects/Alpha]]");
        assert_eq!(second.reference.to_string(), "[[Archive/Alpha]]");
    }

    #[test]
    fn root_note_link_and_footnote() {
        let all = vault(&["Index.md"]);
        let doc = Document::new("Index.md");
        assert_eq!(compose_note_link(&doc, &all, "").reference.to_string(), "[[Index]]");
        assert_eq!(compose_footnote(&doc, &all).reference.to_string(), "^[[[Index]]]");
    }

    #[test]
    fn note_captions_include_heading_when_present() {
        let all = vault(&["Index.md"]);
        let doc = Document::new("Index.md");
        let composed = compose_note_link(&doc, &all, "---\ntags: []\n---\n# Welcome Home\n");
        let values: Vec<&str> = composed.captions.iter().map(CaptionCandidate::value).collect();
        assert_eq!(values, vec!["Index", "", "custom", "Index|Welcome Home", "Index|Index", "Index|^"]);
        assert_eq!(composed.captions.first().map(CaptionCandidate::label).as_deref(), Some("[[Index]]"));

        let without = compose_note_link(&doc, &all, "body first\n# Late");
        assert!(!without.captions.iter().any(|c| matches!(c, CaptionCandidate::Heading(_))));
        assert_eq!(without.captions.len(), 5);
    }

    #[test]
    fn block_link_creates_then_reuses_id() {
        let all = vault(&["Notes/Projects/Alpha.md", "Notes/Archive/Alpha.md"]);
        let doc = Document::new("Notes/Projects/Alpha.md");
        let mut buf = LineBuffer::new("# Alpha\n\nfirst paragraph\n").with_cursor(2);
        let mut rng = StdRng::seed_from_u64(1);

        let link = compose_block_link(&doc, &all, &mut buf, &mut rng).unwrap();
        assert!(link.wrote_block_id);
        let Reference::BlockLink { path, id } = &link.reference else {
            panic!("expected block link, got {:?}", link.reference);
        };
        assert_eq!(path, "Projects/Alpha");
        assert_eq!(buf.to_text(), format!("# Alpha\n\nfirst paragraph ^{id}\n"));

        let embed = compose_block_embed(&doc, &all, &mut buf, &mut rng).unwrap();
        assert!(!embed.wrote_block_id);
        assert_eq!(embed.reference.to_string(), format!("![[Projects/Alpha#^{id}]]"));
        assert_eq!(
            embed.captions.last().map(CaptionCandidate::value),
            Some(format!("Projects/Alpha#^{id}|^").as_str())
        );
    }

    #[test]
    fn caption_log_pairs_labels_with_values() {
        let captions = caption_candidates("Index", "Index", Some("Home"));
        assert_eq!(
            describe_captions(&captions),
            format!(
                "[[Index]] = Index; {} = ; Custom caption = custom; H1 = Index|Home; Note title = Index|Index; ^ = Index|^",
                "─".repeat(21)
            )
        );
    }

    #[test]
    fn block_on_missing_line_fails_without_touching_buffer() {
        let all = vault(&["Index.md"]);
        let mut buf = LineBuffer::new("only").with_cursor(3);
        let result = compose_block_link(&Document::new("Index.md"), &all, &mut buf, &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(Error::LineOutOfRange { .. })));
        assert_eq!(buf.to_text(), "only");
    }
}
