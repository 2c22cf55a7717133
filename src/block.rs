//! Block identifier lookup and creation inside an editable text buffer.
//!
//! A block is addressed by a `^id` marker either at the end of its line or on
//! the line right after it. Lookup never touches the buffer; creation inserts
//! exactly one marker.

use std::sync::LazyLock;

use rand::Rng;
use rand::seq::IndexedRandom;
use regex::Regex;
use tracing::debug;

use crate::error::Error;
use crate::types::BlockId;

/// Characters a generated identifier is drawn from.
const BLOCK_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated identifier.
const BLOCK_ID_LEN: usize = 6;

/// `text ^id` at the end of a line.
static INLINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\s\^([a-zA-Z0-9-]+)$").expect("valid regex"));

/// A line holding nothing but `^id`.
static STANDALONE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^\^([a-zA-Z0-9-]+)$").expect("valid regex"));

/// ATX heading of level one through six.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^#{1,6}\s").expect("valid regex"));

/// Identifier found or created for the cursor line, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAnchor {
    /// The block identifier.
    pub id: BlockId,
    /// How the identifier was obtained.
    pub origin: BlockOrigin,
}

impl BlockAnchor {
    /// Whether this call wrote a new marker into the buffer.
    pub const fn was_created(&self) -> bool {
        return matches!(self.origin, BlockOrigin::Created(_));
    }
}

/// Where a block identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrigin {
    /// Newly generated and inserted with the given placement.
    Created(Placement),
    /// Already present at the end of the cursor line.
    Inline,
    /// Already present alone on the line after the cursor line.
    Standalone,
}

/// One buffer line and the terminator it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    /// `"\r\n"`, `"\n"`, a lone `"\r"` at the end of the text, or `""` for the last line.
    ending: &'static str,
    /// Line content without its terminator.
    text: String,
}

/// Line-oriented buffer with a lossless two-way text conversion.
/// Every line keeps its own terminator, so mixed line endings survive an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    /// Zero-based cursor line.
    cursor: usize,
    /// Lines in document order; the last one never has a `\n` terminator.
    lines: Vec<Line>,
    /// Whether any insertion has been applied since loading.
    modified: bool,
}

impl LineBuffer {
    /// Load a buffer from document text with the cursor on the first line.
    pub fn new(text: &str) -> Self {
        let mut lines: Vec<Line> = text.split_inclusive('\n').map(split_terminator).collect();
        if text.is_empty() || text.ends_with('\n') {
            lines.push(Line { ending: "", text: String::new() });
        }
        return Self { cursor: 0, lines, modified: false };
    }

    /// Whether the buffer differs from the text it was loaded from.
    pub const fn is_modified(&self) -> bool {
        return self.modified;
    }

    /// Render the buffer back to document text.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(&line.text);
            text.push_str(line.ending);
        }
        return text;
    }

    /// Move the cursor to a zero-based line.
    pub fn with_cursor(mut self, line: usize) -> Self {
        self.cursor = line;
        return self;
    }

    /// Terminator for line breaks inserted into `line`: the line's own, else the
    /// nearest one above it, else `\n`.
    fn break_for(&self, line: usize) -> &'static str {
        return self
            .lines
            .get(..=line)
            .unwrap_or_default()
            .iter()
            .rev()
            .map(|l| return l.ending)
            .find(|ending| return ending.ends_with('\n'))
            .unwrap_or("\n");
    }
}

impl TextBuffer for LineBuffer {
    fn cursor_line(&self) -> usize {
        return self.cursor;
    }

    fn insert_text(&mut self, line: usize, column: usize, text: &str) -> Result<(), Error> {
        let line_count = self.lines.len();
        let inserted_break = self.break_for(line);
        let current = self.lines.get(line).ok_or(Error::LineOutOfRange { line, line_count })?;
        if !current.text.is_char_boundary(column) {
            return Err(Error::InvalidColumn { column, line });
        }

        let (head, tail) = current.text.split_at(column);
        let spliced = format!("{head}{text}{tail}");
        let last_ending = current.ending;
        let mut replacement: Vec<Line> = spliced
            .split('\n')
            .map(|piece| return Line { ending: inserted_break, text: piece.to_string() })
            .collect();
        if let Some(last) = replacement.last_mut() {
            last.ending = last_ending;
        }

        self.lines.splice(line..=line, replacement);
        self.modified = true;
        return Ok(());
    }

    fn line(&self, index: usize) -> Option<&str> {
        return self.lines.get(index).map(|l| return l.text.as_str());
    }

    fn line_count(&self) -> usize {
        return self.lines.len();
    }
}

/// Where a new marker goes relative to the cursor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Appended to the cursor line as ` ^id`.
    EndOfLine,
    /// On its own line right after the cursor line.
    LineAfter,
}

impl Placement {
    /// Choose the placement for a line. Blockquotes, code fences, table rows
    /// and headings would be broken by a trailing marker, so they get their own line.
    pub fn for_line(line: &str) -> Self {
        let trimmed = line.trim();
        let needs_own_line = trimmed.starts_with('>')
            || trimmed.starts_with("```")
            || trimmed.starts_with('|')
            || HEADING.is_match(trimmed);

        return if needs_own_line { Self::LineAfter } else { Self::EndOfLine };
    }

    /// Text inserted at the end of the cursor line.
    fn marker(self, id: &BlockId) -> String {
        return match self {
            Self::EndOfLine => format!(" ^{id}"),
            Self::LineAfter => format!("\n^{id}"),
        };
    }
}

/// The editor surface a block command works against.
pub trait TextBuffer {
    /// Zero-based line the cursor is on.
    fn cursor_line(&self) -> usize;

    /// Insert `text` at a byte column of a line; `text` may contain newlines.
    ///
    /// # Errors
    ///
    /// Returns `Error::LineOutOfRange` or `Error::InvalidColumn` for a bad position.
    fn insert_text(&mut self, line: usize, column: usize, text: &str) -> Result<(), Error>;

    /// Contents of a line without its terminator.
    fn line(&self, index: usize) -> Option<&str>;

    /// Number of lines in the buffer.
    fn line_count(&self) -> usize;
}

/// Return the block identifier of the cursor line, creating one if needed.
///
/// Lookup checks the end of the cursor line, then a standalone marker on the
/// next line. Only when both miss is a new identifier generated and inserted.
///
/// # Errors
///
/// Returns `Error::LineOutOfRange` if the cursor is not on a buffer line.
pub fn ensure_block_id<B, R>(buffer: &mut B, rng: &mut R) -> Result<BlockAnchor, Error>
where
    B: TextBuffer + ?Sized,
    R: Rng + ?Sized,
{
    let line = buffer.cursor_line();
    let content = buffer
        .line(line)
        .ok_or(Error::LineOutOfRange { line, line_count: buffer.line_count() })?
        .to_string();

    if let Some(anchor) = find_existing_block_id(&*buffer, line) {
        debug!(line, id = %anchor.id, origin = ?anchor.origin, "existing block id");
        return Ok(anchor);
    }

    let id = generate_block_id(rng);
    let placement = Placement::for_line(&content);
    buffer.insert_text(line, content.len(), &placement.marker(&id))?;
    debug!(line, id = %id, ?placement, "created block id");

    return Ok(BlockAnchor { id, origin: BlockOrigin::Created(placement) });
}

/// Read-only lookup of a marker on the given line or standing alone on the next.
pub fn find_existing_block_id<B: TextBuffer + ?Sized>(buffer: &B, line: usize) -> Option<BlockAnchor> {
    if let Some(id) = buffer.line(line).and_then(inline_block_id) {
        return Some(BlockAnchor { id, origin: BlockOrigin::Inline });
    }

    let next = buffer.line(line.checked_add(1)?)?;
    return standalone_block_id(next).map(|id| return BlockAnchor { id, origin: BlockOrigin::Standalone });
}

/// Generate a fresh identifier. Uniqueness within the document is not checked.
pub fn generate_block_id<R: Rng + ?Sized>(rng: &mut R) -> BlockId {
    let mut id = String::with_capacity(BLOCK_ID_LEN);
    for _ in 0..BLOCK_ID_LEN {
        if let Some(&byte) = BLOCK_ID_ALPHABET.choose(rng) {
            id.push(char::from(byte));
        }
    }
    return BlockId(id);
}

/// Split one `split_inclusive` piece into its content and terminator.
fn split_terminator(piece: &str) -> Line {
    for ending in ["\r\n", "\n", "\r"] {
        if let Some(text) = piece.strip_suffix(ending) {
            return Line { ending, text: text.to_string() };
        }
    }
    return Line { ending: "", text: piece.to_string() };
}

fn inline_block_id(line: &str) -> Option<BlockId> {
    let caps = INLINE_MARKER.captures(line)?;
    return caps.get(1).map(|m| return BlockId(m.as_str().to_string()));
}

fn standalone_block_id(line: &str) -> Option<BlockId> {
    let caps = STANDALONE_MARKER.captures(line.trim())?;
    return caps.get(1).map(|m| return BlockId(m.as_str().to_string()));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        return StdRng::seed_from_u64(7);
    }

    #[test]
    fn finds_inline_marker() {
        let mut buf = LineBuffer::new("intro\nsome text ^abc-1\nafter").with_cursor(1);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(anchor.id, BlockId("abc-1".to_string()));
        assert_eq!(anchor.origin, BlockOrigin::Inline);
        assert!(!buf.is_modified());
        assert_eq!(buf.to_text(), "intro\nsome text ^abc-1\nafter");
    }

    #[test]
    fn finds_standalone_marker_on_next_line() {
        let mut buf = LineBuffer::new("> quote\n  ^q1  \n").with_cursor(0);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(anchor.id, BlockId("q1".to_string()));
        assert_eq!(anchor.origin, BlockOrigin::Standalone);
        assert!(!anchor.was_created());
    }

    #[test]
    fn caret_inside_text_is_not_a_marker() {
        let buf = LineBuffer::new("x^2 is a square\n2^3");
        assert_eq!(find_existing_block_id(&buf, 0), None);
        assert_eq!(find_existing_block_id(&buf, 1), None);
    }

    #[test]
    fn plain_line_gets_inline_marker() {
        let mut buf = LineBuffer::new("plain text\nnext").with_cursor(0);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(anchor.origin, BlockOrigin::Created(Placement::EndOfLine));
        assert!(buf.is_modified());
        assert_eq!(buf.to_text(), format!("plain text ^{}\nnext", anchor.id));
    }

    #[test]
    fn quote_gets_marker_on_new_line() {
        let mut buf = LineBuffer::new("> a quote\nnext").with_cursor(0);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(anchor.origin, BlockOrigin::Created(Placement::LineAfter));
        assert_eq!(buf.to_text(), format!("> a quote\n^{}\nnext", anchor.id));
        assert_eq!(buf.line_count(), 3);
    }

    #[test]
    fn structural_lines_need_their_own_line() {
        for line in ["> q", "  ```rust", "| a | b |", "# Title", "###### Deep", "\tt## x"] {
            let expected = if line.starts_with('\t') { Placement::EndOfLine } else { Placement::LineAfter };
            assert_eq!(Placement::for_line(line), expected, "{line:?}");
        }
        assert_eq!(Placement::for_line("####### seven"), Placement::EndOfLine);
        assert_eq!(Placement::for_line("#hashtag"), Placement::EndOfLine);
        assert_eq!(Placement::for_line("- list item"), Placement::EndOfLine);
    }

    #[test]
    fn second_call_reuses_the_created_id() {
        for text in ["plain text", "## Heading"] {
            let mut buf = LineBuffer::new(text).with_cursor(0);
            let first = ensure_block_id(&mut buf, &mut rng()).unwrap();
            let after_first = buf.to_text();

            let second = ensure_block_id(&mut buf, &mut StdRng::seed_from_u64(99)).unwrap();
            assert_eq!(first.id, second.id);
            assert!(first.was_created());
            assert!(!second.was_created());
            assert_eq!(buf.to_text(), after_first);
        }
    }

    #[test]
    fn cursor_outside_buffer_is_an_error() {
        let mut buf = LineBuffer::new("one line").with_cursor(4);
        let err = ensure_block_id(&mut buf, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::LineOutOfRange { line: 4, line_count: 1 }));
        assert_eq!(buf.to_text(), "one line");
    }

    #[test]
    fn generated_ids_are_six_lowercase_alphanumerics() {
        let mut rng = rng();
        for _ in 0..50 {
            let id = generate_block_id(&mut rng);
            assert_eq!(id.0.len(), 6);
            assert!(id.0.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn crlf_text_round_trips_with_inserted_marker() {
        let mut buf = LineBuffer::new("a\r\nb\r\n").with_cursor(1);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(buf.to_text(), format!("a\r\nb ^{}\r\n", anchor.id));
    }

    #[test]
    fn mixed_line_endings_are_kept_line_by_line() {
        let mut buf = LineBuffer::new("a\r\nb\nc\nd").with_cursor(3);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(buf.to_text(), format!("a\r\nb\nc\nd ^{}", anchor.id));
    }

    #[test]
    fn trailing_carriage_return_survives_an_edit() {
        assert_eq!(LineBuffer::new("a\nb\r").to_text(), "a\nb\r");
        let mut buf = LineBuffer::new("a\nb\r").with_cursor(0);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(buf.to_text(), format!("a ^{}\nb\r", anchor.id));
    }

    #[test]
    fn new_marker_line_takes_the_surrounding_line_ending() {
        let mut buf = LineBuffer::new("> q\r\nnext\n").with_cursor(0);
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(buf.to_text(), format!("> q\r\n^{}\r\nnext\n", anchor.id));

        let mut last = LineBuffer::new("x\r\n## End").with_cursor(1);
        let anchor = ensure_block_id(&mut last, &mut rng()).unwrap();
        assert_eq!(last.to_text(), format!("x\r\n## End\r\n^{}", anchor.id));
    }

    #[test]
    fn cursor_on_last_line_has_no_next_line_to_scan() {
        let buf = LineBuffer::new("first\nlast line").with_cursor(1);
        assert_eq!(find_existing_block_id(&buf, 1), None);

        let mut buf = buf;
        let anchor = ensure_block_id(&mut buf, &mut rng()).unwrap();
        assert_eq!(anchor.origin, BlockOrigin::Created(Placement::EndOfLine));
        assert_eq!(buf.to_text(), format!("first\nlast line ^{}", anchor.id));

        let heading = LineBuffer::new("# Only");
        assert_eq!(find_existing_block_id(&heading, 0), None);
    }

    #[test]
    fn insert_rejects_column_inside_a_character() {
        let mut buf = LineBuffer::new("héllo");
        let err = buf.insert_text(0, 2, "x").unwrap_err();
        assert!(matches!(err, Error::InvalidColumn { column: 2, line: 0 }));
    }
}
