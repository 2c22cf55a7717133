//! Leading level-one heading extraction, skipping front matter.

/// Line that opens and closes a front matter block.
const FRONT_MATTER_DELIMITER: &str = "---";

/// Level-one heading marker, including its single trailing space.
const H1_MARKER: &str = "# ";

/// Return the document's leading `# ` heading, if its first content line is one.
///
/// Front matter is skipped only when it is closed; an unterminated block is
/// scanned from the top like any other text. A heading that appears after
/// other content is not a leading heading.
pub fn extract_leading_heading(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let first_content = body_after_front_matter(&lines)
        .iter()
        .map(|line| return line.trim())
        .find(|line| return !line.is_empty())?;

    return first_content
        .strip_prefix(H1_MARKER)
        .map(|heading| return heading.trim().to_string());
}

/// Lines following a closed front matter block, or all lines if there is none.
fn body_after_front_matter<'l, 'a>(lines: &'l [&'a str]) -> &'l [&'a str] {
    let Some((first, rest)) = lines.split_first() else {
        return lines;
    };
    if first.trim() != FRONT_MATTER_DELIMITER {
        return lines;
    }

    return match rest.iter().position(|line| return line.trim() == FRONT_MATTER_DELIMITER) {
        Some(close) => rest.get(close.saturating_add(1)..).unwrap_or_default(),
        None => lines,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn heading_after_front_matter() {
        let got = extract_leading_heading("---\ntitle: x\n---\n# Hello\n");
        assert_eq!(got.as_deref(), Some("Hello"));
    }

    #[test]
    fn heading_on_first_line() {
        assert_eq!(extract_leading_heading("# Hello\n").as_deref(), Some("Hello"));
    }

    #[test]
    fn later_heading_is_not_leading() {
        assert_eq!(extract_leading_heading("Not a heading\n# Hello\n"), None);
    }

    #[test]
    fn unterminated_front_matter_is_scanned_from_top() {
        assert_eq!(extract_leading_heading("---\nno closing\n# Hello\n"), None);
    }

    #[test]
    fn blank_lines_and_padding_are_skipped() {
        let got = extract_leading_heading("---\na: 1\n---\n\n   \n  #   Spaced Title  \r\nbody");
        assert_eq!(got.as_deref(), Some("Spaced Title"));
    }

    #[test]
    fn deeper_heading_levels_do_not_count() {
        assert_eq!(extract_leading_heading("## Section\n"), None);
        assert_eq!(extract_leading_heading("#Tag\n"), None);
    }

    #[test]
    fn empty_and_front_matter_only_documents_have_no_heading() {
        assert_eq!(extract_leading_heading(""), None);
        assert_eq!(extract_leading_heading("---\ntags: [a]\n---\n"), None);
    }
}
