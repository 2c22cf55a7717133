use std::fmt::Write as _;

use crate::error::Error;
use crate::registry::CommandId;
use crate::settings::Settings;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where the user can
/// act on it, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::CommandDisabled { command } => render_command_disabled(*command),
        Error::DocumentNotFound { path } => render_document_not_found(path),
        Error::LineOutOfRange { line, line_count } => render_line_out_of_range(*line, *line_count),
        Error::UnknownSetting { key } => render_unknown_setting(key),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::BufferUnavailable { path } => format!("\
# Error: No Editable Buffer

Block commands need an open buffer for `{path}`.
"),

        Error::ClipboardWrite { reason } => format!("\
# Error: Clipboard Write Failed

{reason}
"),

        Error::InvalidColumn { column, line } => format!("\
# Error: Invalid Column

Column {column} splits a character on line {line}.
"),

        Error::InvalidSettingValue { key, value } => format!("\
# Error: Invalid Setting Value

`{value}` is not a valid value for `{key}`.

## Fix

    notelink settings set {key} true
    notelink settings set {key} false
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::NotMarkdown { path } => format!("\
# Error: Not A Markdown Note

`{path}` is not a `.md` file. Note links are only offered for markdown notes.
"),

        Error::SettingsCorrupt { path, reason } => format!("\
# Error: Settings Corrupt

Could not parse `{}`: {reason}

## Fix

Correct the file by hand, or delete it to return to defaults.
", path.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid Settings

{e}

## Fix

Every key in `.notelink.toml` takes `true` or `false`.
"),

        Error::TomlSer(e) => format!("\
# Error: TOML Serialization

{e}
"),

        Error::UnknownCommand { name } => format!("\
# Error: Unknown Command

No command is registered as `{name}`.
"),

        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_command_disabled(command: CommandId) -> String {
    let key = command.settings_key();
    format!("\
# Error: Command Disabled

`{command}` ({}) is turned off in `.notelink.toml`.

## Fix

    notelink settings set {key} true
", command.title())
}

fn render_document_not_found(path: &str) -> String {
    format!("\
# Error: Document Not Found

`{path}` does not exist in the vault.

## Fix

Pass the path relative to the vault root, extension included:

    notelink --vault <vault> note-link Folder/Note.md
")
}

fn render_line_out_of_range(line: usize, line_count: usize) -> String {
    let shown = line.saturating_add(1);
    format!("\
# Error: Line Out Of Range

Line {shown} is past the end of the note ({line_count} lines), so no block can be anchored there.
")
}

fn render_unknown_setting(key: &str) -> String {
    let mut out = format!("\
# Error: Unknown Setting

`{key}` is not a notelink setting.
");

    if let Some(suggestion) = find_closest_key(key) {
        let _ = write!(out, "\n## Did you mean `{suggestion}`?\n");
    } else {
        out.push_str("\n## Available settings\n\n");
        for k in Settings::KEYS {
            let _ = writeln!(out, "- `{k}`");
        }
    }

    out
}

/// Find a settings key that differs from `key` only in case or separators.
pub(crate) fn find_closest_key(key: &str) -> Option<&'static str> {
    let normalized = normalize_key(key);
    Settings::KEYS.into_iter().find(|k| normalize_key(k) == normalized)
}

/// Lowercase a key and drop `-` and `_` for fuzzy comparison.
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn snake_case_key_suggests_camel_case() {
        assert_eq!(find_closest_key("show_notifications"), Some("showNotifications"));
        assert_eq!(find_closest_key("enable-copy-block-link"), Some("enableCopyBlockLink"));
        assert_eq!(find_closest_key("colour"), None);
    }

    #[test]
    fn unknown_setting_lists_keys_when_nothing_is_close() {
        let md = render_error(&Error::UnknownSetting { key: "colour".to_string() });
        assert!(md.starts_with("# Error: Unknown Setting"));
        assert!(md.contains("- `enableCopyNoteLinkAsFootnote`"));
    }

    #[test]
    fn disabled_command_names_the_flag_to_flip() {
        let md = render_error(&Error::CommandDisabled { command: CommandId::CopyBlockEmbed });
        assert!(md.contains("notelink settings set enableCopyBlockEmbed true"));
    }

    #[test]
    fn line_numbers_are_shown_one_based() {
        let md = render_error(&Error::LineOutOfRange { line: 9, line_count: 3 });
        assert!(md.contains("Line 10 is past the end of the note (3 lines)"));
    }
}
