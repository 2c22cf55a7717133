use std::path::Path;

use serde::Serialize;

use crate::commands;
use crate::registry::CommandId;
use crate::settings::{self, Settings};
use crate::vault::{DocumentStore as _, FsVault};

/// Output the comprehensive notelink reference document.
pub fn run(root: &Path, json: bool) {
    let state = gather_state(root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    document_count: Option<usize>,
    enabled_commands: Vec<CommandId>,
    settings_found: bool,
    settings_valid: bool,
}

fn gather_state(root: &Path) -> CurrentState {
    let settings_found = settings::settings_path(root).exists();
    let loaded = Settings::load(root);
    let settings_valid = loaded.is_ok();
    let enabled_commands = commands::enabled_commands(&loaded.unwrap_or_default());
    let document_count = FsVault::new(root).list_documents().ok().map(|all| all.len());

    CurrentState { document_count, enabled_commands, settings_found, settings_valid }
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# notelink {version}

Copy the shortest unambiguous wikilink to a note or to a block inside it.
Links use the fewest trailing path segments that no other note shares.

## Reference Formats

    [[path]]              note link
    ^[[[path]]]           note link as inline footnote
    [[path#^id]]          block link
    ![[path#^id]]         block embed

## Commands

    notelink note-link <note.md>                 Copy [[path]]
    notelink footnote <note.md>                  Copy ^[[[path]]]
    notelink block-link <note.md> --line <n>     Copy [[path#^id]], adding ^id if missing
    notelink block-embed <note.md> --line <n>    Copy ![[path#^id]], adding ^id if missing
    notelink menu <file|editor> [note.md]        List commands a menu would show
    notelink settings show                       Print effective settings
    notelink settings set <key> <true|false>     Change and save one setting

Copied text goes to stdout; notices go to stderr. Set RUST_LOG=debug for tracing.

## Block Identifiers

A new ^id goes at the end of the line, or on its own line after
blockquotes, code fences, table rows and headings.

## Settings (.notelink.toml)

    enableCopyNoteLink = true
    enableCopyNoteLinkAsFootnote = true
    enableCopyBlockLink = true
    enableCopyBlockEmbed = true
    showNotifications = true

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    match (state.settings_found, state.settings_valid) {
        (false, _) => println!("Settings:  .notelink.toml (not found, using defaults)"),
        (true, true) => println!("Settings:  .notelink.toml (found)"),
        (true, false) => println!("Settings:  .notelink.toml (found, invalid)"),
    }

    match state.document_count {
        Some(n) => println!("Documents: {n} markdown notes"),
        None => println!("Documents: (vault unreadable)"),
    }

    if state.enabled_commands.is_empty() {
        println!("Enabled:   (none)");
    } else {
        let list = state.enabled_commands.iter().copied().map(CommandId::as_str).collect::<Vec<_>>().join(", ");
        println!("Enabled:   {list}");
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success |
| 1    | Error (diagnostic on stderr) |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    version: String,
    reference_formats: Vec<FormatInfo>,
    exit_codes: Vec<ExitCodeInfo>,
    current_state: StateJson,
}

#[derive(Serialize)]
struct FormatInfo {
    command: CommandId,
    format: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    document_count: Option<usize>,
    enabled_commands: Vec<CommandId>,
    settings_found: bool,
    settings_valid: bool,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        version: env!("CARGO_PKG_VERSION").to_string(),
        reference_formats: vec![
            FormatInfo { command: CommandId::CopyNoteLink, format: "[[path]]".to_string() },
            FormatInfo { command: CommandId::CopyNoteLinkAsFootnote, format: "^[[[path]]]".to_string() },
            FormatInfo { command: CommandId::CopyBlockLink, format: "[[path#^id]]".to_string() },
            FormatInfo { command: CommandId::CopyBlockEmbed, format: "![[path#^id]]".to_string() },
        ],
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success".to_string() },
            ExitCodeInfo { code: 1, meaning: "Error (diagnostic on stderr)".to_string() },
        ],
        current_state: StateJson {
            document_count: state.document_count,
            enabled_commands: state.enabled_commands.clone(),
            settings_found: state.settings_found,
            settings_valid: state.settings_valid,
        },
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
