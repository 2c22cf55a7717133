//! CLI commands for notelink: copy commands, menus, and settings.
//!
//! The command line stands in for the editor host: the vault directory is
//! the document store, stdout is the clipboard, and stderr shows notices.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::block::LineBuffer;
use crate::error;
use crate::registry::{CommandId, CommandRegistry, Context, Invocation, Menu};
use crate::settings::{self, Settings};
use crate::sink::{StderrNotifier, StdoutClipboard};
use crate::vault::{DocumentStore as _, FsVault};

/// One menu entry as printed by `menu --json`.
#[derive(Serialize)]
struct MenuItemJson {
    /// Stable command identifier.
    id: CommandId,
    /// Menu the entry belongs to.
    menu: Menu,
    /// Title shown in the menu.
    title: &'static str,
}

/// Run a command against an editable buffer of the document, cursor on the
/// one-based `line`. A newly created block id is written back to the document
/// file, even when the clipboard write afterwards fails.
///
/// # Errors
///
/// Returns errors from settings loading, document lookup, the command itself,
/// or writing the updated document.
pub fn copy_block(root: &Path, id: CommandId, path: &str, line: u64) -> Result<(), error::Error> {
    let settings = Settings::load(root)?;
    let vault = FsVault::new(root);
    let document = vault.document(path)?;
    let content = vault.read_content(&document)?;

    let cursor = line
        .checked_sub(1)
        .and_then(|zero_based| return usize::try_from(zero_based).ok())
        .unwrap_or(usize::MAX);
    let mut buffer = LineBuffer::new(&content).with_cursor(cursor);

    let result = run_command(&vault, &settings, id, Invocation::editor(&document, &mut buffer));

    if buffer.is_modified() {
        vault.write_content(&document, &buffer.to_text())?;
        info!(path = document.path(), "document updated with block id");
    }

    return result;
}

/// Copy a note link or footnote for a document.
///
/// # Errors
///
/// Returns errors from settings loading, document lookup, or the command itself.
pub fn copy_note(root: &Path, id: CommandId, path: &str) -> Result<(), error::Error> {
    let settings = Settings::load(root)?;
    let vault = FsVault::new(root);
    let document = vault.document(path)?;

    return run_command(&vault, &settings, id, Invocation::file(&document));
}

/// Every enabled command across both menus, file menu first.
pub fn enabled_commands(settings: &Settings) -> Vec<CommandId> {
    let registry = CommandRegistry::with_builtin_commands();
    let mut enabled = registry.menu_items(Menu::File, settings, None);
    enabled.extend(registry.menu_items(Menu::Editor, settings, None));
    return enabled;
}

/// Output the notelink reference document.
pub fn info(root: &Path, json: bool) {
    return crate::info::run(root, json);
}

/// List the commands a host menu would show.
///
/// # Errors
///
/// Returns errors from settings loading or document lookup.
pub fn menu(root: &Path, menu: Menu, path: Option<&str>, json: bool) -> Result<(), error::Error> {
    let settings = Settings::load(root)?;
    let vault = FsVault::new(root);
    let document = path.map(|p| return vault.document(p)).transpose()?;

    let registry = CommandRegistry::with_builtin_commands();
    let items = registry.menu_items(menu, &settings, document.as_ref());

    if json {
        let entries: Vec<MenuItemJson> = items
            .iter()
            .map(|id| return MenuItemJson { id: *id, menu, title: id.title() })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
        return Ok(());
    }

    if items.is_empty() {
        eprintln!("No commands enabled for this menu.");
    }
    for id in items {
        println!("{:<28}{}", id.as_str(), id.title());
    }
    return Ok(());
}

/// Invoke a command by its identifier. With a line, the note is opened in an
/// editable buffer; without one, the command gets the note alone, so block
/// commands fail the way they do when no editor is open.
///
/// # Errors
///
/// Returns `Error::UnknownCommand` for an unknown identifier, or whatever the command returns.
pub fn run(root: &Path, name: &str, path: &str, line: Option<u64>) -> Result<(), error::Error> {
    let id = CommandId::parse(name)?;
    return match line {
        Some(line) => copy_block(root, id, path, line),
        None => copy_note(root, id, path),
    };
}

/// Set one settings flag and save the file.
///
/// # Errors
///
/// Returns `Error::UnknownSetting`, `Error::InvalidSettingValue`, or settings file errors.
pub fn settings_set(root: &Path, key: &str, raw: &str) -> Result<(), error::Error> {
    let value = settings::parse_flag(key, raw)?;
    settings::update_flag(root, key, value)?;
    eprintln!("Set {key} = {value}");
    return Ok(());
}

/// Print the effective settings.
///
/// # Errors
///
/// Returns errors from settings loading.
pub fn settings_show(root: &Path, json: bool) -> Result<(), error::Error> {
    let settings = Settings::load(root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings).unwrap_or_default());
        return Ok(());
    }

    for key in Settings::KEYS {
        println!("{key:<30}{}", settings.get(key)?);
    }
    return Ok(());
}

/// Invoke a registered command with terminal-backed sinks.
///
/// # Errors
///
/// Returns whatever the command returns.
fn run_command(
    vault: &FsVault,
    settings: &Settings,
    id: CommandId,
    invocation: Invocation<'_>,
) -> Result<(), error::Error> {
    let mut clipboard = StdoutClipboard;
    let mut notifier = StderrNotifier;
    let mut rng = rand::rng();
    let mut context = Context {
        clipboard: &mut clipboard,
        notifier: &mut notifier,
        rng: &mut rng,
        settings,
        store: vault,
    };

    CommandRegistry::with_builtin_commands().invoke(id, &mut context, invocation)?;
    return Ok(());
}
