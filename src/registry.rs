//! Command registry: maps command identifiers to handlers the host invokes.
//!
//! Handlers own the side effects of a command. Each successful run writes
//! the reference to the clipboard once and shows at most one notice.

use std::fmt;

use rand::RngCore;
use serde::Serialize;
use tracing::{info, warn};

use crate::block::TextBuffer;
use crate::compose::{self, Composed};
use crate::error::Error;
use crate::settings::Settings;
use crate::sink::{Clipboard, Notifier, notify};
use crate::types::{Document, DocumentCollection};
use crate::vault::DocumentStore;

/// Notice shown after a successful copy.
pub const COPIED_MESSAGE: &str = "Copied to your clipboard";

/// Notice shown when the clipboard refuses the write.
pub const CLIPBOARD_FAILED_MESSAGE: &str = "Could not copy to clipboard";

/// A function that runs one command.
pub type Handler = fn(&mut Context<'_>, Invocation<'_>) -> Result<Composed, Error>;

/// Identifier of a registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandId {
    /// Copy `![[path#^id]]` for the cursor line.
    CopyBlockEmbed,
    /// Copy `[[path#^id]]` for the cursor line.
    CopyBlockLink,
    /// Copy `[[path]]` for a note.
    CopyNoteLink,
    /// Copy `^[[[path]]]` for a note.
    CopyNoteLinkAsFootnote,
}

impl CommandId {
    /// Every command, in menu order.
    pub const ALL: [Self; 4] = [
        Self::CopyNoteLink,
        Self::CopyNoteLinkAsFootnote,
        Self::CopyBlockLink,
        Self::CopyBlockEmbed,
    ];

    /// Stable identifier used on the command line and in JSON.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::CopyBlockEmbed => "copy-block-embed",
            Self::CopyBlockLink => "copy-block-link",
            Self::CopyNoteLink => "copy-note-link",
            Self::CopyNoteLinkAsFootnote => "copy-note-link-as-footnote",
        };
    }

    /// Whether the user's settings offer this command.
    pub const fn is_enabled(self, settings: &Settings) -> bool {
        return match self {
            Self::CopyBlockEmbed => settings.enable_copy_block_embed,
            Self::CopyBlockLink => settings.enable_copy_block_link,
            Self::CopyNoteLink => settings.enable_copy_note_link,
            Self::CopyNoteLinkAsFootnote => settings.enable_copy_note_link_as_footnote,
        };
    }

    /// Menu the command is listed in.
    pub const fn menu(self) -> Menu {
        return match self {
            Self::CopyBlockEmbed | Self::CopyBlockLink => Menu::Editor,
            Self::CopyNoteLink | Self::CopyNoteLinkAsFootnote => Menu::File,
        };
    }

    /// Look up a command by its stable identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCommand` if no command has this identifier.
    pub fn parse(name: &str) -> Result<Self, Error> {
        return Self::ALL
            .into_iter()
            .find(|id| return id.as_str() == name)
            .ok_or_else(|| return Error::UnknownCommand { name: name.to_string() });
    }

    /// Settings key of the flag that enables the command.
    pub const fn settings_key(self) -> &'static str {
        return match self {
            Self::CopyBlockEmbed => "enableCopyBlockEmbed",
            Self::CopyBlockLink => "enableCopyBlockLink",
            Self::CopyNoteLink => "enableCopyNoteLink",
            Self::CopyNoteLinkAsFootnote => "enableCopyNoteLinkAsFootnote",
        };
    }

    /// Menu item title.
    pub const fn title(self) -> &'static str {
        return match self {
            Self::CopyBlockEmbed => "Copy block embed",
            Self::CopyBlockLink => "Copy block link",
            Self::CopyNoteLink => "Copy note link",
            Self::CopyNoteLinkAsFootnote => "Copy note link as footnote",
        };
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

/// Registered handlers, kept in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    /// Command identifiers and their handlers.
    handlers: Vec<(CommandId, Handler)>,
}

impl CommandRegistry {
    /// Run a command. Disabled commands are refused before their handler runs.
    ///
    /// # Errors
    ///
    /// Returns `Error::CommandDisabled`, `Error::UnknownCommand`, or whatever the handler returns.
    pub fn invoke(&self, id: CommandId, context: &mut Context<'_>, invocation: Invocation<'_>) -> Result<Composed, Error> {
        if !id.is_enabled(context.settings) {
            return Err(Error::CommandDisabled { command: id });
        }
        let handler = self
            .handlers
            .iter()
            .find(|(registered, _)| return *registered == id)
            .map(|(_, handler)| return *handler)
            .ok_or_else(|| return Error::UnknownCommand { name: id.to_string() })?;

        info!(command = %id, document = invocation.document.path(), "invoking command");
        return handler(context, invocation);
    }

    /// Enabled commands of one menu, in registration order. The file menu is
    /// offered only for markdown documents.
    pub fn menu_items(&self, menu: Menu, settings: &Settings, document: Option<&Document>) -> Vec<CommandId> {
        if menu == Menu::File && !document.is_none_or(Document::is_markdown) {
            return Vec::new();
        }
        return self
            .handlers
            .iter()
            .map(|(id, _)| return *id)
            .filter(|id| return id.menu() == menu && id.is_enabled(settings))
            .collect();
    }

    /// Registry with no commands.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Add or replace the handler for a command.
    pub fn register(&mut self, id: CommandId, handler: Handler) {
        if let Some(slot) = self.handlers.iter_mut().find(|(registered, _)| return *registered == id) {
            slot.1 = handler;
        } else {
            self.handlers.push((id, handler));
        }
    }

    /// Registry holding the four copy commands.
    pub fn with_builtin_commands() -> Self {
        let mut registry = Self::new();
        registry.register(CommandId::CopyNoteLink, copy_note_link);
        registry.register(CommandId::CopyNoteLinkAsFootnote, copy_note_link_as_footnote);
        registry.register(CommandId::CopyBlockLink, copy_block_link);
        registry.register(CommandId::CopyBlockEmbed, copy_block_embed);
        return registry;
    }
}

/// Per-call collaborators handed to a handler.
pub struct Context<'a> {
    /// Where the reference string goes.
    pub clipboard: &'a mut dyn Clipboard,
    /// Where notices go.
    pub notifier: &'a mut dyn Notifier,
    /// Source of randomness for new block identifiers.
    pub rng: &'a mut dyn RngCore,
    /// Effective settings for this call.
    pub settings: &'a Settings,
    /// The vault.
    pub store: &'a dyn DocumentStore,
}

/// What a command acts on.
pub struct Invocation<'a> {
    /// Editable buffer of the document; block commands need one.
    pub buffer: Option<&'a mut dyn TextBuffer>,
    /// The target document.
    pub document: &'a Document,
}

impl<'a> Invocation<'a> {
    /// Target a document from the file menu.
    pub const fn file(document: &'a Document) -> Self {
        return Self { buffer: None, document };
    }

    /// Target the cursor line of an open document.
    pub fn editor(document: &'a Document, buffer: &'a mut dyn TextBuffer) -> Self {
        return Self { buffer: Some(buffer), document };
    }
}

/// Which host menu a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Menu {
    /// Context menu of the text editor.
    Editor,
    /// Context menu of a file in the vault tree.
    File,
}

// ── Handlers ──────────────────────────────────────────────────────────

/// Composes a block reference against an editable buffer.
type BlockComposer =
    fn(&Document, &DocumentCollection, &mut dyn TextBuffer, &mut dyn RngCore) -> Result<Composed, Error>;

fn copy_block_embed(context: &mut Context<'_>, invocation: Invocation<'_>) -> Result<Composed, Error> {
    return copy_block(
        CommandId::CopyBlockEmbed,
        "Could not create block embed",
        |document, all, buffer, rng| return compose::compose_block_embed(document, all, buffer, rng),
        context,
        invocation,
    );
}

fn copy_block_link(context: &mut Context<'_>, invocation: Invocation<'_>) -> Result<Composed, Error> {
    return copy_block(
        CommandId::CopyBlockLink,
        "Could not create block link",
        |document, all, buffer, rng| return compose::compose_block_link(document, all, buffer, rng),
        context,
        invocation,
    );
}

fn copy_note_link(context: &mut Context<'_>, invocation: Invocation<'_>) -> Result<Composed, Error> {
    let document = require_markdown(invocation.document)?;
    let all = context.store.list_documents()?;
    let content = context.store.read_content(document)?;
    let composed = compose::compose_note_link(document, &all, &content);
    deliver(context, &composed)?;
    return Ok(composed);
}

fn copy_note_link_as_footnote(context: &mut Context<'_>, invocation: Invocation<'_>) -> Result<Composed, Error> {
    let document = require_markdown(invocation.document)?;
    let all = context.store.list_documents()?;
    let composed = compose::compose_footnote(document, &all);
    deliver(context, &composed)?;
    return Ok(composed);
}

/// Anchor the cursor line and copy a block link or embed.
/// Only markdown notes are anchored, since the vault snapshot holds nothing
/// else to disambiguate against. Any failure to anchor is reported once and
/// nothing is copied.
fn copy_block(
    id: CommandId,
    failure: &str,
    composer: BlockComposer,
    context: &mut Context<'_>,
    invocation: Invocation<'_>,
) -> Result<Composed, Error> {
    let document = require_markdown(invocation.document)?;
    let Some(buffer) = invocation.buffer else {
        notify(context.settings, context.notifier, failure);
        return Err(Error::BufferUnavailable { path: document.path().to_string() });
    };

    let all = context.store.list_documents()?;
    let composed = match composer(document, &all, buffer, context.rng) {
        Ok(composed) => composed,
        Err(e) => {
            warn!(command = %id, error = %e, "no block identifier");
            notify(context.settings, context.notifier, failure);
            return Err(e);
        },
    };

    deliver(context, &composed)?;
    return Ok(composed);
}

/// Write the reference to the clipboard and confirm.
///
/// # Errors
///
/// Returns the clipboard's error after telling the user the copy failed.
fn deliver(context: &mut Context<'_>, composed: &Composed) -> Result<(), Error> {
    let text = composed.reference.to_string();
    if let Err(e) = context.clipboard.write_text(&text) {
        notify(context.settings, context.notifier, CLIPBOARD_FAILED_MESSAGE);
        return Err(e);
    }
    notify(context.settings, context.notifier, COPIED_MESSAGE);
    info!(reference = %text, "copied");
    return Ok(());
}

/// File-menu commands only apply to markdown notes.
fn require_markdown(document: &Document) -> Result<&Document, Error> {
    if document.is_markdown() {
        return Ok(document);
    }
    return Err(Error::NotMarkdown { path: document.path().to_string() });
}
