/// Crate-level error types for notelink diagnostics.
use std::path::PathBuf;

use crate::registry::CommandId;

/// All errors in notelink carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the document, line, key, or command involved.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A block command was invoked without an editable text buffer.
    #[error("no editable buffer for {path}")]
    BufferUnavailable {
        /// Vault-relative path of the document the command targeted.
        path: String,
    },

    /// The clipboard sink refused the write.
    #[error("clipboard write failed: {reason}")]
    ClipboardWrite {
        /// Description of the sink failure.
        reason: String,
    },

    /// The command exists but its settings flag is turned off.
    #[error("command `{command}` is disabled in settings")]
    CommandDisabled {
        /// Command that was invoked.
        command: CommandId,
    },

    /// The requested document is not part of the vault.
    #[error("document not found: {path}")]
    DocumentNotFound {
        /// Vault-relative path that was requested.
        path: String,
    },

    /// A text insertion column does not fall on a character boundary of the line.
    #[error("column {column} is not a character boundary on line {line}")]
    InvalidColumn {
        /// Byte column that was requested.
        column: usize,
        /// Zero-based line index.
        line: usize,
    },

    /// A settings value could not be read as a boolean.
    #[error("invalid value for `{key}`: `{value}` (expected true or false)")]
    InvalidSettingValue {
        /// Settings key being written.
        key: String,
        /// Raw value supplied by the user.
        value: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The cursor line lies outside the buffer, so no block can be anchored there.
    #[error("line {line} is outside the buffer ({line_count} lines)")]
    LineOutOfRange {
        /// Zero-based line index requested.
        line: usize,
        /// Number of lines in the buffer.
        line_count: usize,
    },

    /// A note command targeted a file that is not markdown.
    #[error("not a markdown document: {path}")]
    NotMarkdown {
        /// Vault-relative path of the file.
        path: String,
    },

    /// The settings file exists but cannot be edited as TOML.
    #[error("settings corrupt: {}: {reason}", path.display())]
    SettingsCorrupt {
        /// Path to the settings file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// TOML serialization failed.
    #[error("toml serialize: {0}")]
    TomlSer(
        /// The wrapped TOML serialization error.
        #[from]
        toml::ser::Error,
    ),

    /// No handler is registered for the command.
    #[error("unknown command: `{name}`")]
    UnknownCommand {
        /// Command name that was looked up.
        name: String,
    },

    /// No settings flag has this key.
    #[error("unknown setting: `{key}`")]
    UnknownSetting {
        /// Settings key that was not recognized.
        key: String,
    },
}
