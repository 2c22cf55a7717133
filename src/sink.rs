//! Output side effects: the clipboard and transient user messages.

use std::io::Write as _;

use crate::error::Error;
use crate::settings::Settings;

/// Receives the reference string a command produced.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ClipboardWrite` if the sink rejects the write.
    fn write_text(&mut self, text: &str) -> Result<(), Error>;
}

/// Shows short messages to the user.
pub trait Notifier {
    /// Display one message.
    fn show(&mut self, message: &str);
}

/// Prints notices on stderr so stdout carries only the copied text.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn show(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Terminal stand-in for the system clipboard: the reference goes to stdout,
/// ready to pipe into `pbcopy`, `wl-copy` or `xclip`.
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), Error> {
        let mut out = std::io::stdout().lock();
        return writeln!(out, "{text}")
            .and_then(|()| return out.flush())
            .map_err(|e| return Error::ClipboardWrite { reason: e.to_string() });
    }
}

/// Show a message if the user has notifications turned on.
pub fn notify(settings: &Settings, notifier: &mut dyn Notifier, message: &str) {
    if settings.show_notifications {
        notifier.show(message);
    }
}
