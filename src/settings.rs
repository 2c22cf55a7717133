use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Error;

/// Settings file name, relative to the vault root.
pub const SETTINGS_FILE: &str = ".notelink.toml";

/// Which commands are offered and whether copying shows a notice.
/// Loaded from `.notelink.toml`; keys missing from the file take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools, reason = "independent user-facing toggles")]
pub struct Settings {
    /// Offer "Copy block embed" in the editor menu.
    pub enable_copy_block_embed: bool,
    /// Offer "Copy block link" in the editor menu.
    pub enable_copy_block_link: bool,
    /// Offer "Copy note link" in the file menu.
    pub enable_copy_note_link: bool,
    /// Offer "Copy note link as footnote" in the file menu.
    pub enable_copy_note_link_as_footnote: bool,
    /// Show a notice after copying.
    pub show_notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        return Self {
            enable_copy_block_embed: true,
            enable_copy_block_link: true,
            enable_copy_note_link: true,
            enable_copy_note_link_as_footnote: true,
            show_notifications: true,
        };
    }
}

impl Settings {
    /// Every settings key as it appears in the file, in display order.
    pub const KEYS: [&'static str; 5] = [
        "enableCopyNoteLink",
        "enableCopyNoteLinkAsFootnote",
        "enableCopyBlockLink",
        "enableCopyBlockEmbed",
        "showNotifications",
    ];

    /// Read a flag by its file key.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSetting` if no flag has this key.
    pub fn get(&self, key: &str) -> Result<bool, Error> {
        return match key {
            "enableCopyBlockEmbed" => Ok(self.enable_copy_block_embed),
            "enableCopyBlockLink" => Ok(self.enable_copy_block_link),
            "enableCopyNoteLink" => Ok(self.enable_copy_note_link),
            "enableCopyNoteLinkAsFootnote" => Ok(self.enable_copy_note_link_as_footnote),
            "showNotifications" => Ok(self.show_notifications),
            _ => Err(Error::UnknownSetting { key: key.to_string() }),
        };
    }

    /// Load settings from `.notelink.toml` in the vault root.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a settings file the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = settings_path(root);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        return Ok(toml::from_str(&content)?);
    }

    /// Write every flag to `.notelink.toml`, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlSer` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn save(&self, root: &Path) -> Result<(), Error> {
        let path = settings_path(root);
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        info!(path = %path.display(), "settings saved");
        return Ok(());
    }

    /// Set a flag by its file key.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSetting` if no flag has this key.
    pub fn set(&mut self, key: &str, value: bool) -> Result<(), Error> {
        let flag = match key {
            "enableCopyBlockEmbed" => &mut self.enable_copy_block_embed,
            "enableCopyBlockLink" => &mut self.enable_copy_block_link,
            "enableCopyNoteLink" => &mut self.enable_copy_note_link,
            "enableCopyNoteLinkAsFootnote" => &mut self.enable_copy_note_link_as_footnote,
            "showNotifications" => &mut self.show_notifications,
            _ => return Err(Error::UnknownSetting { key: key.to_string() }),
        };
        *flag = value;
        return Ok(());
    }
}

/// Parse a user-supplied flag value.
///
/// # Errors
///
/// Returns `Error::InvalidSettingValue` for anything but true/false, on/off, yes/no, 1/0.
pub fn parse_flag(key: &str, raw: &str) -> Result<bool, Error> {
    return match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(Error::InvalidSettingValue { key: key.to_string(), value: raw.to_string() }),
    };
}

/// Change one flag and save immediately, keeping the rest of the file's
/// comments and layout intact.
///
/// # Errors
///
/// Returns `Error::UnknownSetting` for an unknown key, `Error::SettingsCorrupt`
/// if the existing file is not valid TOML, or `Error::Io` if writing fails.
pub fn update_flag(root: &Path, key: &str, value: bool) -> Result<Settings, Error> {
    let mut settings = Settings::load(root)?;
    settings.set(key, value)?;

    if !settings_path(root).exists() {
        settings.save(root)?;
        return Ok(settings);
    }

    let (path, mut doc) = read_settings_doc(root)?;
    doc[key] = toml_edit::value(value);
    std::fs::write(&path, doc.to_string())?;
    info!(path = %path.display(), key, value, "settings saved");

    return Ok(settings);
}

/// Parse `.notelink.toml` into a format-preserving document.
/// Returns an empty document if the file disappeared since it was checked.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::SettingsCorrupt` on parse failure.
fn read_settings_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), Error> {
    let path = settings_path(root);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return Error::SettingsCorrupt { path: path.clone(), reason: e.to_string() };
    })?;

    return Ok((path, doc));
}

/// Location of the settings file for a vault.
pub fn settings_path(root: &Path) -> PathBuf {
    return root.join(SETTINGS_FILE);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_all_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        for key in Settings::KEYS {
            assert!(settings.get(key).unwrap(), "{key}");
        }
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(settings_path(dir.path()), "showNotifications = false\n").unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert!(!settings.show_notifications);
        assert!(settings.enable_copy_note_link);
        assert!(settings.enable_copy_block_embed);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(settings_path(dir.path()), "showNotifications = \"maybe\"\n").unwrap();
        assert!(matches!(Settings::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn save_then_load_keeps_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.set("enableCopyBlockLink", false).unwrap();
        settings.save(dir.path()).unwrap();

        let written = std::fs::read_to_string(settings_path(dir.path())).unwrap();
        assert!(written.contains("enableCopyBlockLink = false"));
        assert_eq!(Settings::load(dir.path()).unwrap(), settings);
    }

    #[test]
    fn update_flag_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let original = "# shared vault settings\nshowNotifications = true # keep quiet later\n";
        std::fs::write(settings_path(dir.path()), original).unwrap();

        let settings = update_flag(dir.path(), "enableCopyNoteLink", false).unwrap();
        assert!(!settings.enable_copy_note_link);

        let written = std::fs::read_to_string(settings_path(dir.path())).unwrap();
        assert!(written.starts_with("# shared vault settings\n"));
        assert!(written.contains("enableCopyNoteLink = false"));
        assert!(!Settings::load(dir.path()).unwrap().enable_copy_note_link);
    }

    #[test]
    fn first_change_writes_every_flag() {
        let dir = tempfile::tempdir().unwrap();
        update_flag(dir.path(), "showNotifications", false).unwrap();
        let written = std::fs::read_to_string(settings_path(dir.path())).unwrap();
        for key in Settings::KEYS {
            assert!(written.contains(key), "{key} missing from {written}");
        }
        assert!(written.contains("showNotifications = false"));
    }

    #[test]
    fn unknown_key_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let err = update_flag(dir.path(), "enableTeleport", true).unwrap_err();
        assert!(matches!(err, Error::UnknownSetting { .. }));
        assert!(!settings_path(dir.path()).exists());
    }

    #[test]
    fn flag_values_accept_common_spellings() {
        assert!(parse_flag("k", "ON").unwrap());
        assert!(!parse_flag("k", "0").unwrap());
        assert!(matches!(parse_flag("k", "sometimes"), Err(Error::InvalidSettingValue { .. })));
    }
}
