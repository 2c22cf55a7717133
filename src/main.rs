mod block;
mod commands;
mod compose;
mod diagnostics;
mod disambiguate;
mod error;
mod heading;
mod info;
mod registry;
mod settings;
mod sink;
mod types;
mod vault;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::registry::{CommandId, Menu};

#[derive(Parser)]
#[command(name = "notelink", version, about = "Copy the shortest unambiguous wikilink to a note or block")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Vault root directory
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy `![[path#^id]]` for a line, adding a block id if the line has none
    BlockEmbed {
        /// Note path relative to the vault root
        path: String,
        /// One-based line number of the block
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        line: u64,
    },
    /// Copy `[[path#^id]]` for a line, adding a block id if the line has none
    BlockLink {
        /// Note path relative to the vault root
        path: String,
        /// One-based line number of the block
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        line: u64,
    },
    /// Copy `^[[[path]]]` for a note
    Footnote {
        /// Note path relative to the vault root
        path: String,
    },
    /// Output comprehensive reference document (usage, formats, settings, current state)
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// List the commands a menu shows, given current settings
    Menu {
        /// Which menu to list
        #[arg(value_enum)]
        menu: Menu,
        /// Note the file menu was opened on
        path: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy `[[path]]` for a note
    NoteLink {
        /// Note path relative to the vault root
        path: String,
    },
    /// Invoke a command by identifier, the way an editor host would
    Run {
        /// Command identifier, e.g. `copy-block-link`
        command: String,
        /// Note path relative to the vault root
        path: String,
        /// One-based cursor line; opens the note in an editable buffer
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        line: Option<u64>,
    },
    /// Show or change settings in .notelink.toml
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Change one flag and save
    Set {
        /// Settings key, e.g. `showNotifications`
        key: String,
        /// `true` or `false`
        value: String,
    },
    /// Print every flag
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let root = cli.vault;

    let result = match cli.command {
        Commands::BlockEmbed { path, line } => commands::copy_block(&root, CommandId::CopyBlockEmbed, &path, line),
        Commands::BlockLink { path, line } => commands::copy_block(&root, CommandId::CopyBlockLink, &path, line),
        Commands::Footnote { path } => commands::copy_note(&root, CommandId::CopyNoteLinkAsFootnote, &path),
        Commands::Info { json } => {
            commands::info(&root, json);
            Ok(())
        },
        Commands::Menu { menu, path, json } => commands::menu(&root, menu, path.as_deref(), json),
        Commands::NoteLink { path } => commands::copy_note(&root, CommandId::CopyNoteLink, &path),
        Commands::Run { command, path, line } => commands::run(&root, &command, &path, line),
        Commands::Settings { action } => match action {
            SettingsAction::Set { key, value } => commands::settings_set(&root, &key, &value),
            SettingsAction::Show { json } => commands::settings_show(&root, json),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}
