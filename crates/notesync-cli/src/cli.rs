use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "notesync")]
#[command(about = "Keep notes in a local store and sync them as remote tasks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quick capture: notesync "my note here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "add")]
    New {
        /// Note content (read from stdin when omitted)
        content: Vec<String>,
        /// Folder to create the note in
        #[arg(long, value_name = "ID")]
        folder: Option<i64>,
        /// Background color index
        #[arg(long, value_name = "INDEX")]
        bg: Option<i64>,
    },
    /// Show one note with its settings
    Show {
        /// Note ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the text of an existing note
    Edit {
        /// Note ID
        id: String,
        /// New content (read from stdin when omitted)
        content: Vec<String>,
    },
    /// List the notes and folders of a folder
    List {
        /// Folder ID (root when omitted)
        #[arg(long, value_name = "ID")]
        folder: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete notes, or move them to trash when sync is configured
    Delete {
        /// Note IDs
        #[arg(required = true)]
        ids: Vec<String>,
        /// Delete permanently even when sync is configured
        #[arg(long)]
        purge: bool,
    },
    /// Move notes to another folder
    Move {
        /// Note IDs
        #[arg(required = true)]
        ids: Vec<String>,
        /// Destination folder ID
        #[arg(long, value_name = "ID", allow_hyphen_values = true)]
        to: i64,
    },
    /// Set or clear the clock alert of a note
    Alert {
        /// Note ID
        id: String,
        /// Alert time in Unix milliseconds
        #[arg(required_unless_present = "clear")]
        at: Option<i64>,
        /// Remove the alert
        #[arg(long, conflicts_with = "at")]
        clear: bool,
    },
    /// Switch a note between plain text and check-list mode
    Checklist {
        /// Note ID
        id: String,
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Run one sync pass against the configured remote
    Sync {
        /// Cancel the pass after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// Inspect or write the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective config and sync state
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Initialize or update the config file
    Init {
        /// Account used to log in to the remote
        #[arg(long, value_name = "NAME")]
        account: Option<String>,
        /// JSON file acting as the remote task list
        #[arg(long, value_name = "PATH")]
        remote_path: Option<PathBuf>,
        /// Default sync timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Default background color for new notes
        #[arg(long, value_name = "INDEX")]
        bg: Option<i64>,
        /// Database path to store in the config
        #[arg(long = "database", value_name = "PATH")]
        database_path: Option<PathBuf>,
    },
}
