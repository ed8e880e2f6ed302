use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "chordbook")]
#[command(about = "Chord charts and set-lists, synced through a shared folder")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage chord charts
    Chart {
        #[command(subcommand)]
        command: ChartCommands,
    },
    /// Manage set-lists
    #[command(name = "setlist", alias = "set-list")]
    SetList {
        #[command(subcommand)]
        command: SetListCommands,
    },
    /// Sync charts and set-lists with the connected remote folder
    Sync {
        /// Overwrite conflicting changes without asking
        #[arg(short, long)]
        yes: bool,
        #[command(subcommand)]
        command: Option<SyncCommands>,
    },
    /// Connect or inspect the remote folder
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    /// Show or change sync preferences
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

#[derive(Subcommand)]
pub enum ChartCommands {
    /// Create a new chart
    #[command(alias = "new")]
    Add {
        /// Song title
        #[arg(short, long)]
        title: String,
        /// Performing or composing artist
        #[arg(short, long)]
        artist: Option<String>,
        /// Musical key
        #[arg(short, long)]
        key: Option<String>,
        /// Tempo in BPM
        #[arg(long)]
        tempo: Option<u16>,
        /// Chart body (read from stdin when omitted)
        content: Vec<String>,
    },
    /// List charts, most recently edited first
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one chart
    Show {
        /// Chart ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a chart (opens $EDITOR when no changes are given)
    Edit {
        /// Chart ID or unique ID prefix
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        artist: Option<String>,
        #[arg(short, long)]
        key: Option<String>,
        #[arg(long)]
        tempo: Option<u16>,
        /// Replacement chart body
        content: Vec<String>,
    },
    /// Delete a chart
    #[command(alias = "rm")]
    Delete {
        /// Chart ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SetListCommands {
    /// Create a new set-list
    #[command(alias = "new")]
    Add {
        /// Set-list name
        #[arg(short, long)]
        name: String,
        /// Chart ID or prefix, in performance order (repeatable)
        #[arg(short, long = "chart", value_name = "ID")]
        charts: Vec<String>,
        /// Notes for the band
        #[arg(long)]
        notes: Option<String>,
    },
    /// List set-lists
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a set-list with its charts
    Show {
        /// Set-list ID or unique ID prefix
        id: String,
    },
    /// Delete a set-list
    #[command(alias = "rm")]
    Delete {
        /// Set-list ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Show last sync time, preferences and remote folder
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Use PATH (created if missing) as the shared remote folder
    Connect {
        /// Folder shared between devices
        path: PathBuf,
    },
    /// Forget the remote folder
    Disconnect,
    /// Show remote connection and usage
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print sync preferences
    Show,
    /// Change sync preferences
    Set {
        /// Sync automatically after local edits
        #[arg(long, value_name = "BOOL")]
        auto_sync: Option<bool>,
        /// Ask before overwriting conflicting changes
        #[arg(long, value_name = "BOOL")]
        show_conflict_warning: Option<bool>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
