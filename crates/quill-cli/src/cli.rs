use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Capture and search notes against a remote notes service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name for auth/API configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Quick capture: quill "my note here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content
        content: Vec<String>,
        /// Attach a tag (repeatable, max 10)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Dictate the note via speech input when available
        #[arg(long)]
        dictate: bool,
    },
    /// List notes, newest first
    List {
        /// Page to fetch
        #[arg(long, default_value = "1")]
        page: usize,
        /// Notes per page
        #[arg(long, default_value = "20")]
        page_size: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search notes with a natural-language query
    Search {
        /// Search query (a blank query lists all notes)
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing note in $EDITOR
    Edit {
        /// Note ID
        id: String,
        /// Replace the note's tags (repeatable; omit to keep current tags)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Delete an existing note
    Delete {
        /// Note ID
        id: String,
    },
    /// Authenticate against the identity provider
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configure CLI profiles
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
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password and store the session in the keychain
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create a new account
    Signup {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password (at least 6 characters)
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for the profile
    Status,
    /// Sign out and clear the stored session
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Notes API base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Identity provider URL
        #[arg(long, value_name = "URL")]
        auth_url: Option<String>,
        /// Identity provider public API key
        #[arg(long, value_name = "KEY")]
        auth_api_key: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile configuration
    Show,
}
