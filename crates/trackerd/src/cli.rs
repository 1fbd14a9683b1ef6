//! Clap CLI definitions for `trackerd`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// trackerd -- issue tracker server.
///
/// Serves the GraphQL and REST APIs over a SQLite database, and manages the
/// users and sessions those APIs authenticate against.
#[derive(Parser, Debug)]
#[command(
    name = "trackerd",
    about = "Issue tracker server",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (TOML, or YAML for .yaml/.yml).
    #[arg(long, global = true, env = "TRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path (overrides `database.path`).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and apply migrations.
    Init,

    /// Run the HTTP server.
    Serve(ServeArgs),

    /// Manage users.
    User(UserArgs),

    /// Manage API sessions.
    Session(SessionArgs),

    /// Show issue counts per status.
    Status(StatusArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides `server.bind`).
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user.
    Add(UserAddArgs),

    /// List users.
    List,
}

#[derive(Args, Debug)]
pub struct UserAddArgs {
    /// Display name.
    pub name: String,

    /// Email address, unique per user.
    pub email: String,

    /// Avatar URL.
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Issue a bearer token for a user. The token is printed once.
    Create(SessionCreateArgs),

    /// Delete expired sessions.
    Purge,
}

#[derive(Args, Debug)]
pub struct SessionCreateArgs {
    /// User id to issue the session for.
    #[arg(long)]
    pub user: String,

    /// Lifetime in hours (default: `session.ttl_hours`).
    #[arg(long)]
    pub ttl_hours: Option<u32>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Prepend the `All` row.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate Bash completions.
    Bash,
    /// Generate Zsh completions.
    Zsh,
    /// Generate Fish completions.
    Fish,
    /// Generate PowerShell completions.
    Powershell,
}
