//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tally::Period;

/// Tally - guild activity statistics and leveling
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Guild activity statistics, leaderboards and leveling", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./tally.toml and ~/.config/tally/tally.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path, overriding configuration and DATABASE_URL
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Run the weekly rotation scheduler until interrupted
    Serve {
        /// Also apply JSON-lines events read from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Apply JSON-lines events from stdin, then exit
    Ingest,

    /// Rotate the weekly period now
    Rotate {
        /// Only rotate when no period exists or the current one has ended
        #[arg(long)]
        if_due: bool,
    },

    /// Show the current weekly period
    Period,

    /// Ranked lists for a guild
    Leaderboard {
        /// Guild id
        guild: i64,

        /// What to rank by
        #[arg(long, default_value = "messages")]
        by: Ranking,

        /// Time window (ignored for levels and permanent)
        #[arg(long, default_value = "weekly", value_parser = parse_period)]
        period: Period,

        /// Maximum rows (defaults to the configured limit)
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Message volume and active members for a guild
    Summary {
        /// Guild id
        guild: i64,

        /// Time window
        #[arg(long, default_value = "daily", value_parser = parse_period)]
        period: Period,
    },

    /// Breakdown for one channel
    Channel {
        /// Guild id
        guild: i64,

        /// Channel id
        channel: i64,

        /// Time window
        #[arg(long, default_value = "daily", value_parser = parse_period)]
        period: Period,
    },

    /// Most used emoji in a guild
    Emoji {
        /// Guild id
        guild: i64,

        /// Maximum rows
        #[arg(long, default_value = "10")]
        limit: i64,
    },

    /// Messages per day for the last N days
    Graph {
        /// Guild id
        guild: i64,

        /// Days to cover (1-30)
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// One member's numbers
    Profile {
        /// Guild id
        guild: i64,

        /// User id
        user: i64,
    },

    /// A member's recent role changes
    Roles {
        /// Guild id
        guild: i64,

        /// User id
        user: i64,

        /// Maximum rows
        #[arg(long, default_value = "20")]
        limit: i64,
    },

    /// Show or change a guild's XP per message
    XpRate {
        /// Guild id
        guild: i64,

        /// New rate (0.1 to 100)
        #[arg(long)]
        set: Option<f64>,
    },

    /// Administrative resets
    #[command(subcommand)]
    Reset(ResetCommands),
}

/// Reset subcommands
#[derive(Subcommand, Debug)]
pub enum ResetCommands {
    /// Wipe one member's history and zero their totals
    Member {
        /// Guild id
        guild: i64,

        /// User id
        user: i64,
    },

    /// Delete a guild's messages and voice sessions inside a window
    Period {
        /// Guild id
        guild: i64,

        /// Window to delete (weekly or monthly)
        #[arg(value_parser = parse_period)]
        period: Period,
    },
}

/// Leaderboard rankings
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ranking {
    /// Messages in the window
    Messages,
    /// Voice minutes in the window
    Voice,
    /// XP level
    Levels,
    /// All-time messages plus voice minutes
    Permanent,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

fn parse_period(value: &str) -> Result<Period, String> {
    Period::parse(value).map_err(|e| e.to_string())
}
