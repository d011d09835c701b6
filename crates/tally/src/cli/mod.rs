//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the tally binary.

mod admin;
mod commands;
mod output;
mod serve;
mod stats;

pub use admin::{handle_reset_command, migrate, rotate, show_period, xp_rate};
pub use commands::{Cli, Commands, OutputFormat};
pub use output::print_json;
pub use serve::{ingest_stdin, serve};
pub use stats::{channel, emoji, graph, leaderboard, profile, roles, summary};
