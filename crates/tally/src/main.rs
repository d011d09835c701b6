//! Tally CLI binary.
//!
//! This binary provides command-line access to the activity tracker:
//! - Run the weekly rotation scheduler and ingest gateway events
//! - Query leaderboards, channel, emoji and member statistics
//! - Administer XP rates and resets

use clap::Parser;
use std::sync::Arc;
use tally::{SystemClock, Tracker, TrackerConfig};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, OutputFormat};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    dotenvy::dotenv().ok();

    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::load()?,
    };
    if let Some(url) = cli
        .database
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
    {
        config.database_url = url;
    }

    if let Commands::Migrate = cli.command {
        cli::migrate(&config.database_url)?;
        return Ok(());
    }

    let tracker = Tracker::open(&config, Arc::new(SystemClock))?;
    let format = cli.format;

    // Execute the requested command
    match cli.command {
        Commands::Migrate => {}

        Commands::Serve { stdin } => {
            cli::serve(&tracker, &config, stdin, format).await?;
        }

        Commands::Ingest => {
            let report = cli::ingest_stdin(&tracker, format).await?;
            match format {
                OutputFormat::Json => cli::print_json(&report)?,
                OutputFormat::Human => println!(
                    "Applied {} events ({} malformed, {} failed).",
                    report.applied, report.skipped, report.failed
                ),
            }
        }

        Commands::Rotate { if_due } => {
            cli::rotate(&tracker, if_due, format).await?;
        }

        Commands::Period => {
            cli::show_period(&tracker, format).await?;
        }

        Commands::Leaderboard {
            guild,
            by,
            period,
            limit,
        } => {
            let limit = limit.unwrap_or(config.leaderboards.limit);
            cli::leaderboard(&tracker, guild, by, period, limit, format).await?;
        }

        Commands::Summary { guild, period } => {
            cli::summary(&tracker, guild, period, format).await?;
        }

        Commands::Channel {
            guild,
            channel,
            period,
        } => {
            cli::channel(&tracker, guild, channel, period, format).await?;
        }

        Commands::Emoji { guild, limit } => {
            cli::emoji(&tracker, guild, limit, format).await?;
        }

        Commands::Graph { guild, days } => {
            cli::graph(&tracker, guild, days, format).await?;
        }

        Commands::Profile { guild, user } => {
            cli::profile(&tracker, guild, user, format).await?;
        }

        Commands::Roles { guild, user, limit } => {
            cli::roles(&tracker, guild, user, limit, format).await?;
        }

        Commands::XpRate { guild, set } => {
            cli::xp_rate(&tracker, guild, set, format).await?;
        }

        Commands::Reset(reset_cmd) => {
            cli::handle_reset_command(&tracker, reset_cmd, format).await?;
        }
    }

    Ok(())
}
