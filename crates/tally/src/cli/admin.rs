//! Administrative command handlers.

use super::commands::{OutputFormat, ResetCommands};
use super::output::{print_json, rule};
use tally::{GuildId, TallyResult, Tracker, connect, run_migrations};
use tracing::info;

/// Create or upgrade the schema at `database_url`.
pub fn migrate(database_url: &str) -> TallyResult<()> {
    let mut conn = connect(database_url)?;
    run_migrations(&mut conn)?;
    info!(database_url, "Schema is up to date");
    println!("Database '{}' is up to date.", database_url);
    Ok(())
}

/// Rotate the weekly period, unconditionally or only when due.
pub async fn rotate(tracker: &Tracker, if_due: bool, format: OutputFormat) -> TallyResult<()> {
    let window = if if_due {
        tracker.periods().rotate_if_due().await?
    } else {
        Some(tracker.periods().rotate().await?)
    };

    match (format, window) {
        (OutputFormat::Json, window) => print_json(&window)?,
        (OutputFormat::Human, Some(window)) => {
            println!("New weekly period: {} to {}", window.start, window.end)
        }
        (OutputFormat::Human, None) => println!("Current weekly period is still running."),
    }
    Ok(())
}

/// Print the current weekly period.
pub async fn show_period(tracker: &Tracker, format: OutputFormat) -> TallyResult<()> {
    let window = tracker.periods().current().await?;
    if format == OutputFormat::Json {
        return print_json(&window);
    }

    let anchor = tracker.periods().anchor();
    println!(
        "Weekly periods end on {:?} at {}",
        anchor.weekday(),
        anchor.time().format("%H:%M")
    );
    rule();
    match window {
        Some(window) => {
            println!("Start: {}", window.start);
            println!("End:   {}", window.end);
        }
        None => println!("No weekly period yet. Run `tally rotate` or `tally serve`."),
    }
    Ok(())
}

/// Print or change a guild's XP rate.
pub async fn xp_rate(
    tracker: &Tracker,
    guild: GuildId,
    set: Option<f64>,
    format: OutputFormat,
) -> TallyResult<()> {
    let rate = match set {
        Some(value) => tracker.leveling().set_xp_rate(guild, value).await?,
        None => tracker.leveling().xp_rate(guild).await?,
    };

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "guild_id": guild, "xp_rate": rate.value() }));
    }
    println!("Guild {} earns {} XP per message.", guild, rate.value());
    Ok(())
}

/// Handle reset subcommands.
pub async fn handle_reset_command(
    tracker: &Tracker,
    cmd: ResetCommands,
    format: OutputFormat,
) -> TallyResult<()> {
    let summary = match cmd {
        ResetCommands::Member { guild, user } => {
            let summary = tracker.ledger().reset(user, guild).await?;
            if format == OutputFormat::Human {
                println!("Reset member {} in guild {}", user, guild);
            }
            summary
        }
        ResetCommands::Period { guild, period } => {
            let summary = tracker.ledger().reset_period(guild, period).await?;
            if format == OutputFormat::Human {
                println!("Reset {} activity in guild {}", period, guild);
            }
            summary
        }
    };

    if format == OutputFormat::Json {
        return print_json(&summary);
    }
    rule();
    println!("Messages deleted:       {}", summary.messages);
    println!("Voice sessions deleted: {}", summary.voice_sessions);
    println!("Emoji uses deleted:     {}", summary.emoji);
    Ok(())
}
