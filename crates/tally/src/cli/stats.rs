//! Statistics query handlers.

use super::commands::{OutputFormat, Ranking};
use super::output::{print_json, rule};
use tally::{ChannelId, GuildId, Period, TallyResult, Tracker, UserId};

/// Print a ranked list for a guild.
pub async fn leaderboard(
    tracker: &Tracker,
    guild: GuildId,
    by: Ranking,
    period: Period,
    limit: i64,
    format: OutputFormat,
) -> TallyResult<()> {
    let rows: Vec<(UserId, String)> = match by {
        Ranking::Messages => {
            let board = tracker.stats().message_leaderboard(guild, period, limit).await?;
            if format == OutputFormat::Json {
                return print_json(&board);
            }
            board
                .into_iter()
                .map(|e| (e.user_id, format!("{} messages", e.message_count)))
                .collect()
        }
        Ranking::Voice => {
            let board = tracker.stats().voice_leaderboard(guild, period, limit).await?;
            if format == OutputFormat::Json {
                return print_json(&board);
            }
            board
                .into_iter()
                .map(|e| (e.user_id, format!("{} minutes", e.minutes)))
                .collect()
        }
        Ranking::Levels => {
            let board = tracker.leveling().level_leaderboard(guild, limit).await?;
            if format == OutputFormat::Json {
                return print_json(&board);
            }
            board
                .into_iter()
                .map(|e| (e.user_id, format!("level {} ({:.1} XP)", e.level, e.xp)))
                .collect()
        }
        Ranking::Permanent => {
            let board = tracker.ledger().top(guild, limit).await?;
            if format == OutputFormat::Json {
                return print_json(&board);
            }
            board
                .into_iter()
                .map(|e| {
                    (
                        e.user_id,
                        format!(
                            "{} messages, {} voice minutes",
                            e.total_messages, e.total_voice_minutes
                        ),
                    )
                })
                .collect()
        }
    };

    match by {
        Ranking::Messages | Ranking::Voice => {
            println!("{:?} leaderboard ({}) for guild {}", by, period, guild)
        }
        Ranking::Levels | Ranking::Permanent => {
            println!("{:?} leaderboard for guild {}", by, guild)
        }
    }
    rule();
    if rows.is_empty() {
        println!("No data for this period.");
    }
    for (rank, (user_id, value)) in rows.iter().enumerate() {
        println!("{:>3}. {:<20} {}", rank + 1, user_id, value);
    }
    Ok(())
}

/// Print guild-wide message volume.
pub async fn summary(
    tracker: &Tracker,
    guild: GuildId,
    period: Period,
    format: OutputFormat,
) -> TallyResult<()> {
    let summary = tracker.stats().activity_summary(guild, period).await?;
    if format == OutputFormat::Json {
        return print_json(&summary);
    }

    println!("Activity ({}) for guild {}", period, guild);
    rule();
    println!("Messages:       {}", summary.message_count);
    println!("Active members: {}", summary.active_users);
    match summary.messages_per_user() {
        Some(avg) => println!("Per member:     {:.1}", avg),
        None => println!("Per member:     no data"),
    }
    Ok(())
}

/// Print one channel's breakdown.
pub async fn channel(
    tracker: &Tracker,
    guild: GuildId,
    channel: ChannelId,
    period: Period,
    format: OutputFormat,
) -> TallyResult<()> {
    let stats = tracker.stats().channel_stats(guild, channel, period).await?;
    if format == OutputFormat::Json {
        return print_json(&stats);
    }

    println!("Channel {} ({})", stats.channel_id, period);
    rule();
    println!("Messages:       {}", stats.message_count);
    println!("Active members: {}", stats.active_users);
    if !stats.peak_hours.is_empty() {
        println!("Peak hours:");
        for peak in &stats.peak_hours {
            println!("  {:02}:00  {} messages", peak.hour, peak.message_count);
        }
    }
    if !stats.top_users.is_empty() {
        println!("Top members:");
        for entry in &stats.top_users {
            println!("  {:<20} {} messages", entry.user_id, entry.message_count);
        }
    }
    Ok(())
}

/// Print the most used emoji.
pub async fn emoji(
    tracker: &Tracker,
    guild: GuildId,
    limit: i64,
    format: OutputFormat,
) -> TallyResult<()> {
    let counts = tracker.stats().emoji_stats(guild, limit).await?;
    if format == OutputFormat::Json {
        return print_json(&counts);
    }

    println!("Emoji usage for guild {}", guild);
    rule();
    if counts.is_empty() {
        println!("No emoji recorded.");
    }
    for entry in &counts {
        println!("{:<24} {}", entry.emoji_name, entry.count);
    }
    Ok(())
}

/// Print messages per day as a bar chart.
pub async fn graph(
    tracker: &Tracker,
    guild: GuildId,
    days: u32,
    format: OutputFormat,
) -> TallyResult<()> {
    let buckets = tracker.stats().daily_activity(guild, days).await?;
    if format == OutputFormat::Json {
        return print_json(&buckets);
    }

    println!("Messages per day, last {} days, guild {}", days, guild);
    rule();
    let peak = buckets.iter().map(|b| b.message_count).max().unwrap_or(0);
    for bucket in &buckets {
        // Scale to 40 columns, keeping at least one mark for non-empty days.
        let width = if peak > 0 {
            (bucket.message_count * 40 / peak).max(1)
        } else {
            0
        };
        println!(
            "{}  {:>6}  {}",
            bucket.date,
            bucket.message_count,
            "#".repeat(usize::try_from(width).unwrap_or(0))
        );
    }
    Ok(())
}

/// Print one member's numbers.
pub async fn profile(
    tracker: &Tracker,
    guild: GuildId,
    user: UserId,
    format: OutputFormat,
) -> TallyResult<()> {
    let profile = tracker.stats().user_profile(user, guild).await?;
    let standing = tracker.ledger().get(user, guild).await?;
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "profile": profile,
            "permanent": standing,
        }));
    }

    println!("Member {} in guild {}", profile.user_id, profile.guild_id);
    rule();
    println!("Level:          {}", profile.level);
    println!("XP:             {:.1}", profile.xp);
    println!("Next level in:  {:.1} XP", profile.xp_to_next_level());
    println!("Messages:       {}", profile.message_count);
    println!("Voice minutes:  {}", profile.voice_minutes);
    if let Some(standing) = standing {
        println!(
            "All-time:       {} messages, {} voice minutes",
            standing.total_messages, standing.total_voice_minutes
        );
    }
    Ok(())
}

/// Print a member's recent role changes.
pub async fn roles(
    tracker: &Tracker,
    guild: GuildId,
    user: UserId,
    limit: i64,
    format: OutputFormat,
) -> TallyResult<()> {
    let history = tracker.stats().role_history(user, guild, limit).await?;
    if format == OutputFormat::Json {
        return print_json(&history);
    }

    println!("Role changes for member {} in guild {}", user, guild);
    rule();
    if history.is_empty() {
        println!("No role changes recorded.");
    }
    for change in &history {
        println!("{}  {:<8} {}", change.timestamp, change.action, change.role_id);
    }
    Ok(())
}
