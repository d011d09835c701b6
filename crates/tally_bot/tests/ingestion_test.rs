//! Event ingestion tests.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::sync::Arc;
use tally_bot::{InboundEvent, IngestOutcome, Tracker};
use tally_core::{
    Clock, FixedClock, MessageReceivedBuilder, Period, ReactionAddedBuilder, RoleAction,
    RolesChangedBuilder, VoiceStateChangedBuilder, WeeklyAnchor, XpRate,
};
use tally_database::ActivityStore;

const GUILD: i64 = 500;
const GENERAL: i64 = 1;
const LOUNGE: i64 = 2;
const MUSIC: i64 = 3;
const ALICE: i64 = 11;
const BOT: i64 = 99;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 15)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp")
}

fn tracker() -> Result<(Tracker, FixedClock), Box<dyn std::error::Error>> {
    let clock = FixedClock::new(noon());
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let store = ActivityStore::in_memory(shared)?;
    Ok((
        Tracker::new(store, WeeklyAnchor::default(), XpRate::default()),
        clock,
    ))
}

#[tokio::test]
async fn test_message_logs_counts_and_levels() -> TestResult {
    let (tracker, _clock) = tracker()?;
    let ingestor = tracker.ingestor();
    let event = MessageReceivedBuilder::default()
        .user_id(ALICE)
        .channel_id(GENERAL)
        .guild_id(GUILD)
        .build()?;

    let mut level_ups = Vec::new();
    for _ in 0..10 {
        if let Some(up) = ingestor.on_message(&event).await? {
            level_ups.push(up);
        }
    }

    assert_eq!(level_ups.len(), 1);
    assert_eq!((level_ups[0].user_id, level_ups[0].level), (ALICE, 1));
    assert_eq!(tracker.stats().message_count(GUILD, Period::Daily).await?, 10);
    let totals = tracker.ledger().get(ALICE, GUILD).await?.expect("counted");
    assert_eq!(totals.total_messages, 10);
    Ok(())
}

#[tokio::test]
async fn test_bot_events_are_ignored() -> TestResult {
    let (tracker, _clock) = tracker()?;
    let ingestor = tracker.ingestor();

    let message = MessageReceivedBuilder::default()
        .user_id(BOT)
        .channel_id(GENERAL)
        .guild_id(GUILD)
        .author_is_bot(true)
        .build()?;
    assert!(ingestor.on_message(&message).await?.is_none());

    let reaction = ReactionAddedBuilder::default()
        .user_id(BOT)
        .guild_id(GUILD)
        .emoji_name("robot")
        .user_is_bot(true)
        .build()?;
    ingestor.on_reaction(&reaction).await?;

    assert_eq!(tracker.stats().message_count(GUILD, Period::AllTime).await?, 0);
    assert!(tracker.stats().emoji_stats(GUILD, 10).await?.is_empty());
    assert!(tracker.ledger().get(BOT, GUILD).await?.is_none());
    assert_eq!(tracker.leveling().level_of(BOT, GUILD).await?.xp, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_voice_move_closes_then_opens() -> TestResult {
    let (tracker, clock) = tracker()?;
    let ingestor = tracker.ingestor();

    let join = VoiceStateChangedBuilder::default()
        .user_id(ALICE)
        .guild_id(GUILD)
        .after_channel(Some(LOUNGE))
        .build()?;
    assert!(ingestor.on_voice_state(&join).await?.is_none());

    clock.advance(TimeDelta::minutes(25));
    let mute = VoiceStateChangedBuilder::default()
        .user_id(ALICE)
        .guild_id(GUILD)
        .before_channel(Some(LOUNGE))
        .after_channel(Some(LOUNGE))
        .build()?;
    assert!(ingestor.on_voice_state(&mute).await?.is_none());

    let hop = VoiceStateChangedBuilder::default()
        .user_id(ALICE)
        .guild_id(GUILD)
        .before_channel(Some(LOUNGE))
        .after_channel(Some(MUSIC))
        .build()?;
    let closed = ingestor.on_voice_state(&hop).await?.expect("lounge session closed");
    assert_eq!((closed.channel_id, closed.minutes), (LOUNGE, 25));

    clock.advance(TimeDelta::minutes(10));
    let leave = VoiceStateChangedBuilder::default()
        .user_id(ALICE)
        .guild_id(GUILD)
        .before_channel(Some(MUSIC))
        .build()?;
    let closed = ingestor.on_voice_state(&leave).await?.expect("music session closed");
    assert_eq!((closed.channel_id, closed.minutes), (MUSIC, 10));

    assert_eq!(tracker.sessions().duration_minutes(ALICE, GUILD).await?, 35);
    let totals = tracker.ledger().get(ALICE, GUILD).await?.expect("counted");
    assert_eq!(totals.total_voice_minutes, 35);
    Ok(())
}

#[tokio::test]
async fn test_leave_without_join_adds_nothing() -> TestResult {
    let (tracker, _clock) = tracker()?;
    let ingestor = tracker.ingestor();

    let leave = VoiceStateChangedBuilder::default()
        .user_id(ALICE)
        .guild_id(GUILD)
        .before_channel(Some(LOUNGE))
        .build()?;
    assert!(ingestor.on_voice_state(&leave).await?.is_none());
    assert!(tracker.ledger().get(ALICE, GUILD).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_reaction_and_roles_logged() -> TestResult {
    let (tracker, _clock) = tracker()?;
    let ingestor = tracker.ingestor();

    let reaction = ReactionAddedBuilder::default()
        .user_id(ALICE)
        .guild_id(GUILD)
        .emoji_id(Some("8812".to_string()))
        .emoji_name("party")
        .build()?;
    ingestor.on_reaction(&reaction).await?;
    ingestor.on_reaction(&reaction).await?;

    let emoji = tracker.stats().emoji_stats(GUILD, 10).await?;
    assert_eq!(emoji.len(), 1);
    assert_eq!((emoji[0].emoji_name.as_str(), emoji[0].count), ("party", 2));

    let roles = RolesChangedBuilder::default()
        .user_id(ALICE)
        .guild_id(GUILD)
        .before_roles(vec![1, 2])
        .after_roles(vec![2, 3, 4])
        .build()?;
    assert_eq!(ingestor.on_roles_changed(&roles).await?, 3);

    let history = tracker.stats().role_history(ALICE, GUILD, 10).await?;
    let mut actions: Vec<(i64, RoleAction)> =
        history.iter().map(|r| (r.role_id, r.action)).collect();
    actions.sort_by_key(|(role, _)| *role);
    assert_eq!(
        actions,
        vec![(1, RoleAction::Removed), (3, RoleAction::Added), (4, RoleAction::Added)]
    );
    Ok(())
}

#[tokio::test]
async fn test_event_timestamp_is_used_when_present() -> TestResult {
    let (tracker, _clock) = tracker()?;
    let ingestor = tracker.ingestor();
    let event = MessageReceivedBuilder::default()
        .user_id(ALICE)
        .channel_id(GENERAL)
        .guild_id(GUILD)
        .received_at(Some(noon() - TimeDelta::days(3)))
        .build()?;

    ingestor.on_message(&event).await?;

    assert_eq!(tracker.stats().message_count(GUILD, Period::Daily).await?, 0);
    assert_eq!(tracker.stats().message_count(GUILD, Period::Weekly).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_apply_json_lines() -> TestResult {
    let (tracker, clock) = tracker()?;
    let ingestor = tracker.ingestor();
    let lines = [
        r#"{"type":"voice_state","user_id":11,"guild_id":500,"after_channel":2}"#,
        r#"{"type":"message","user_id":11,"channel_id":1,"guild_id":500}"#,
        r#"{"type":"reaction","user_id":11,"guild_id":500,"emoji_name":"wave"}"#,
        r#"{"type":"roles_changed","user_id":11,"guild_id":500,"after_roles":[7]}"#,
    ];

    let mut outcomes = Vec::new();
    for line in lines {
        let event: InboundEvent = serde_json::from_str(line)?;
        outcomes.push(ingestor.apply(&event).await?);
    }
    assert_eq!(
        outcomes,
        vec![
            IngestOutcome::Recorded,
            IngestOutcome::Recorded,
            IngestOutcome::Recorded,
            IngestOutcome::RolesLogged { count: 1 },
        ]
    );

    clock.advance(TimeDelta::minutes(3));
    let leave: InboundEvent = serde_json::from_str(
        r#"{"type":"voice_state","user_id":11,"guild_id":500,"before_channel":2}"#,
    )?;
    match ingestor.apply(&leave).await? {
        IngestOutcome::SessionClosed(session) => assert_eq!(session.minutes, 3),
        other => panic!("expected a closed session, got {other:?}"),
    }
    Ok(())
}
