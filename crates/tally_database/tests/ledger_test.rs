//! Permanent stats and reset tests.


use chrono::TimeDelta;
use store_test_helpers::*;
use tally_core::{Period, RoleAction};
use tally_database::{
    EventLog, LevelingEngine, LogEntry, PermanentStatsLedger, SessionReconciler,
    WindowedAggregator,
};
use tally_error::{TallyErrorKind, ValidationErrorKind};

#[tokio::test]
async fn test_increment_accumulates() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let ledger = PermanentStatsLedger::new(store);

    ledger.increment(ALICE, GUILD, 3, 0).await?;
    let standing = ledger.increment(ALICE, GUILD, 3, 0).await?;
    assert_eq!(standing.total_messages, 6);

    let top = ledger.top(GUILD, 10).await?;
    assert_eq!(top.len(), 1);
    assert_eq!((top[0].user_id, top[0].total_messages), (ALICE, 6));
    Ok(())
}

#[tokio::test]
async fn test_top_orders_by_combined_score() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let ledger = PermanentStatsLedger::new(store);

    ledger.increment(ALICE, GUILD, 10, 5).await?;
    ledger.increment(BOB, GUILD, 1, 30).await?;
    ledger.increment(CAROL, GUILD, 15, 0).await?;
    ledger.increment(CAROL, OTHER_GUILD, 100, 100).await?;

    let top = ledger.top(GUILD, 10).await?;
    let ranked: Vec<(i64, i64)> = top.iter().map(|s| (s.user_id, s.score())).collect();
    assert_eq!(ranked, vec![(BOB, 31), (ALICE, 15), (CAROL, 15)]);

    assert_eq!(ledger.top(GUILD, 2).await?.len(), 2);
    assert!(ledger.get(BOB, OTHER_GUILD).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_reset_clears_member_history() -> TestResult {
    let now = wednesday_noon();
    let (store, _clock) = store_at(now)?;
    let log = EventLog::new(store.clone());
    let sessions = SessionReconciler::new(store.clone());
    let leveling = LevelingEngine::new(store.clone());
    let ledger = PermanentStatsLedger::new(store.clone());
    let stats = WindowedAggregator::new(store);

    for user in [ALICE, BOB] {
        log.append(LogEntry::message(user, CHANNEL, GUILD, now)).await?;
        log.append(LogEntry::emoji(user, GUILD, Some("55".to_string()), "wave", now))
            .await?;
        log.append(LogEntry::role_change(user, GUILD, 7, RoleAction::Added, now))
            .await?;
        sessions
            .open_session(user, CHANNEL, GUILD, now - TimeDelta::minutes(20))
            .await?;
        leveling.on_message(user, GUILD, now).await?;
        ledger.increment(user, GUILD, 1, 20).await?;
    }
    log.append(LogEntry::message(ALICE, CHANNEL, OTHER_GUILD, now)).await?;

    let summary = ledger.reset(ALICE, GUILD).await?;
    assert_eq!((summary.messages, summary.voice_sessions, summary.emoji), (1, 1, 1));

    assert_eq!(stats.user_message_count(ALICE, GUILD, Period::AllTime).await?, 0);
    assert_eq!(sessions.duration_minutes(ALICE, GUILD).await?, 0);
    let level = leveling.level_of(ALICE, GUILD).await?;
    assert_eq!((level.xp, level.level), (0.0, 0));
    let totals = ledger.get(ALICE, GUILD).await?.expect("row kept");
    assert_eq!((totals.total_messages, totals.total_voice_minutes), (0, 0));
    assert_eq!(stats.role_history(ALICE, GUILD, 10).await?.len(), 1);

    // Other members and guilds are untouched
    assert_eq!(stats.user_message_count(ALICE, OTHER_GUILD, Period::AllTime).await?, 1);
    assert_eq!(stats.user_message_count(BOB, GUILD, Period::AllTime).await?, 1);
    assert_eq!(sessions.duration_minutes(BOB, GUILD).await?, 20);
    assert_eq!(stats.emoji_stats(GUILD, 10).await?[0].count, 1);
    Ok(())
}

#[tokio::test]
async fn test_reset_period_keeps_permanent_totals() -> TestResult {
    let now = wednesday_noon();
    let (store, _clock) = store_at(now)?;
    let log = EventLog::new(store.clone());
    let sessions = SessionReconciler::new(store.clone());
    let leveling = LevelingEngine::new(store.clone());
    let ledger = PermanentStatsLedger::new(store.clone());
    let stats = WindowedAggregator::new(store);

    log.append(LogEntry::message(ALICE, CHANNEL, GUILD, now - TimeDelta::hours(2))).await?;
    log.append(LogEntry::message(ALICE, CHANNEL, GUILD, now - TimeDelta::days(3))).await?;
    log.append(LogEntry::message(BOB, CHANNEL, GUILD, now - TimeDelta::days(10))).await?;
    sessions
        .open_session(BOB, CHANNEL, GUILD, now - TimeDelta::hours(1))
        .await?;
    sessions
        .open_session(BOB, CHANNEL, GUILD, now - TimeDelta::days(9))
        .await?;
    leveling.on_message(ALICE, GUILD, now).await?;
    ledger.increment(ALICE, GUILD, 2, 0).await?;

    let summary = ledger.reset_period(GUILD, Period::Weekly).await?;
    assert_eq!((summary.messages, summary.voice_sessions), (2, 1));

    assert_eq!(stats.message_count(GUILD, Period::AllTime).await?, 1);
    assert_eq!(sessions.open_sessions(BOB, GUILD).await?.len(), 1);
    assert_eq!(leveling.level_of(ALICE, GUILD).await?.xp, 10.0);
    let totals = ledger.get(ALICE, GUILD).await?.expect("row kept");
    assert_eq!(totals.total_messages, 2);
    Ok(())
}

#[tokio::test]
async fn test_reset_period_rejects_daily_and_all_time() -> TestResult {
    let now = wednesday_noon();
    let (store, _clock) = store_at(now)?;
    let log = EventLog::new(store.clone());
    let sessions = SessionReconciler::new(store.clone());
    let ledger = PermanentStatsLedger::new(store.clone());
    let stats = WindowedAggregator::new(store);

    log.append(LogEntry::message(ALICE, CHANNEL, GUILD, now - TimeDelta::days(400))).await?;
    log.append(LogEntry::message(BOB, CHANNEL, GUILD, now - TimeDelta::days(20))).await?;
    log.append(LogEntry::message(BOB, CHANNEL, GUILD, now)).await?;
    sessions
        .open_session(BOB, CHANNEL, GUILD, now - TimeDelta::days(300))
        .await?;

    for period in [Period::AllTime, Period::Daily] {
        let err = ledger
            .reset_period(GUILD, period)
            .await
            .expect_err("only weekly and monthly resets");
        match err.kind() {
            TallyErrorKind::Validation(validation) => assert!(matches!(
                validation.kind,
                ValidationErrorKind::ResetPeriodNotAllowed(_)
            )),
            other => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(stats.message_count(GUILD, Period::AllTime).await?, 3);
    assert_eq!(sessions.open_sessions(BOB, GUILD).await?.len(), 1);
    Ok(())
}
