//! Voice session reconciliation tests.


use chrono::TimeDelta;
use store_test_helpers::*;
use tally_database::SessionReconciler;

#[tokio::test]
async fn test_duration_sums_floored_sessions() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let sessions = SessionReconciler::new(store);

    sessions.open_session(ALICE, CHANNEL, GUILD, at(2024, 5, 15, 9, 0, 0)).await?;
    let first = sessions
        .close_session(ALICE, CHANNEL, GUILD, at(2024, 5, 15, 9, 5, 59))
        .await?
        .expect("session was open");
    assert_eq!(first.minutes, 5);

    sessions.open_session(ALICE, OTHER_CHANNEL, GUILD, at(2024, 5, 15, 10, 0, 0)).await?;
    sessions
        .close_session(ALICE, OTHER_CHANNEL, GUILD, at(2024, 5, 15, 10, 30, 30))
        .await?;

    // Another guild does not contribute
    sessions.open_session(ALICE, CHANNEL, OTHER_GUILD, at(2024, 5, 15, 8, 0, 0)).await?;
    sessions
        .close_session(ALICE, CHANNEL, OTHER_GUILD, at(2024, 5, 15, 9, 0, 0))
        .await?;

    assert_eq!(sessions.duration_minutes(ALICE, GUILD).await?, 35);
    assert_eq!(sessions.duration_minutes(ALICE, OTHER_GUILD).await?, 60);
    Ok(())
}

#[tokio::test]
async fn test_close_without_open_is_noop() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let sessions = SessionReconciler::new(store);

    let closed = sessions
        .close_session(BOB, CHANNEL, GUILD, wednesday_noon())
        .await?;

    assert!(closed.is_none());
    assert!(sessions.open_sessions(BOB, GUILD).await?.is_empty());
    assert_eq!(sessions.duration_minutes(BOB, GUILD).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_close_in_other_channel_is_noop() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let sessions = SessionReconciler::new(store);

    sessions.open_session(BOB, CHANNEL, GUILD, at(2024, 5, 15, 11, 0, 0)).await?;
    let closed = sessions
        .close_session(BOB, OTHER_CHANNEL, GUILD, wednesday_noon())
        .await?;

    assert!(closed.is_none());
    assert_eq!(sessions.open_sessions(BOB, GUILD).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_close_matches_most_recent_open() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let sessions = SessionReconciler::new(store);

    let older = sessions.open_session(ALICE, CHANNEL, GUILD, at(2024, 5, 15, 11, 0, 0)).await?;
    let newer = sessions.open_session(ALICE, CHANNEL, GUILD, at(2024, 5, 15, 11, 10, 0)).await?;

    let closed = sessions
        .close_session(ALICE, CHANNEL, GUILD, at(2024, 5, 15, 11, 20, 0))
        .await?
        .expect("session was open");

    assert_eq!(closed.session_id, newer);
    assert_eq!(closed.minutes, 10);

    let still_open = sessions.open_sessions(ALICE, GUILD).await?;
    assert_eq!(still_open.len(), 1);
    assert_eq!(still_open[0].id, older);
    assert!(still_open[0].is_open());
    Ok(())
}

#[tokio::test]
async fn test_open_session_counts_through_now() -> TestResult {
    let (store, clock) = store_at(wednesday_noon())?;
    let sessions = SessionReconciler::new(store);

    sessions
        .open_session(CAROL, CHANNEL, GUILD, wednesday_noon() - TimeDelta::minutes(15))
        .await?;
    assert_eq!(sessions.duration_minutes(CAROL, GUILD).await?, 15);

    clock.advance(TimeDelta::seconds(5 * 60 + 30));
    assert_eq!(sessions.duration_minutes(CAROL, GUILD).await?, 20);

    let as_of = wednesday_noon() + TimeDelta::hours(1);
    assert_eq!(sessions.duration_minutes_as_of(CAROL, GUILD, as_of).await?, 75);
    Ok(())
}

#[tokio::test]
async fn test_leave_before_join_counts_zero() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let sessions = SessionReconciler::new(store);

    sessions.open_session(ALICE, CHANNEL, GUILD, wednesday_noon()).await?;
    let closed = sessions
        .close_session(ALICE, CHANNEL, GUILD, wednesday_noon() - TimeDelta::minutes(3))
        .await?
        .expect("session was open");

    assert_eq!(closed.minutes, 0);
    assert_eq!(sessions.duration_minutes(ALICE, GUILD).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_closes_claim_one_session() -> TestResult {
    let (store, _clock) = store_at(wednesday_noon())?;
    let sessions = SessionReconciler::new(store);
    let other = sessions.clone();

    sessions.open_session(ALICE, CHANNEL, GUILD, at(2024, 5, 15, 11, 0, 0)).await?;

    let leave = at(2024, 5, 15, 11, 20, 0);
    let (first, second) = tokio::join!(
        sessions.close_session(ALICE, CHANNEL, GUILD, leave),
        other.close_session(ALICE, CHANNEL, GUILD, leave),
    );
    let closed: Vec<_> = [first?, second?].into_iter().flatten().collect();

    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].minutes, 20);
    assert!(sessions.open_sessions(ALICE, GUILD).await?.is_empty());
    assert_eq!(sessions.duration_minutes(ALICE, GUILD).await?, 20);
    Ok(())
}
