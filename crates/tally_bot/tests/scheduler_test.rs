//! Rotation scheduler tests.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::sync::Arc;
use std::time::Duration;
use tally_bot::{RotationPolicy, RotationScheduler};
use tally_core::{Clock, FixedClock, WeeklyAnchor, WeeklyWindow};
use tally_database::{ActivityStore, WeeklyPeriodManager};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn wednesday_noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 15)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp")
}

fn periods() -> Result<(WeeklyPeriodManager, FixedClock), Box<dyn std::error::Error>> {
    let clock = FixedClock::new(wednesday_noon());
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let store = ActivityStore::in_memory(shared)?;
    Ok((WeeklyPeriodManager::new(store, WeeklyAnchor::default()), clock))
}

/// Wait for the scheduler's immediate first tick to land.
async fn first_period(periods: &WeeklyPeriodManager) -> Result<WeeklyWindow, Box<dyn std::error::Error>> {
    for _ in 0..200 {
        if let Some(window) = periods.current().await? {
            return Ok(window);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Err("first tick never rotated".into())
}

#[tokio::test]
async fn test_first_tick_creates_period() -> TestResult {
    let (periods, _clock) = periods()?;
    let handle = RotationScheduler::new(
        periods.clone(),
        RotationPolicy::EveryTick,
        Duration::from_secs(1800),
    )
    .start();

    let current = first_period(&periods).await?;
    assert_eq!(current.end - current.start, TimeDelta::weeks(1));

    handle.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_every_tick_reanchors() -> TestResult {
    let (periods, clock) = periods()?;
    let handle = RotationScheduler::new(
        periods.clone(),
        RotationPolicy::EveryTick,
        Duration::from_secs(1800),
    )
    .start();

    let first = handle.rotate_now().await?.expect("every tick rotates");
    let again = handle.rotate_now().await?.expect("every tick rotates");
    assert_eq!(first, again);

    clock.advance(TimeDelta::days(7));
    let next = handle.rotate_now().await?.expect("every tick rotates");
    assert_eq!(next.start, first.end);
    assert_eq!(periods.current().await?, Some(next));

    handle.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_when_due_skips_running_period() -> TestResult {
    let (periods, clock) = periods()?;
    let handle = RotationScheduler::new(
        periods.clone(),
        RotationPolicy::WhenDue,
        Duration::from_secs(1800),
    )
    .start();

    let current = first_period(&periods).await?;
    assert!(handle.rotate_now().await?.is_none());

    clock.set(current.end);
    let rotated = handle.rotate_now().await?.expect("period ended");
    assert_eq!(rotated.start, current.end);

    handle.shutdown().await;
    Ok(())
}
