//! Tests for result records and their derived values.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tally_core::{
    ActivitySummary, LevelStanding, Period, PermanentStanding, UserProfile, session_minutes,
};

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 29)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap()
}

#[test]
fn test_session_minutes_floor() {
    assert_eq!(session_minutes(at(10, 0, 0), at(10, 0, 59)), 0);
    assert_eq!(session_minutes(at(10, 0, 0), at(10, 1, 0)), 1);
    assert_eq!(session_minutes(at(10, 0, 30), at(11, 30, 29)), 89);
}

#[test]
fn test_session_minutes_across_midnight() {
    let join = at(23, 50, 0);
    let leave = join + TimeDelta::minutes(25);
    assert_eq!(session_minutes(join, leave), 25);
}

#[test]
fn test_messages_per_user_no_data() {
    let summary = ActivitySummary {
        period: Period::Weekly,
        message_count: 12,
        active_users: 0,
    };
    assert!(summary.messages_per_user().is_none());
}

#[test]
fn test_messages_per_user_ratio() {
    let summary = ActivitySummary {
        period: Period::Monthly,
        message_count: 10,
        active_users: 4,
    };
    assert_eq!(summary.messages_per_user(), Some(2.5));
}

#[test]
fn test_level_standing_remaining_xp() {
    let standing = LevelStanding {
        user_id: 7,
        xp: 340.25,
        level: 3,
    };
    assert_eq!(standing.xp_to_next_level(), 59.75);
}

#[test]
fn test_profile_remaining_xp_matches_standing() {
    let profile = UserProfile {
        user_id: 7,
        guild_id: 1,
        message_count: 34,
        voice_minutes: 0,
        xp: 340.25,
        level: 3,
    };
    assert_eq!(profile.xp_to_next_level(), 59.75);
}

#[test]
fn test_permanent_score() {
    let standing = PermanentStanding {
        user_id: 1,
        total_messages: 40,
        total_voice_minutes: 125,
    };
    assert_eq!(standing.score(), 165);
}

#[test]
fn test_period_serializes_kebab_case() {
    let json = serde_json::to_string(&Period::AllTime).unwrap();
    assert_eq!(json, "\"all-time\"");
}
