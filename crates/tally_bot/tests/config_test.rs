//! Configuration loading tests.

use chrono::{NaiveTime, Weekday};
use std::io::Write;
use tally_bot::{RotationPolicy, TrackerConfig};
use tally_error::TallyErrorKind;

#[test]
fn test_bundled_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::bundled()?;

    assert_eq!(config.database_url, "tally.db");
    assert_eq!(config.rotation.interval_minutes, 30);
    assert_eq!(config.rotation.policy, RotationPolicy::EveryTick);
    assert_eq!(config.leveling.default_xp_rate, 10.0);
    assert_eq!(config.leaderboards.limit, 10);

    let anchor = config.rotation.anchor()?;
    assert_eq!(anchor.weekday(), Weekday::Sun);
    assert_eq!(anchor.time(), NaiveTime::from_hms_opt(23, 30, 0).expect("valid time"));
    assert_eq!(config.rotation.interval()?.as_secs(), 30 * 60);
    Ok(())
}

#[test]
fn test_file_overrides_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
database_url = "/var/lib/tally/stats.db"

[rotation]
anchor_weekday = "Mon"
anchor_time = "06:15"
policy = "when-due"

[leveling]
default_xp_rate = 2.5
"#
    )?;

    let config = TrackerConfig::from_file(file.path())?;

    assert_eq!(config.database_url, "/var/lib/tally/stats.db");
    assert_eq!(config.rotation.policy, RotationPolicy::WhenDue);
    assert_eq!(config.rotation.interval_minutes, 30);
    assert_eq!(config.leveling.xp_rate()?.value(), 2.5);

    let anchor = config.rotation.anchor()?;
    assert_eq!(anchor.weekday(), Weekday::Mon);
    assert_eq!(anchor.time(), NaiveTime::from_hms_opt(6, 15, 0).expect("valid time"));
    Ok(())
}

#[test]
fn test_invalid_values_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [
        "[rotation]\nanchor_weekday = \"someday\"\n",
        "[rotation]\nanchor_time = \"25:99\"\n",
        "[rotation]\ninterval_minutes = 0\n",
        "[leveling]\ndefault_xp_rate = 500.0\n",
        "[rotation]\npolicy = \"sometimes\"\n",
    ];

    for contents in cases {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        file.write_all(contents.as_bytes())?;

        let err = TrackerConfig::from_file(file.path()).expect_err(contents);
        assert!(
            matches!(err.kind(), TallyErrorKind::Config(_) | TallyErrorKind::Validation(_)),
            "unexpected error for {contents:?}: {err}"
        );
    }
    Ok(())
}

#[test]
fn test_missing_file_is_error() {
    let result = TrackerConfig::from_file("/nonexistent/tally-config.toml");
    assert!(result.is_err());
}

fn config_location(err: &tally_error::TallyError) -> (&'static str, u32) {
    match err.kind() {
        TallyErrorKind::Config(config) => (config.file, config.line),
        other => panic!("expected configuration error, got {other}"),
    }
}

#[test]
fn test_oversized_interval_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TrackerConfig::bundled()?;
    config.rotation.interval_minutes = u64::MAX;

    let err = config.rotation.interval().expect_err("minutes overflow seconds");
    assert!(err.to_string().contains("too large"));
    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_config_errors_report_their_own_location() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TrackerConfig::bundled()?;

    config.rotation.interval_minutes = 0;
    let zero = config.rotation.interval().expect_err("zero interval");
    config.rotation.interval_minutes = u64::MAX;
    let overflow = config.rotation.interval().expect_err("oversized interval");

    let (zero_file, zero_line) = config_location(&zero);
    let (overflow_file, overflow_line) = config_location(&overflow);
    assert!(zero_file.ends_with("config.rs"));
    assert_eq!(zero_file, overflow_file);
    assert_ne!(zero_line, overflow_line);
    Ok(())
}
