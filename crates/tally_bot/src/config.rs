//! Tracker configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (tally.toml shipped with the crate)
//! 2. `~/.config/tally/tally.toml`
//! 3. `./tally.toml`
//! 4. `TALLY_*` environment variables (`__` separates sections)

use chrono::{NaiveTime, Weekday};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tally_core::{WeeklyAnchor, XpRate};
use tally_error::{ConfigError, TallyError, TallyResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../tally.toml");

/// When the scheduler replaces the current weekly period.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RotationPolicy {
    /// Re-anchor on every tick.
    #[default]
    EveryTick,
    /// Rotate only when there is no current period or it has ended.
    WhenDue,
}

/// Weekly rotation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Minutes between rotation checks.
    pub interval_minutes: u64,
    /// Weekday periods end on, e.g. "sunday" or "sun".
    pub anchor_weekday: String,
    /// Local time periods end at, "HH:MM".
    pub anchor_time: String,
    /// Rotation policy.
    #[serde(default)]
    pub policy: RotationPolicy,
}

impl RotationConfig {
    /// Tick interval for the scheduler.
    pub fn interval(&self) -> TallyResult<Duration> {
        if self.interval_minutes == 0 {
            return Err(config_error("rotation.interval_minutes must be at least 1"));
        }
        let seconds = self.interval_minutes.checked_mul(60).ok_or_else(|| {
            config_error(format!(
                "rotation.interval_minutes is too large: {}",
                self.interval_minutes
            ))
        })?;
        Ok(Duration::from_secs(seconds))
    }

    /// Parsed weekday and time anchor.
    pub fn anchor(&self) -> TallyResult<WeeklyAnchor> {
        let weekday: Weekday = self.anchor_weekday.trim().parse().map_err(|_| {
            config_error(format!(
                "rotation.anchor_weekday '{}' is not a weekday",
                self.anchor_weekday
            ))
        })?;

        let time = NaiveTime::parse_from_str(self.anchor_time.trim(), "%H:%M").map_err(|e| {
            config_error(format!(
                "rotation.anchor_time '{}' is not HH:MM: {}",
                self.anchor_time, e
            ))
        })?;

        Ok(WeeklyAnchor::new(weekday, time))
    }
}

/// Leveling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelingConfig {
    /// XP per message for guilds without an override.
    pub default_xp_rate: f64,
}

impl LevelingConfig {
    /// Validated default rate.
    pub fn xp_rate(&self) -> TallyResult<XpRate> {
        Ok(XpRate::new(self.default_xp_rate)?)
    }
}

/// Leaderboard presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Default number of rows.
    pub limit: i64,
}

/// Top-level tracker configuration.
///
/// # Example
///
/// ```no_run
/// use tally_bot::TrackerConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TrackerConfig::load()?;
/// let anchor = config.rotation.anchor()?;
/// println!("Weekly periods end on {:?} at {}", anchor.weekday(), anchor.time());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// SQLite database path or `:memory:`.
    pub database_url: String,
    /// Weekly rotation.
    pub rotation: RotationConfig,
    /// Leveling.
    pub leveling: LevelingConfig,
    /// Leaderboards.
    pub leaderboards: LeaderboardConfig,
}

impl TrackerConfig {
    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> TallyResult<Self> {
        debug!("Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tally/tally.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("tally").required(false))
            .add_source(
                Environment::with_prefix("TALLY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder)
    }

    /// Load bundled defaults overridden by one specific file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> TallyResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));

        Self::finish(builder)
    }

    /// Bundled defaults only.
    pub fn bundled() -> TallyResult<Self> {
        Self::finish(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> TallyResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| config_error(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| config_error(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check every derived value parses.
    pub fn validate(&self) -> TallyResult<()> {
        self.rotation.interval()?;
        self.rotation.anchor()?;
        self.leveling.xp_rate()?;
        if self.leaderboards.limit < 1 {
            return Err(config_error("leaderboards.limit must be at least 1"));
        }
        Ok(())
    }
}

#[track_caller]
fn config_error(message: impl Into<String>) -> TallyError {
    TallyError::from(ConfigError::new(message))
}
