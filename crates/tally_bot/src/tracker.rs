//! Wiring of the storage components around one store.

use crate::{EventIngestor, TrackerConfig};
use std::sync::Arc;
use tally_core::{Clock, WeeklyAnchor, XpRate};
use tally_database::{
    ActivityStore, EventLog, LevelingEngine, PermanentStatsLedger, SessionReconciler,
    WeeklyPeriodManager, WindowedAggregator,
};
use tally_error::TallyResult;
use tracing::{info, instrument};

/// Every storage component, sharing one store and clock.
#[derive(Debug, Clone)]
pub struct Tracker {
    store: ActivityStore,
    events: EventLog,
    sessions: SessionReconciler,
    stats: WindowedAggregator,
    leveling: LevelingEngine,
    periods: WeeklyPeriodManager,
    ledger: PermanentStatsLedger,
}

impl Tracker {
    /// Build components over an existing store.
    pub fn new(store: ActivityStore, anchor: WeeklyAnchor, default_rate: XpRate) -> Self {
        Self {
            events: EventLog::new(store.clone()),
            sessions: SessionReconciler::new(store.clone()),
            stats: WindowedAggregator::new(store.clone()),
            leveling: LevelingEngine::with_default_rate(store.clone(), default_rate),
            periods: WeeklyPeriodManager::new(store.clone(), anchor),
            ledger: PermanentStatsLedger::new(store.clone()),
            store,
        }
    }

    /// Open the configured database and build components from the configuration.
    #[instrument(skip(config, clock), fields(database_url = %config.database_url))]
    pub fn open(config: &TrackerConfig, clock: Arc<dyn Clock>) -> TallyResult<Self> {
        let store = ActivityStore::open(&config.database_url, clock)?;
        let tracker = Self::with_store(store, config)?;
        info!("Tracker ready");
        Ok(tracker)
    }

    /// Build components over `store` using the configured anchor and rate.
    pub fn with_store(store: ActivityStore, config: &TrackerConfig) -> TallyResult<Self> {
        Ok(Self::new(
            store,
            config.rotation.anchor()?,
            config.leveling.xp_rate()?,
        ))
    }

    /// The shared store.
    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    /// Event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Voice session reconciler.
    pub fn sessions(&self) -> &SessionReconciler {
        &self.sessions
    }

    /// Windowed statistics.
    pub fn stats(&self) -> &WindowedAggregator {
        &self.stats
    }

    /// Leveling engine.
    pub fn leveling(&self) -> &LevelingEngine {
        &self.leveling
    }

    /// Weekly period manager.
    pub fn periods(&self) -> &WeeklyPeriodManager {
        &self.periods
    }

    /// Permanent stats ledger.
    pub fn ledger(&self) -> &PermanentStatsLedger {
        &self.ledger
    }

    /// Ingestion front end over these components.
    pub fn ingestor(&self) -> EventIngestor {
        EventIngestor::new(self)
    }
}
