//! Shared storage handle.

use crate::{DatabaseResult, IN_MEMORY_URL, connect, run_migrations};
use chrono::NaiveDateTime;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use tally_core::Clock;
use tokio::sync::{Mutex, MutexGuard};

/// Connection plus clock shared by every storage component.
///
/// Cloning is cheap; all clones serialize on the same connection, which is
/// what makes each component operation atomic with respect to the others.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tally_core::SystemClock;
/// use tally_database::{ActivityStore, EventLog};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = ActivityStore::open("tally.db", Arc::new(SystemClock))?;
/// let log = EventLog::new(store.clone());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ActivityStore {
    conn: Arc<Mutex<SqliteConnection>>,
    clock: Arc<dyn Clock>,
}

impl ActivityStore {
    /// Wrap an already migrated connection.
    pub fn new(conn: SqliteConnection, clock: Arc<dyn Clock>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            clock,
        }
    }

    /// Create a store from an Arc<Mutex<SqliteConnection>> (for sharing connections).
    pub fn from_arc(conn: Arc<Mutex<SqliteConnection>>, clock: Arc<dyn Clock>) -> Self {
        Self { conn, clock }
    }

    /// Connect to `database_url` and bring the schema up to date.
    pub fn open(database_url: &str, clock: Arc<dyn Clock>) -> DatabaseResult<Self> {
        let mut conn = connect(database_url)?;
        run_migrations(&mut conn)?;
        Ok(Self::new(conn, clock))
    }

    /// Fresh migrated in-memory database.
    pub fn in_memory(clock: Arc<dyn Clock>) -> DatabaseResult<Self> {
        Self::open(IN_MEMORY_URL, clock)
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// The injected clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().await
    }
}

impl std::fmt::Debug for ActivityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityStore")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
