//! Weekly period rotation.

use crate::models::{NewWeeklyPeriod, WeeklyPeriodRow};
use crate::schema::weekly_periods;
use crate::{ActivityStore, DatabaseResult};
use diesel::prelude::*;
use tally_core::{WeeklyAnchor, WeeklyWindow};
use tally_error::DatabaseError;
use tracing::instrument;

/// Maintains the single current weekly period.
///
/// A period runs for seven days and ends on the configured anchor (Sunday
/// 23:30 by default). Rotation demotes the current period and inserts the
/// next one in one transaction, so readers never see zero or two current
/// periods once the first rotation has happened.
#[derive(Debug, Clone)]
pub struct WeeklyPeriodManager {
    store: ActivityStore,
    anchor: WeeklyAnchor,
}

impl WeeklyPeriodManager {
    /// Create a manager that rotates on `anchor`.
    pub fn new(store: ActivityStore, anchor: WeeklyAnchor) -> Self {
        Self { store, anchor }
    }

    /// The anchor periods end on.
    pub fn anchor(&self) -> WeeklyAnchor {
        self.anchor
    }

    /// The current period, if any rotation has happened yet.
    #[instrument(skip(self))]
    pub async fn current(&self) -> DatabaseResult<Option<WeeklyWindow>> {
        let mut conn = self.store.lock().await;
        current_row(&mut *conn).map(|row| row.as_ref().map(WeeklyWindow::from))
    }

    /// Replace the current period with the one ending at the next anchor.
    #[instrument(skip(self))]
    pub async fn rotate(&self) -> DatabaseResult<WeeklyWindow> {
        let window = self.anchor.window_for(self.store.now());
        let mut conn = self.store.lock().await;

        conn.immediate_transaction::<_, DatabaseError, _>(|conn| replace_current(conn, window))?;

        tracing::info!(start = %window.start, end = %window.end, "Rotated weekly period");
        Ok(window)
    }

    /// Rotate only when there is no current period or it has ended.
    #[instrument(skip(self))]
    pub async fn rotate_if_due(&self) -> DatabaseResult<Option<WeeklyWindow>> {
        let now = self.store.now();
        let window = self.anchor.window_for(now);
        let mut conn = self.store.lock().await;

        let rotated = conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
            let due = current_row(conn)?.is_none_or(|row| row.end_time <= now);
            if due {
                replace_current(conn, window)?;
            }
            Ok(due)
        })?;

        if rotated {
            tracing::info!(start = %window.start, end = %window.end, "Rotated weekly period");
            Ok(Some(window))
        } else {
            tracing::trace!("Current weekly period still running");
            Ok(None)
        }
    }
}

fn replace_current(conn: &mut SqliteConnection, window: WeeklyWindow) -> DatabaseResult<()> {
    diesel::update(weekly_periods::table.filter(weekly_periods::is_current.eq(true)))
        .set(weekly_periods::is_current.eq(false))
        .execute(conn)
        .map_err(DatabaseError::from)?;

    diesel::insert_into(weekly_periods::table)
        .values(&NewWeeklyPeriod {
            start_time: window.start,
            end_time: window.end,
            is_current: true,
        })
        .execute(conn)
        .map_err(DatabaseError::from)?;

    Ok(())
}

fn current_row(conn: &mut SqliteConnection) -> DatabaseResult<Option<WeeklyPeriodRow>> {
    weekly_periods::table
        .filter(weekly_periods::is_current.eq(true))
        .order(weekly_periods::id.desc())
        .select(WeeklyPeriodRow::as_select())
        .first(conn)
        .optional()
        .map_err(DatabaseError::from)
}
