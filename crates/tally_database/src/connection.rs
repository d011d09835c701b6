//! Database connection utilities.

use crate::DatabaseResult;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tally_error::{DatabaseError, DatabaseErrorKind};

/// SQLite URL for a private in-memory database.
pub const IN_MEMORY_URL: &str = ":memory:";

/// Establish a connection to the database named by `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
pub fn establish_connection() -> DatabaseResult<SqliteConnection> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;

    connect(&database_url)
}

/// Open a SQLite database at `database_url` and apply connection pragmas.
///
/// A file path creates the file if needed; [`IN_MEMORY_URL`] opens a
/// throwaway database.
pub fn connect(database_url: &str) -> DatabaseResult<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

    conn.batch_execute(
        "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
    )
    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

    tracing::debug!(database_url, "Opened SQLite connection");
    Ok(conn)
}

/// Run pending migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> DatabaseResult<()> {
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;

    if !applied.is_empty() {
        tracing::info!(count = applied.len(), "Applied database migrations");
    }
    Ok(())
}
