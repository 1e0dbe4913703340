//! SQLite pool behind the library.
//!
//! A [`Database`] is a cheap-to-clone handle over one connection pool.
//! Opening a file-backed database switches the journal to WAL and applies
//! any pending migrations before the handle is handed out, so every caller
//! sees the current schema.
//!
//! # Example
//!
//! ```no_run
//! use repobook_core::Database;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(Path::new("library.db")).await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::instrument;

/// Pool size. SQLite serializes writers regardless, so a handful of
/// connections covers concurrent readers without lock churn.
const MAX_CONNECTIONS: u32 = 5;

/// How long a connection waits on a locked database before surfacing
/// `SQLITE_BUSY` to the caller.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Errors raised while opening or migrating the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// The connection could not be established.
    #[error("failed to open database: {0}")]
    Connection(#[from] sqlx::Error),

    /// A schema migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Handle over the SQLite connection pool.
///
/// Cloning shares the pool. [`Library`](crate::cache::Library) holds one of
/// these and issues every query through it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database file at `db_path`, creating it if needed.
    ///
    /// The journal is switched to WAL so readers are not blocked while a
    /// download writes chapters, the busy timeout is raised from SQLite's
    /// zero default, and pending migrations run before the handle is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the pool cannot be opened or a
    /// pragma fails, [`DbError::Migration`] if a migration fails.
    #[instrument(skip(db_path), fields(path = %db_path.display()))]
    pub async fn new(db_path: &Path) -> Result<Self, DbError> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(&db_url)
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query(&format!("PRAGMA busy_timeout={BUSY_TIMEOUT_MS}"))
            .execute(&pool)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Opens a migrated in-memory database for tests.
    ///
    /// Limited to a single connection: every new connection to
    /// `sqlite::memory:` sees its own empty database, so a wider pool would
    /// scatter writes across disjoint stores. WAL is pointless without a
    /// file and is not enabled.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the pool cannot be opened,
    /// [`DbError::Migration`] if a migration fails.
    #[instrument]
    pub async fn new_in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// The underlying pool, for issuing queries.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every pooled connection. The handle is unusable afterward.
    #[instrument(skip(self))]
    pub async fn close(self) {
        self.pool.close().await;
    }
}
