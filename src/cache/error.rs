//! Error types for cache operations.

use std::fmt;

use thiserror::Error;

/// Structured classification for cache/database failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDbErrorKind {
    /// `SQLite` returned busy/locked under concurrent access.
    BusyOrLocked,
    /// Constraint failure (unique/foreign-key/check/not-null).
    ConstraintViolation,
    /// Expected row was not found.
    RowNotFound,
    /// Filesystem or transport IO failure.
    Io,
    /// Unclassified database failure.
    Other,
}

impl CacheDbErrorKind {
    #[must_use]
    pub fn from_sqlx(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::RowNotFound,
            sqlx::Error::Io(_) => Self::Io,
            sqlx::Error::Database(database_error) => {
                classify_database_error(database_error.as_ref())
            }
            _ => Self::Other,
        }
    }
}

impl fmt::Display for CacheDbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BusyOrLocked => "busy_or_locked",
            Self::ConstraintViolation => "constraint_violation",
            Self::RowNotFound => "row_not_found",
            Self::Io => "io",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

fn classify_database_error(
    database_error: &(dyn sqlx::error::DatabaseError + 'static),
) -> CacheDbErrorKind {
    let code = database_error.code();
    if matches!(
        code.as_deref(),
        Some("SQLITE_BUSY" | "SQLITE_LOCKED" | "5" | "6")
    ) {
        return CacheDbErrorKind::BusyOrLocked;
    }

    if database_error.is_unique_violation()
        || database_error.is_foreign_key_violation()
        || database_error.is_check_violation()
        || code
            .as_deref()
            .is_some_and(|value| value.starts_with("SQLITE_CONSTRAINT"))
    {
        return CacheDbErrorKind::ConstraintViolation;
    }

    let message = database_error.message().to_ascii_lowercase();
    if message.contains("database is locked") || message.contains("database is busy") {
        return CacheDbErrorKind::BusyOrLocked;
    }

    CacheDbErrorKind::Other
}

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Database operation failed.
    #[error("database error ({kind}): {message}")]
    Database {
        /// Typed classification used for failure handling.
        kind: CacheDbErrorKind,
        /// Human-readable database error text.
        message: String,
    },

    /// No cached repository exists under the given key.
    #[error(
        "repository not cached: '{repo_id}'\n  Suggestion: Download it first, or check the owner/repo spelling"
    )]
    RepoNotFound {
        /// The `owner/repo` cache key.
        repo_id: String,
    },
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            kind: CacheDbErrorKind::from_sqlx(&err),
            message: err.to_string(),
        }
    }
}

impl CacheError {
    /// Creates a `RepoNotFound` error for the given cache key.
    #[must_use]
    pub fn repo_not_found(repo_id: impl Into<String>) -> Self {
        Self::RepoNotFound {
            repo_id: repo_id.into(),
        }
    }

    /// Returns the typed database error kind, when this is a database error.
    #[must_use]
    pub fn database_kind(&self) -> Option<CacheDbErrorKind> {
        match self {
            Self::Database { kind, .. } => Some(*kind),
            Self::RepoNotFound { .. } => None,
        }
    }
}
