//! Cache module for offline book persistence.
//!
//! This module provides the `SQLite`-backed library that stores downloaded
//! repositories, their chapters, the paginated reading units, and per-repo
//! download progress.
//!
//! # Overview
//!
//! The cache system consists of:
//! - [`Library`] - Main interface for library operations
//! - [`CachedRepo`] / [`CachedChapter`] / [`CachedPage`] - Persisted records
//! - [`DownloadProgress`] / [`ProgressStatus`] - Download lifecycle tracking
//! - [`User`] - Local user identity
//! - [`CacheError`] - Operation error types
//!
//! # Example
//!
//! ```ignore
//! use repobook_core::cache::Library;
//! use repobook_core::Database;
//! use std::path::Path;
//!
//! let db = Database::new(Path::new("library.db")).await?;
//! let library = Library::new(db);
//!
//! for repo in library.list_repos().await? {
//!     println!("{} ({} chapters)", repo.full_name, library.count_chapters(&repo.id).await?);
//! }
//! ```

mod error;
mod records;
mod repository;

pub use error::{CacheDbErrorKind, CacheError};
pub use records::{CachedChapter, CachedPage, CachedRepo, DownloadProgress, ProgressStatus, User};
pub use repository::LibraryStore;

use sqlx::Row;
use tracing::instrument;

use crate::db::Database;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Returns `Ok(())` if at least one row was affected; otherwise [`CacheError::RepoNotFound`].
fn check_affected(repo_id: &str, rows_affected: u64) -> Result<()> {
    if rows_affected == 0 {
        Err(CacheError::repo_not_found(repo_id))
    } else {
        Ok(())
    }
}

/// Library manager for downloaded books.
///
/// Provides atomic operations over the cached repository records backed by
/// `SQLite` with WAL mode for concurrent access. All writes use upsert
/// semantics so re-downloading a repository overwrites in place.
#[derive(Debug, Clone)]
pub struct Library {
    db: Database,
}

impl Library {
    /// Creates a new library manager with the given database connection.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ---- repositories ----

    /// Inserts or replaces a repository record.
    ///
    /// `downloaded_at` is always refreshed to the current time, so a
    /// re-download moves the repository to the top of the recency order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the write fails.
    #[instrument(skip(self, repo), fields(repo_id = %repo.id))]
    pub async fn save_repo(&self, repo: &CachedRepo) -> Result<()> {
        sqlx::query(
            r"INSERT OR REPLACE INTO cached_repos
                (id, owner, repo, name, description, full_name, downloaded_at)
              VALUES (?, ?, ?, ?, ?, ?, datetime('now'))",
        )
        .bind(&repo.id)
        .bind(&repo.owner)
        .bind(&repo.repo)
        .bind(&repo.name)
        .bind(&repo.description)
        .bind(&repo.full_name)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Gets a repository record by cache key.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_repo(&self, repo_id: &str) -> Result<Option<CachedRepo>> {
        let repo = sqlx::query_as::<_, CachedRepo>(r"SELECT * FROM cached_repos WHERE id = ?")
            .bind(repo_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(repo)
    }

    /// Lists all cached repositories, most recently downloaded first.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_repos(&self) -> Result<Vec<CachedRepo>> {
        let repos = sqlx::query_as::<_, CachedRepo>(
            r"SELECT * FROM cached_repos ORDER BY downloaded_at DESC, id ASC",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(repos)
    }

    /// Deletes a repository and everything belonging to it: chapters,
    /// pages, and progress.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::RepoNotFound`] if no repository exists under
    /// the given key. Returns [`CacheError::Database`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_repo(&self, repo_id: &str) -> Result<()> {
        let removed = self.purge_repo(repo_id).await?;
        check_affected(repo_id, removed)
    }

    /// Removes every trace of a repository in one transaction: its record,
    /// chapters, pages, and progress row.
    ///
    /// Unlike [`Library::delete_repo`], a repository that was never cached
    /// is not an error. The download pipeline calls this before a fresh run
    /// and when aborting one, where no rows may exist yet.
    ///
    /// # Returns
    ///
    /// The number of repository records removed (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn purge_repo(&self, repo_id: &str) -> Result<u64> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(r"DELETE FROM cached_repos WHERE id = ?")
            .bind(repo_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r"DELETE FROM cached_chapters WHERE repo_id = ?")
            .bind(repo_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r"DELETE FROM cached_pages WHERE repo_id = ?")
            .bind(repo_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r"DELETE FROM download_progress WHERE repo_id = ?")
            .bind(repo_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Empties every table: repositories, chapters, pages, progress, and
    /// users. This is the logout path; nothing survives it.
    ///
    /// # Returns
    ///
    /// The number of repositories that were removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<u64> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(r"DELETE FROM cached_repos").execute(&mut *tx).await?;
        sqlx::query(r"DELETE FROM cached_chapters").execute(&mut *tx).await?;
        sqlx::query(r"DELETE FROM cached_pages").execute(&mut *tx).await?;
        sqlx::query(r"DELETE FROM download_progress").execute(&mut *tx).await?;
        sqlx::query(r"DELETE FROM users").execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    // ---- chapters ----

    /// Inserts or replaces one chapter row.
    ///
    /// Called once per fetched file during a download, so a crash mid-way
    /// leaves earlier chapters already persisted.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the write fails.
    #[instrument(skip(self, chapter), fields(repo_id = %chapter.repo_id, path = %chapter.path))]
    pub async fn save_chapter(&self, chapter: &CachedChapter) -> Result<()> {
        sqlx::query(
            r"INSERT OR REPLACE INTO cached_chapters
                (id, repo_id, title, content, content_size, path, ord)
              VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&chapter.id)
        .bind(&chapter.repo_id)
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(chapter.content_size)
        .bind(&chapter.path)
        .bind(chapter.ord)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Returns a repository's chapters in reading order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_chapters(&self, repo_id: &str) -> Result<Vec<CachedChapter>> {
        let chapters = sqlx::query_as::<_, CachedChapter>(
            r"SELECT * FROM cached_chapters WHERE repo_id = ? ORDER BY ord ASC",
        )
        .bind(repo_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(chapters)
    }

    /// Counts a repository's chapters.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count_chapters(&self, repo_id: &str) -> Result<i64> {
        let result =
            sqlx::query(r"SELECT COUNT(*) as count FROM cached_chapters WHERE repo_id = ?")
                .bind(repo_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(result.get("count"))
    }

    // ---- pages ----

    /// Replaces a repository's full page set in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the write fails.
    #[instrument(skip(self, pages), fields(count = pages.len()))]
    pub async fn save_pages(&self, repo_id: &str, pages: &[CachedPage]) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(r"DELETE FROM cached_pages WHERE repo_id = ?")
            .bind(repo_id)
            .execute(&mut *tx)
            .await?;

        for page in pages {
            sqlx::query(
                r"INSERT INTO cached_pages
                    (repo_id, chapter_index, page_index, title, content,
                     content_preview, content_length, ord)
                  VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(repo_id)
            .bind(page.chapter_index)
            .bind(page.page_index)
            .bind(&page.title)
            .bind(&page.content)
            .bind(&page.content_preview)
            .bind(page.content_length)
            .bind(page.ord)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Returns a repository's pages in flat reading order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_pages(&self, repo_id: &str) -> Result<Vec<CachedPage>> {
        let pages = sqlx::query_as::<_, CachedPage>(
            r"SELECT * FROM cached_pages WHERE repo_id = ? ORDER BY ord ASC",
        )
        .bind(repo_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(pages)
    }

    // ---- progress ----

    /// Inserts or replaces the progress record for a repository.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the write fails.
    #[instrument(skip(self, progress), fields(repo_id = %progress.repo_id, status = %progress.status_str))]
    pub async fn upsert_progress(&self, progress: &DownloadProgress) -> Result<()> {
        sqlx::query(
            r"INSERT OR REPLACE INTO download_progress
                (repo_id, current, total, status, error)
              VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&progress.repo_id)
        .bind(progress.current)
        .bind(progress.total)
        .bind(&progress.status_str)
        .bind(&progress.error)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Gets the progress record for a repository.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_progress(&self, repo_id: &str) -> Result<Option<DownloadProgress>> {
        let progress =
            sqlx::query_as::<_, DownloadProgress>(r"SELECT * FROM download_progress WHERE repo_id = ?")
                .bind(repo_id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(progress)
    }

    // ---- users ----

    /// Inserts or updates a user by login.
    ///
    /// # Returns
    ///
    /// The ID of the user row.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the write fails.
    #[instrument(skip(self, access_token), fields(login = %login))]
    pub async fn upsert_user(
        &self,
        login: &str,
        name: Option<&str>,
        avatar_url: Option<&str>,
        access_token: Option<&str>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r"INSERT INTO users (login, name, avatar_url, access_token)
              VALUES (?, ?, ?, ?)
              ON CONFLICT(login) DO UPDATE SET
                name = excluded.name,
                avatar_url = excluded.avatar_url,
                access_token = excluded.access_token
              RETURNING id",
        )
        .bind(login)
        .bind(name)
        .bind(avatar_url)
        .bind(access_token)
        .fetch_one(self.db.pool())
        .await?;

        Ok(result.get("id"))
    }

    /// Gets a user by login.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_user(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r"SELECT * FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(user)
    }
}
