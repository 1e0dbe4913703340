//! Store seam for library persistence operations.
//!
//! This trait keeps the [`Library`] API intact while allowing the download
//! orchestrator to depend on an abstract data access boundary instead of a
//! concrete database handle.

use async_trait::async_trait;

use super::{CachedChapter, CachedPage, CachedRepo, DownloadProgress, Library, Result};

/// Data-access contract for the download pipeline's persistence needs.
#[async_trait]
pub trait LibraryStore {
    /// Removes every trace of a repository ahead of a fresh download, or
    /// when aborting one.
    async fn purge_repo(&self, repo_id: &str) -> Result<()>;

    /// Inserts or replaces a repository record.
    async fn save_repo(&self, repo: &CachedRepo) -> Result<()>;

    /// Inserts or replaces one chapter row.
    async fn save_chapter(&self, chapter: &CachedChapter) -> Result<()>;

    /// Replaces a repository's full page set.
    async fn save_pages(&self, repo_id: &str, pages: &[CachedPage]) -> Result<()>;

    /// Inserts or replaces the progress record for a repository.
    async fn upsert_progress(&self, progress: &DownloadProgress) -> Result<()>;
}

#[async_trait]
impl LibraryStore for Library {
    async fn purge_repo(&self, repo_id: &str) -> Result<()> {
        Library::purge_repo(self, repo_id).await.map(|_| ())
    }

    async fn save_repo(&self, repo: &CachedRepo) -> Result<()> {
        Library::save_repo(self, repo).await
    }

    async fn save_chapter(&self, chapter: &CachedChapter) -> Result<()> {
        Library::save_chapter(self, chapter).await
    }

    async fn save_pages(&self, repo_id: &str, pages: &[CachedPage]) -> Result<()> {
        Library::save_pages(self, repo_id, pages).await
    }

    async fn upsert_progress(&self, progress: &DownloadProgress) -> Result<()> {
        Library::upsert_progress(self, progress).await
    }
}
