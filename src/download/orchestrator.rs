//! Download orchestrator: repository reference in, offline book out.
//!
//! This module provides the [`BookDownloader`] which runs the end-to-end
//! pipeline: parse the reference, purge stale cache rows, fetch repository
//! metadata, walk the Markdown tree, fetch each file, paginate, and persist
//! everything to the library.
//!
//! # Overview
//!
//! Files are fetched strictly sequentially in tree order. That is a
//! deliberate throttle against the API's rate limits, not an accident of
//! implementation; do not parallelize the fetch loop.
//!
//! # Example
//!
//! ```ignore
//! use repobook_core::{BookDownloader, Database, GithubClient, Library};
//!
//! let db = Database::new(Path::new("library.db")).await?;
//! let library = Library::new(db);
//! let client = GithubClient::new(None);
//! let downloader = BookDownloader::new(client, library);
//! let book = downloader.download("rust-lang/book").await?;
//! println!("{}: {} chapters", book.title, book.total_chapters);
//! ```

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use super::DownloadError;
use crate::book::{Book, Chapter, PAGE_CHAR_BUDGET, Page, extract_title, paginate_book};
use crate::cache::{CachedChapter, CachedPage, CachedRepo, DownloadProgress, LibraryStore};
use crate::github::{GithubClient, RemoteEntry, RepoInfo, walk_markdown_tree};
use crate::parser::{ProjectLocator, parse_reference};

/// Callback invoked after each file fetch with `(fetched, total, path)`.
///
/// `fetched` is strictly increasing from 1 to `total` over one download.
pub type ProgressFn = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// End-to-end download pipeline over a [`GithubClient`] and a library store.
pub struct BookDownloader<S: LibraryStore> {
    client: GithubClient,
    store: S,
    on_progress: Option<ProgressFn>,
}

impl<S: LibraryStore> BookDownloader<S> {
    /// Creates a downloader over the given client and store.
    #[must_use]
    pub fn new(client: GithubClient, store: S) -> Self {
        Self {
            client,
            store,
            on_progress: None,
        }
    }

    /// Attaches a progress callback, consumed by e.g. a CLI progress bar.
    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Downloads a repository's Markdown tree as an offline book.
    ///
    /// The pipeline: parse the reference; purge every previously cached row
    /// for the repository; fetch metadata and initialize progress; walk the tree
    /// (zero Markdown files is fatal); fetch each file sequentially, writing
    /// chapter rows through as they arrive; drop empty files (zero survivors
    /// is fatal); commit the repository row and mark progress completed;
    /// paginate and persist pages best-effort; return the [`Book`].
    ///
    /// A per-file fetch failure does not abort the download: the file
    /// becomes a placeholder chapter naming the path and error, so one bad
    /// file costs one degraded chapter. Progress-row writes are best-effort
    /// and never abort either.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Reference`] for unparseable references,
    /// [`DownloadError::Remote`] for metadata/listing failures,
    /// [`DownloadError::NoMarkdownContent`] / [`DownloadError::EmptyBook`]
    /// for content-less repositories, and [`DownloadError::ChapterWrite`] /
    /// [`DownloadError::Cache`] for library failures. On any fatal error
    /// after the reference parses, the progress row is marked `failed` with
    /// the error text.
    #[instrument(skip(self), fields(reference = %reference))]
    pub async fn download(&self, reference: &str) -> Result<Book, DownloadError> {
        let locator = parse_reference(reference)?;
        let repo_id = locator.repo_id();

        info!(repo_id = %repo_id, "starting book download");

        match self.run(&locator, &repo_id).await {
            Ok(book) => {
                info!(
                    repo_id = %repo_id,
                    chapters = book.total_chapters,
                    pages = book.pages.len(),
                    "book download complete"
                );
                Ok(book)
            }
            Err(err) => {
                self.write_progress(DownloadProgress::failed(&repo_id, err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    async fn run(&self, locator: &ProjectLocator, repo_id: &str) -> Result<Book, DownloadError> {
        // Fresh start: every trace of a prior run goes, repository record
        // and progress included, so a failure below never leaves a stale
        // listed repository with no readable content
        self.store.purge_repo(repo_id).await?;

        let info = self.client.repo_info(locator).await?;
        self.write_progress(DownloadProgress::downloading(repo_id, 0, 0))
            .await;

        let files = walk_markdown_tree(&self.client, locator).await?;
        if files.is_empty() {
            return Err(DownloadError::no_markdown_content(repo_id));
        }

        let total = files.len();
        self.write_progress(DownloadProgress::downloading(repo_id, 0, as_i64(total)))
            .await;

        let mut chapters: Vec<Chapter> = Vec::new();
        for (index, file) in files.iter().enumerate() {
            let content = match self.client.fetch_raw(locator, &file.path).await {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %file.path, error = %err, "file fetch failed, using placeholder");
                    placeholder_content(file, &err)
                }
            };

            if content.is_empty() {
                debug!(path = %file.path, "skipping empty file");
            } else {
                let chapter = build_chapter(file, content, chapters.len());
                let record = to_cached_chapter(repo_id, &chapter);
                self.store.save_chapter(&record).await.map_err(|source| {
                    DownloadError::chapter_write(&chapter.title, chapter.content.chars().count(), source)
                })?;
                chapters.push(chapter);
            }

            let fetched = index + 1;
            self.write_progress(DownloadProgress::downloading(
                repo_id,
                as_i64(fetched),
                as_i64(total),
            ))
            .await;
            if let Some(on_progress) = &self.on_progress {
                on_progress(fetched, total, &file.path);
            }
        }

        if chapters.is_empty() {
            // Drop the progress rows written during the loop; the caller
            // records the failure afterward
            self.store.purge_repo(repo_id).await?;
            return Err(DownloadError::empty_book(repo_id));
        }

        let repo_record = to_cached_repo(repo_id, locator, &info);
        self.store.save_repo(&repo_record).await?;
        self.write_progress(DownloadProgress::completed(repo_id, as_i64(total)))
            .await;

        let pages = paginate_book(&chapters, PAGE_CHAR_BUDGET);
        let page_records: Vec<CachedPage> = pages.iter().map(|p| to_cached_page(repo_id, p)).collect();
        if let Err(err) = self.store.save_pages(repo_id, &page_records).await {
            warn!(repo_id = %repo_id, error = %err, "failed to persist pages");
        }

        let total_chapters = chapters.len();
        Ok(Book {
            title: info.name,
            description: info.description,
            owner: locator.owner.clone(),
            repo: locator.repo.clone(),
            chapters,
            pages,
            total_chapters,
        })
    }

    /// Writes a progress row, logging instead of failing.
    ///
    /// Progress is advisory; its persistence never decides a download's fate.
    async fn write_progress(&self, progress: DownloadProgress) {
        if let Err(err) = self.store.upsert_progress(&progress).await {
            warn!(repo_id = %progress.repo_id, error = %err, "failed to write progress row");
        }
    }
}

/// Builds a chapter from a fetched file, deriving the title from the first
/// level-1 heading or the filename stem.
fn build_chapter(file: &RemoteEntry, content: String, order: usize) -> Chapter {
    let title = extract_title(&content).unwrap_or_else(|| file_stem(&file.name));
    let id = if file.sha.is_empty() {
        content_hash(&content)
    } else {
        file.sha.clone()
    };

    Chapter {
        id,
        title,
        content,
        path: file.path.clone(),
        order,
    }
}

/// Body for a chapter whose content could not be fetched.
fn placeholder_content(file: &RemoteEntry, error: &crate::github::GithubError) -> String {
    let title = file_stem(&file.name);
    format!("# {title}\n\n*Unable to load `{path}`: {error}*", path = file.path)
}

/// Filename without the Markdown suffix.
fn file_stem(name: &str) -> String {
    name.strip_suffix(".md").unwrap_or(name).to_string()
}

/// Hex SHA-256 of the content, for chapters without a usable remote sha.
fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{digest:x}")
}

fn to_cached_repo(repo_id: &str, locator: &ProjectLocator, info: &RepoInfo) -> CachedRepo {
    CachedRepo {
        id: repo_id.to_string(),
        owner: locator.owner.clone(),
        repo: locator.repo.clone(),
        name: info.name.clone(),
        description: info.description.clone(),
        full_name: info.full_name.clone(),
        downloaded_at: String::new(), // set by SQL on insert
    }
}

fn to_cached_chapter(repo_id: &str, chapter: &Chapter) -> CachedChapter {
    CachedChapter {
        id: chapter.id.clone(),
        repo_id: repo_id.to_string(),
        title: chapter.title.clone(),
        content: chapter.content.clone(),
        content_size: as_i64(chapter.content.chars().count()),
        path: chapter.path.clone(),
        ord: as_i64(chapter.order),
    }
}

fn to_cached_page(repo_id: &str, page: &Page) -> CachedPage {
    CachedPage {
        repo_id: repo_id.to_string(),
        chapter_index: as_i64(page.chapter_index),
        page_index: as_i64(page.page_index),
        title: page.title.clone(),
        content: page.content.clone(),
        content_preview: page.content_preview.clone(),
        content_length: as_i64(page.content_length),
        ord: as_i64(page.order),
    }
}

/// Saturating usize-to-i64 for SQL columns; counts never approach the bound.
fn as_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    // End-to-end pipeline coverage lives in tests/download_integration.rs;
    // these cover the pure chapter-building helpers

    use super::*;
    use crate::github::RemoteEntryKind;

    fn entry(path: &str, sha: &str) -> RemoteEntry {
        RemoteEntry {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap().to_string(),
            size: 0,
            sha: sha.to_string(),
            download_url: None,
            kind: RemoteEntryKind::File,
        }
    }

    #[test]
    fn test_build_chapter_uses_heading_title() {
        let file = entry("docs/intro.md", "abc");
        let chapter = build_chapter(&file, "# Welcome\n\nbody".to_string(), 0);
        assert_eq!(chapter.title, "Welcome");
        assert_eq!(chapter.id, "abc");
        assert_eq!(chapter.path, "docs/intro.md");
    }

    #[test]
    fn test_build_chapter_falls_back_to_file_stem() {
        let file = entry("docs/setup-guide.md", "abc");
        let chapter = build_chapter(&file, "no heading here".to_string(), 2);
        assert_eq!(chapter.title, "setup-guide");
        assert_eq!(chapter.order, 2);
    }

    #[test]
    fn test_build_chapter_hashes_content_without_sha() {
        let file = entry("a.md", "");
        let chapter = build_chapter(&file, "text".to_string(), 0);
        assert_eq!(chapter.id.len(), 64);
        assert!(chapter.id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_placeholder_content_names_path_and_error() {
        let file = entry("docs/broken.md", "abc");
        let err = crate::github::GithubError::not_found("https://api.example/broken");
        let content = placeholder_content(&file, &err);
        assert!(content.starts_with("# broken\n\n"), "content: {content}");
        assert!(content.contains("docs/broken.md"), "content: {content}");
        assert!(content.contains("not found"), "content: {content}");
        assert!(!content.is_empty());
    }

    #[test]
    fn test_file_stem_strips_markdown_suffix_only() {
        assert_eq!(file_stem("README.md"), "README");
        assert_eq!(file_stem("archive.tar"), "archive.tar");
    }
}
