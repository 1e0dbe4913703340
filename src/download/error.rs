//! Error types for the download pipeline.
//!
//! A download fails with exactly one descriptive error; there are no
//! automatic retries at this layer.

use thiserror::Error;

use crate::cache::CacheError;
use crate::github::GithubError;
use crate::parser::ParseError;

/// Errors that can occur while downloading a repository as a book.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The project reference could not be parsed.
    ///
    /// Raised before any remote or database work starts.
    #[error(transparent)]
    Reference(#[from] ParseError),

    /// A fatal remote failure: repository metadata or a directory listing
    /// could not be fetched. Per-file content failures are not fatal and
    /// never surface here.
    #[error(transparent)]
    Remote(#[from] GithubError),

    /// The walk finished but found no Markdown files.
    #[error(
        "no Markdown files found in '{repo_id}'\n  Suggestion: Check the path, or point at a repository that contains .md files"
    )]
    NoMarkdownContent {
        /// The `owner/repo` key that was walked.
        repo_id: String,
    },

    /// Every discovered Markdown file turned out to be empty.
    #[error("every Markdown file in '{repo_id}' was empty; nothing to read")]
    EmptyBook {
        /// The `owner/repo` key that was walked.
        repo_id: String,
    },

    /// A chapter row could not be written to the library.
    ///
    /// Fatal: the book on disk would otherwise have a gap.
    #[error("failed to persist chapter '{title}' ({content_size} chars): {source}")]
    ChapterWrite {
        /// Title of the chapter that failed to persist.
        title: String,
        /// Character length of the chapter content.
        content_size: usize,
        /// The underlying cache error.
        #[source]
        source: CacheError,
    },

    /// A non-chapter library operation failed (fresh-start delete, repo
    /// row upsert).
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl DownloadError {
    /// Creates a no-content error for the given cache key.
    #[must_use]
    pub fn no_markdown_content(repo_id: impl Into<String>) -> Self {
        Self::NoMarkdownContent {
            repo_id: repo_id.into(),
        }
    }

    /// Creates an empty-book error for the given cache key.
    #[must_use]
    pub fn empty_book(repo_id: impl Into<String>) -> Self {
        Self::EmptyBook {
            repo_id: repo_id.into(),
        }
    }

    /// Creates a chapter persistence error with chapter context.
    #[must_use]
    pub fn chapter_write(title: impl Into<String>, content_size: usize, source: CacheError) -> Self {
        Self::ChapterWrite {
            title: title.into(),
            content_size,
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markdown_content_message() {
        let err = DownloadError::no_markdown_content("acme/docs");
        let msg = err.to_string();
        assert!(msg.contains("acme/docs"), "msg: {msg}");
        assert!(msg.contains("Suggestion"), "msg: {msg}");
    }

    #[test]
    fn test_empty_book_message() {
        let err = DownloadError::empty_book("acme/docs");
        let msg = err.to_string();
        assert!(msg.contains("acme/docs"), "msg: {msg}");
        assert!(msg.contains("empty"), "msg: {msg}");
    }

    #[test]
    fn test_chapter_write_names_title_and_size() {
        let source = CacheError::Database {
            kind: crate::cache::CacheDbErrorKind::Io,
            message: "disk full".to_string(),
        };
        let err = DownloadError::chapter_write("Getting Started", 1234, source);
        let msg = err.to_string();
        assert!(msg.contains("Getting Started"), "msg: {msg}");
        assert!(msg.contains("1234"), "msg: {msg}");
    }

    #[test]
    fn test_reference_error_passes_through() {
        let parse_err = crate::parser::parse_reference("").unwrap_err();
        let err: DownloadError = parse_err.into();
        assert!(matches!(err, DownloadError::Reference(_)));
    }
}
