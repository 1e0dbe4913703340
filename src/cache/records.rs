//! Cache record types and progress status definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a repository download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Fetch loop is running.
    Downloading,
    /// All files fetched and the repository was cached.
    Completed,
    /// The pipeline aborted on a fatal error.
    Failed,
}

impl ProgressStatus {
    /// Returns the database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "downloading" => Ok(Self::Downloading),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid progress status: {s}")),
        }
    }
}

/// Local user identity row.
///
/// `access_token` is stored so repeated downloads reuse the same credential
/// without re-prompting.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Account login, unique across rows.
    pub login: String,
    /// Display name when known.
    pub name: Option<String>,
    /// Avatar image URL when known.
    pub avatar_url: Option<String>,
    /// API token associated with this user.
    pub access_token: Option<String>,
}

/// One downloaded repository, keyed by `owner/repo`.
#[derive(Debug, Clone, FromRow)]
pub struct CachedRepo {
    /// Cache key in `owner/repo` form.
    pub id: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Display name (the repository name).
    pub name: String,
    /// Repository description when set.
    pub description: Option<String>,
    /// Full `owner/repo` name as reported by the API.
    pub full_name: String,
    /// When the download completed.
    pub downloaded_at: String,
}

/// One Markdown file's full text, keyed by `(repo_id, ord)`.
#[derive(Debug, Clone, FromRow)]
pub struct CachedChapter {
    /// Content hash identifying this chapter's text.
    pub id: String,
    /// Owning repository cache key.
    pub repo_id: String,
    /// Chapter title.
    pub title: String,
    /// Full Markdown text.
    pub content: String,
    /// Character length of `content`.
    pub content_size: i64,
    /// Source-relative path of the file.
    pub path: String,
    /// Zero-based position in the sorted chapter list.
    pub ord: i64,
}

/// One reading page, keyed by `(repo_id, ord)` with `ord` being the
/// book-wide flat reading sequence.
#[derive(Debug, Clone, FromRow)]
pub struct CachedPage {
    /// Owning repository cache key.
    pub repo_id: String,
    /// Index of the owning chapter.
    pub chapter_index: i64,
    /// Position within the owning chapter.
    pub page_index: i64,
    /// Title inherited from the owning chapter.
    pub title: String,
    /// The page's slice of chapter text.
    pub content: String,
    /// Newline-collapsed preview.
    pub content_preview: String,
    /// Character length of `content`.
    pub content_length: i64,
    /// Book-wide flat reading position.
    pub ord: i64,
}

/// Per-repository download progress, overwritten in place.
#[derive(Debug, Clone, FromRow)]
pub struct DownloadProgress {
    /// Owning repository cache key.
    pub repo_id: String,
    /// Files fetched so far.
    pub current: i64,
    /// Total files to fetch.
    pub total: i64,
    /// Current lifecycle status (stored as text, parsed via `status()`).
    #[sqlx(rename = "status")]
    pub status_str: String,
    /// Error message when the download failed.
    pub error: Option<String>,
}

impl DownloadProgress {
    /// Builds an in-flight progress record.
    #[must_use]
    pub fn downloading(repo_id: impl Into<String>, current: i64, total: i64) -> Self {
        Self {
            repo_id: repo_id.into(),
            current,
            total,
            status_str: ProgressStatus::Downloading.as_str().to_string(),
            error: None,
        }
    }

    /// Builds a terminal completed record.
    #[must_use]
    pub fn completed(repo_id: impl Into<String>, total: i64) -> Self {
        Self {
            repo_id: repo_id.into(),
            current: total,
            total,
            status_str: ProgressStatus::Completed.as_str().to_string(),
            error: None,
        }
    }

    /// Builds a terminal failed record carrying the error message.
    #[must_use]
    pub fn failed(repo_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            current: 0,
            total: 0,
            status_str: ProgressStatus::Failed.as_str().to_string(),
            error: Some(error.into()),
        }
    }

    /// Returns the parsed status enum.
    ///
    /// Falls back to `Downloading` if the status string is invalid.
    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        self.status_str.parse().unwrap_or(ProgressStatus::Downloading)
    }
}
