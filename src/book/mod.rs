//! Book, chapter, and page types plus the reading paginator.
//!
//! A [`Book`] is the in-memory aggregate a completed download returns: one
//! [`Chapter`] per source Markdown file (in stable tree order) and one flat
//! [`Page`] sequence spanning all chapters, the unit of reading-pagination.

mod paginator;

use std::sync::LazyLock;

use regex::Regex;

pub use paginator::{PAGE_CHAR_BUDGET, PREVIEW_CHAR_LIMIT, paginate_book, paginate_chapter};

/// Matches the first level-1 ATX heading, e.g. `# Getting Started`.
#[allow(clippy::expect_used)]
static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#\s+(.+)$").expect("heading regex is valid")
});

/// The full text of one source Markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Content hash (git blob sha, or a computed hash for placeholders).
    pub id: String,
    /// Derived from the first level-1 heading, else the filename stem.
    pub title: String,
    /// Full Markdown text.
    pub content: String,
    /// Source-relative path of the file.
    pub path: String,
    /// Zero-based position in the sorted file list.
    pub order: usize,
}

/// A bounded-size slice of a chapter's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Index of the owning chapter within the book.
    pub chapter_index: usize,
    /// Position within the owning chapter.
    pub page_index: usize,
    /// Title inherited from the owning chapter.
    pub title: String,
    /// The page's slice of chapter text.
    pub content: String,
    /// Newline-collapsed preview, at most 200 chars plus ellipsis.
    pub content_preview: String,
    /// Character length of `content`.
    pub content_length: usize,
    /// Book-wide flat reading position, strictly increasing across chapters.
    pub order: usize,
}

/// The in-memory aggregate returned by a completed download.
#[derive(Debug, Clone)]
pub struct Book {
    /// Repository name.
    pub title: String,
    /// Repository description, when set.
    pub description: Option<String>,
    /// Repository owner.
    pub owner: String,
    /// Repository name (cache key component).
    pub repo: String,
    /// Chapters in stable tree order.
    pub chapters: Vec<Chapter>,
    /// Flat page sequence spanning all chapters.
    pub pages: Vec<Page>,
    /// Convenience count of `chapters`.
    pub total_chapters: usize,
}

/// Extracts a chapter title from the first level-1 heading, if any.
///
/// Callers fall back to the filename stem when no heading exists.
#[must_use]
pub fn extract_title(content: &str) -> Option<String> {
    HEADING_PATTERN
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}
