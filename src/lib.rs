//! Repobook Core Library
//!
//! This library turns a GitHub repository's Markdown tree into an
//! offline-readable book: it walks the repository contents, fetches each
//! Markdown file, paginates the text into fixed-size reading units, and
//! persists everything to a local SQLite library.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`db`] - Database connection and schema management
//! - [`parser`] - Project reference parsing (URLs and `owner/repo` shorthand)
//! - [`github`] - GitHub API client and Markdown tree walker
//! - [`book`] - Book/chapter/page types and the paginator
//! - [`cache`] - Offline library persistence
//! - [`download`] - The end-to-end download orchestrator

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod book;
pub mod cache;
pub mod db;
pub mod download;
pub mod github;
pub mod parser;

// Re-export commonly used types
pub use book::{Book, Chapter, PAGE_CHAR_BUDGET, Page, extract_title, paginate_book};
pub use cache::{
    CacheError, CachedChapter, CachedPage, CachedRepo, DownloadProgress, Library, LibraryStore,
    ProgressStatus, User,
};
pub use db::Database;
pub use download::{BookDownloader, DownloadError, ProgressFn};
pub use github::{GithubClient, GithubError, RemoteEntry, RepoInfo, walk_markdown_tree};
pub use parser::{ParseError, ProjectLocator, parse_reference};
