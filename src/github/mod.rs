//! GitHub API client and Markdown tree walker.
//!
//! This module provides everything that talks to the remote side:
//!
//! - [`GithubClient`] - authenticated access to the GitHub contents and
//!   repository-metadata endpoints, with typed responses
//! - [`walk_markdown_tree`] - recursive enumeration of all Markdown files
//!   under a project subtree, in deterministic path order
//!
//! Raw untyped JSON never leaves this module; responses are validated and
//! mapped into [`RemoteEntry`] / [`RepoInfo`] at the boundary.

mod client;
mod error;
mod tree;

pub use client::{DirectoryLister, GithubClient, RemoteEntry, RemoteEntryKind, RepoInfo};
pub use error::GithubError;
pub use tree::{MAX_TREE_DEPTH, walk_markdown_tree};

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (2 minutes; Markdown files are small).
pub const READ_TIMEOUT_SECS: u64 = 120;
