//! Download module: the end-to-end book download pipeline.
//!
//! The pipeline turns a project reference into a persisted, paginated
//! offline book:
//! - [`BookDownloader`] - Orchestrates parse, walk, fetch, paginate, persist
//! - [`ProgressFn`] - Per-file progress callback
//! - [`DownloadError`] - Pipeline error types

mod error;
mod orchestrator;

pub use error::DownloadError;
pub use orchestrator::{BookDownloader, ProgressFn};
