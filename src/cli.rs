//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Turn a GitHub repository's Markdown into an offline book.
///
/// Repobook walks a repository's Markdown tree, fetches every file, splits
/// the text into reading-sized pages, and stores the result in a local
/// SQLite library for offline reading.
#[derive(Parser, Debug)]
#[command(name = "repobook")]
#[command(author, version, about)]
pub struct Args {
    /// Repository to download: `owner/repo[/path]`, a github.com URL, or an
    /// api.github.com URL
    #[arg(value_name = "REFERENCE", required_unless_present_any = ["list", "remove", "clear"])]
    pub reference: Option<String>,

    /// GitHub API token (falls back to the GITHUB_TOKEN environment variable)
    #[arg(short = 't', long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Library database file
    #[arg(long, default_value = "repobook.db", value_name = "PATH")]
    pub db: PathBuf,

    /// List cached repositories instead of downloading
    #[arg(long, conflicts_with_all = ["reference", "remove", "clear"])]
    pub list: bool,

    /// Remove one cached repository by `owner/repo` key
    #[arg(long, value_name = "OWNER/REPO", conflicts_with_all = ["reference", "clear"])]
    pub remove: Option<String>,

    /// Remove every cached repository
    #[arg(long, conflicts_with = "reference")]
    pub clear: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
