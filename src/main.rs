//! CLI entry point for the repobook tool.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use repobook_core::{BookDownloader, Database, GithubClient, Library};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let db = Database::new(&args.db).await?;
    let library = Library::new(db);

    if args.list {
        return list_repos(&library).await;
    }
    if let Some(repo_id) = &args.remove {
        library.delete_repo(repo_id).await?;
        println!("Removed '{repo_id}'");
        return Ok(());
    }
    if args.clear {
        let removed = library.clear_all().await?;
        println!("Removed {removed} cached repositories");
        return Ok(());
    }

    let Some(reference) = &args.reference else {
        // Unreachable: clap requires a reference unless a maintenance flag is set
        anyhow::bail!("no repository reference given");
    };

    if args.token.is_some() {
        info!("using GitHub API token");
    }

    let client = GithubClient::new(args.token.clone());

    let bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} {msg}",
        )?);
        bar
    };

    let bar_handle = bar.clone();
    let downloader =
        BookDownloader::new(client, library).with_progress(Box::new(move |fetched, total, path| {
            bar_handle.set_length(total as u64);
            bar_handle.set_position(fetched as u64);
            bar_handle.set_message(path.to_string());
        }));

    let book = downloader.download(reference).await?;
    bar.finish_and_clear();

    println!(
        "Downloaded '{}' ({} chapters, {} pages)",
        book.title,
        book.total_chapters,
        book.pages.len()
    );

    Ok(())
}

async fn list_repos(library: &Library) -> Result<()> {
    let repos = library.list_repos().await?;
    if repos.is_empty() {
        println!("No cached repositories");
        return Ok(());
    }

    for repo in repos {
        let chapters = library.count_chapters(&repo.id).await?;
        let description = repo.description.as_deref().unwrap_or("-");
        println!(
            "{}  {} chapters  downloaded {}  {}",
            repo.full_name, chapters, repo.downloaded_at, description
        );
    }

    Ok(())
}
