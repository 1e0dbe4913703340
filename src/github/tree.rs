//! Recursive enumeration of Markdown files under a project subtree.

use tracing::{debug, instrument};

use super::client::{DirectoryLister, RemoteEntry, RemoteEntryKind};
use super::error::GithubError;
use crate::parser::ProjectLocator;

/// Maximum directory descent depth.
///
/// Repository trees are finite and shallow in practice; the cap guards
/// against pathological listings.
pub const MAX_TREE_DEPTH: usize = 32;

/// Markdown file suffix used for chapter discovery.
const MARKDOWN_SUFFIX: &str = ".md";

/// Enumerates every Markdown file under the locator's root path.
///
/// Descends depth-first with an explicit work stack: files whose name ends
/// in `.md` accumulate, directories are pushed for descent, and every other
/// entry kind is silently skipped. The result is sorted by path with
/// locale-independent byte-wise comparison, so chapter order is stable and
/// reproducible regardless of server listing order.
///
/// An empty result is a valid terminal state; the caller decides whether
/// zero files is fatal.
///
/// # Errors
///
/// Returns [`GithubError::DepthExceeded`] when descent passes
/// [`MAX_TREE_DEPTH`], or any listing error from the underlying client.
/// Listing errors are fatal to the walk; there is no partial result.
#[instrument(skip(lister), fields(repo = %locator.repo_id(), root = %locator.root_path()))]
pub async fn walk_markdown_tree<L: DirectoryLister + ?Sized>(
    lister: &L,
    locator: &ProjectLocator,
) -> Result<Vec<RemoteEntry>, GithubError> {
    let mut files = Vec::new();
    let mut stack = vec![(locator.root_path().to_string(), 0usize)];

    while let Some((path, depth)) = stack.pop() {
        if depth > MAX_TREE_DEPTH {
            return Err(GithubError::depth_exceeded(path, MAX_TREE_DEPTH));
        }

        let entries = lister.list_directory(locator, &path).await?;
        for entry in entries {
            match entry.kind {
                RemoteEntryKind::File if entry.name.ends_with(MARKDOWN_SUFFIX) => {
                    files.push(entry);
                }
                RemoteEntryKind::Dir => {
                    stack.push((entry.path, depth + 1));
                }
                RemoteEntryKind::File | RemoteEntryKind::Other => {}
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(count = files.len(), "markdown tree walk complete");
    Ok(files)
}
