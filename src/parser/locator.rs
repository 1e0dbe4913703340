//! The structured project locator produced by reference parsing.

use std::fmt;

/// Identifies a remote repository subtree.
///
/// `branch` defaults to the repository's default branch when absent (the
/// server resolves it). `path` narrows the walk to a subdirectory.
/// Constructed once per operation from user input and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocator {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name, without any `.git` suffix.
    pub repo: String,
    /// Branch or tag; None lets the server use the default branch.
    pub branch: Option<String>,
    /// Root path of the subtree to walk; None means the repository root.
    pub path: Option<String>,
}

impl ProjectLocator {
    /// Creates a locator for the repository root on the default branch.
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: None,
            path: None,
        }
    }

    /// Returns the `owner/repo` composite used as the cache key.
    #[must_use]
    pub fn repo_id(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Returns the root path of the walk, defaulting to the repository root.
    #[must_use]
    pub fn root_path(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }
}

impl fmt::Display for ProjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{branch}")?;
        }
        if let Some(path) = &self.path {
            write!(f, ":{path}")?;
        }
        Ok(())
    }
}
