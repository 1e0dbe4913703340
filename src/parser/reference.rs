//! Parsing of project references into [`ProjectLocator`] values.

use tracing::{debug, instrument};
use url::Url;

use super::error::{MAX_REFERENCE_LENGTH, ParseError};
use super::locator::ProjectLocator;

/// Parses a project reference string into a [`ProjectLocator`].
///
/// Recognized forms, tried in order:
/// 1. GitHub REST API URLs containing `api.github.com/repos/{owner}/{repo}`
/// 2. GitHub web URLs `github.com/{owner}/{repo}[/tree/{branch}][/{path}]`
/// 3. Bare shorthand `owner/repo[/path...]`
///
/// The `.git` suffix is stripped from repository names. A reference matching
/// no pattern yields a structured [`ParseError`], never a panic.
///
/// # Errors
///
/// Returns [`ParseError::InvalidReference`] for unrecognized or malformed
/// input and [`ParseError::ReferenceTooLong`] for oversized input.
#[instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_reference(input: &str) -> Result<ProjectLocator, ParseError> {
    let reference = input.trim();

    if reference.is_empty() {
        return Err(ParseError::malformed(reference, "reference is empty"));
    }
    if reference.len() > MAX_REFERENCE_LENGTH {
        return Err(ParseError::too_long(reference));
    }

    let locator = if reference.contains("api.github.com") {
        parse_api_url(reference)?
    } else if reference.contains("github.com") {
        parse_web_url(reference)?
    } else {
        parse_shorthand(reference)?
    };

    debug!(locator = %locator, "parsed project reference");
    Ok(locator)
}

/// Parses a REST API URL of the form
/// `https://api.github.com/repos/{owner}/{repo}[/contents/{path}][?ref={branch}]`.
fn parse_api_url(reference: &str) -> Result<ProjectLocator, ParseError> {
    let url = parse_as_url(reference)?;
    let segments = path_segments(&url);

    let repos_pos = segments
        .iter()
        .position(|s| *s == "repos")
        .ok_or_else(|| ParseError::malformed(reference, "API URL has no /repos/ path"))?;

    let owner = *segments
        .get(repos_pos + 1)
        .ok_or_else(|| ParseError::empty_segment(reference))?;
    let repo = *segments
        .get(repos_pos + 2)
        .ok_or_else(|| ParseError::empty_segment(reference))?;

    // A trailing /contents/{path} narrows the walk root
    let path = match segments.get(repos_pos + 3) {
        Some(&"contents") => join_nonempty(&segments[repos_pos + 4..]),
        _ => None,
    };

    let branch = url
        .query_pairs()
        .find(|(key, _)| key == "ref")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    build_locator(reference, owner, repo, branch, path)
}

/// Parses a web URL of the form
/// `https://github.com/{owner}/{repo}[/tree/{branch}][/{path...}]`.
fn parse_web_url(reference: &str) -> Result<ProjectLocator, ParseError> {
    let url = parse_as_url(reference)?;
    let segments = path_segments(&url);

    let &[owner, repo, ref rest @ ..] = segments.as_slice() else {
        return Err(ParseError::malformed(
            reference,
            "URL has no owner/repository path",
        ));
    };

    let (branch, path) = match rest {
        ["tree", branch, path @ ..] => (Some((*branch).to_string()), join_nonempty(path)),
        [] => (None, None),
        path => (None, join_nonempty(path)),
    };

    build_locator(reference, owner, repo, branch, path)
}

/// Parses bare `owner/repo[/path...]` shorthand.
fn parse_shorthand(reference: &str) -> Result<ProjectLocator, ParseError> {
    if reference.chars().any(char::is_whitespace) {
        return Err(ParseError::unrecognized(reference));
    }
    if reference.starts_with('/') {
        return Err(ParseError::empty_segment(reference));
    }

    let segments: Vec<&str> = reference.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ParseError::empty_segment(reference));
    }

    let &[owner, repo, ref path @ ..] = segments.as_slice() else {
        return Err(ParseError::unrecognized(reference));
    };

    build_locator(reference, owner, repo, None, join_nonempty(path))
}

/// Parses the reference with the `url` crate, tolerating a missing scheme.
fn parse_as_url(reference: &str) -> Result<Url, ParseError> {
    let candidate = if reference.contains("://") {
        reference.to_string()
    } else {
        format!("https://{reference}")
    };

    Url::parse(&candidate).map_err(|e| ParseError::malformed(reference, &e.to_string()))
}

/// Returns the non-empty path segments of a URL.
fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Joins remaining segments into a subtree path, or None when empty.
fn join_nonempty(segments: &[&str]) -> Option<String> {
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Validates owner/repo segments and assembles the locator.
fn build_locator(
    reference: &str,
    owner: &str,
    repo: &str,
    branch: Option<String>,
    path: Option<String>,
) -> Result<ProjectLocator, ParseError> {
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if owner.is_empty() || repo.is_empty() {
        return Err(ParseError::empty_segment(reference));
    }

    Ok(ProjectLocator {
        owner: owner.to_string(),
        repo: repo.to_string(),
        branch,
        path,
    })
}
