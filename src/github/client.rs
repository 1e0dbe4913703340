//! HTTP client for the GitHub contents and repository-metadata endpoints.
//!
//! The client is created once and reused; it holds a pooled
//! [`reqwest::Client`] and an optional bearer credential. Every response is
//! validated and mapped into typed structs before leaving this module.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use super::error::GithubError;
use super::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::parser::ProjectLocator;

/// Production API base URL.
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Accept header for JSON responses (directory listings, metadata).
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";

/// Accept header for raw file content.
///
/// Requesting the raw representation avoids the ~1 MB ceiling on
/// base64-wrapped JSON payloads from the contents endpoint.
const ACCEPT_RAW: &str = "application/vnd.github.raw";

/// User-Agent sent with every request; GitHub rejects anonymous agents.
const USER_AGENT: &str = concat!("repobook/", env!("CARGO_PKG_VERSION"));

/// One entry from a directory listing.
///
/// Transient: produced by [`GithubClient::list_directory`], consumed by the
/// tree walker, never persisted verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    /// Repository-relative path.
    pub path: String,
    /// File or directory name (last path component).
    pub name: String,
    /// Size in bytes (0 for directories).
    #[serde(default)]
    pub size: u64,
    /// Git blob/tree sha.
    pub sha: String,
    /// Direct download URL, when the entry is a file.
    #[serde(default)]
    pub download_url: Option<String>,
    /// Entry kind as reported by the server.
    #[serde(rename = "type")]
    pub kind: RemoteEntryKind,
}

/// Kind of a directory entry.
///
/// Anything that is neither a file nor a directory (symlinks, submodules)
/// is mapped to `Other` and skipped by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteEntryKind {
    /// Regular file.
    File,
    /// Directory to descend into.
    Dir,
    /// Symlink, submodule, or unknown kind.
    #[serde(other)]
    Other,
}

/// Repository metadata from `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    /// Repository name.
    pub name: String,
    /// Repository description, when set.
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical `owner/repo` name.
    pub full_name: String,
}

/// Seam for directory listing, so the tree walker can be tested without a
/// network. [`GithubClient`] is the production implementation.
#[async_trait]
pub trait DirectoryLister {
    /// Lists the entries at `path` within the locator's repository and ref.
    async fn list_directory(
        &self,
        locator: &ProjectLocator,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, GithubError>;
}

/// GitHub API client with optional bearer authentication.
///
/// Stateless per call; the only held state is the connection pool and the
/// credential. Unauthenticated clients work but hit stricter rate limits.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Creates a client against the public GitHub API.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// Creates a client against a custom API base URL.
    ///
    /// Used by tests (mock servers) and GitHub Enterprise installations.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Fetches repository metadata (name, description, canonical full name).
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] on network failure, non-success status, or a
    /// response that does not decode as repository metadata.
    #[instrument(skip(self), fields(repo = %locator.repo_id()))]
    pub async fn repo_info(&self, locator: &ProjectLocator) -> Result<RepoInfo, GithubError> {
        let url = format!(
            "{}/repos/{}/{}",
            self.base_url,
            encode_segment(&locator.owner),
            encode_segment(&locator.repo)
        );

        let text = self.get_checked(&url, ACCEPT_JSON).await?;
        serde_json::from_str(&text)
            .map_err(|e| GithubError::schema(&url, format!("repository metadata: {e}")))
    }

    /// Fetches the decoded text content of one file at the locator's ref.
    ///
    /// Requests the raw representation; if a JSON envelope arrives instead
    /// (wrong content negotiation by a proxy), its base64 payload is decoded
    /// as a fallback.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] on network failure, non-success status, or a
    /// payload that cannot be decoded to UTF-8 text.
    #[instrument(skip(self), fields(repo = %locator.repo_id(), path = %path))]
    pub async fn fetch_raw(
        &self,
        locator: &ProjectLocator,
        path: &str,
    ) -> Result<String, GithubError> {
        let url = self.contents_url(locator, path);
        let text = self.get_checked(&url, ACCEPT_RAW).await?;

        match decode_json_envelope(&url, &text)? {
            Some(decoded) => {
                debug!(url = %url, "decoded base64 envelope fallback");
                Ok(decoded)
            }
            None => Ok(text),
        }
    }

    /// Builds the contents-endpoint URL for a path under the locator's ref.
    fn contents_url(&self, locator: &ProjectLocator, path: &str) -> String {
        let mut url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            encode_segment(&locator.owner),
            encode_segment(&locator.repo),
            encode_path(path)
        );
        if let Some(branch) = &locator.branch {
            url.push_str("?ref=");
            url.push_str(&encode_segment(branch));
        }
        url
    }

    /// Issues a GET and returns the body text, classifying error responses.
    async fn get_checked(&self, url: &str, accept: &str) -> Result<String, GithubError> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| GithubError::network(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GithubError::network(url, e))?;

        if !status.is_success() {
            return Err(GithubError::classify_response(url, status.as_u16(), &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl DirectoryLister for GithubClient {
    /// Lists directory entries at `path`, in server order.
    ///
    /// A single-file response (JSON object) is normalized into a one-element
    /// vector for uniform handling.
    #[instrument(skip(self), fields(repo = %locator.repo_id(), path = %path))]
    async fn list_directory(
        &self,
        locator: &ProjectLocator,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, GithubError> {
        let url = self.contents_url(locator, path);
        let text = self.get_checked(&url, ACCEPT_JSON).await?;

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| GithubError::schema(&url, format!("expected JSON listing: {e}")))?;

        let entries = match value {
            Value::Array(_) => serde_json::from_value::<Vec<RemoteEntry>>(value)
                .map_err(|e| GithubError::schema(&url, format!("directory entry: {e}")))?,
            Value::Object(_) => vec![
                serde_json::from_value::<RemoteEntry>(value)
                    .map_err(|e| GithubError::schema(&url, format!("file entry: {e}")))?,
            ],
            _ => {
                return Err(GithubError::schema(
                    &url,
                    "expected a JSON array or object".to_string(),
                ));
            }
        };

        debug!(count = entries.len(), "listed directory");
        Ok(entries)
    }
}

/// Percent-encodes one path/query segment.
fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Percent-encodes a repository-relative path, preserving `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Decodes a JSON contents-envelope if `text` is one.
///
/// Returns `Ok(None)` when the body is already raw content. Only bodies that
/// parse as a JSON object with `"encoding": "base64"` and a string `content`
/// field are treated as envelopes.
fn decode_json_envelope(url: &str, text: &str) -> Result<Option<String>, GithubError> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return Ok(None);
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Ok(None);
    };
    if value.get("encoding").and_then(Value::as_str) != Some("base64") {
        return Ok(None);
    }
    let Some(content) = value.get("content").and_then(Value::as_str) else {
        return Ok(None);
    };

    // GitHub wraps base64 payloads with embedded newlines
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| GithubError::schema(url, format!("invalid base64 content: {e}")))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|_| GithubError::schema(url, "file content is not valid UTF-8".to_string()))?;

    Ok(Some(decoded))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_locator() -> ProjectLocator {
        ProjectLocator::new("acme", "docs")
    }

    // ==================== URL Construction ====================

    #[test]
    fn test_contents_url_root_path() {
        let client = GithubClient::with_base_url("https://api.github.com", None);
        let url = client.contents_url(&test_locator(), "");
        assert_eq!(url, "https://api.github.com/repos/acme/docs/contents/");
    }

    #[test]
    fn test_contents_url_with_branch() {
        let mut locator = test_locator();
        locator.branch = Some("canary".to_string());
        let client = GithubClient::with_base_url("https://api.github.com", None);
        let url = client.contents_url(&locator, "guide/intro.md");
        assert_eq!(
            url,
            "https://api.github.com/repos/acme/docs/contents/guide/intro.md?ref=canary"
        );
    }

    #[test]
    fn test_contents_url_encodes_special_chars() {
        let client = GithubClient::with_base_url("https://api.github.com", None);
        let url = client.contents_url(&test_locator(), "docs/with space.md");
        assert!(url.contains("with%20space.md"), "url: {url}");
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let client = GithubClient::with_base_url("http://localhost:8080/", None);
        let url = client.contents_url(&test_locator(), "README.md");
        assert!(
            url.starts_with("http://localhost:8080/repos/"),
            "url: {url}"
        );
    }

    // ==================== Envelope Fallback ====================

    #[test]
    fn test_decode_envelope_passes_raw_markdown_through() {
        let raw = "# Title\n\nBody text";
        let result = decode_json_envelope("http://x", raw).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_decode_envelope_decodes_base64_content() {
        // "# Hello" base64-encoded, with an embedded newline as GitHub emits
        let body = r#"{"encoding":"base64","content":"IyBIZWxs\nbw=="}"#;
        let result = decode_json_envelope("http://x", body).unwrap();
        assert_eq!(result.as_deref(), Some("# Hello"));
    }

    #[test]
    fn test_decode_envelope_ignores_json_without_encoding() {
        let body = r#"{"content":"not base64"}"#;
        let result = decode_json_envelope("http://x", body).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_decode_envelope_rejects_invalid_base64() {
        let body = r#"{"encoding":"base64","content":"%%%not-base64%%%"}"#;
        let result = decode_json_envelope("http://x", body);
        assert!(matches!(result, Err(GithubError::Schema { .. })));
    }

    #[test]
    fn test_decode_envelope_json_looking_markdown_passes_through() {
        // A Markdown file that happens to start with a brace but is not
        // valid JSON must come back untouched
        let raw = "{ this is not json\n\nbut markdown }";
        let result = decode_json_envelope("http://x", raw).unwrap();
        assert_eq!(result, None);
    }

    // ==================== DTO Decoding ====================

    #[test]
    fn test_remote_entry_decodes_file() {
        let json = r#"{
            "path": "guide/intro.md",
            "name": "intro.md",
            "size": 120,
            "sha": "abc123",
            "download_url": "https://raw.example/intro.md",
            "type": "file"
        }"#;
        let entry: RemoteEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, RemoteEntryKind::File);
        assert_eq!(entry.path, "guide/intro.md");
        assert_eq!(entry.size, 120);
    }

    #[test]
    fn test_remote_entry_decodes_dir_without_download_url() {
        let json = r#"{
            "path": "guide",
            "name": "guide",
            "size": 0,
            "sha": "def456",
            "download_url": null,
            "type": "dir"
        }"#;
        let entry: RemoteEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, RemoteEntryKind::Dir);
        assert_eq!(entry.download_url, None);
    }

    #[test]
    fn test_remote_entry_unknown_kind_maps_to_other() {
        let json = r#"{
            "path": "link",
            "name": "link",
            "sha": "fff",
            "type": "symlink"
        }"#;
        let entry: RemoteEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, RemoteEntryKind::Other);
    }

    #[test]
    fn test_repo_info_decodes_null_description() {
        let json = r#"{"name":"docs","description":null,"full_name":"acme/docs"}"#;
        let info: RepoInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.name, "docs");
        assert_eq!(info.description, None);
        assert_eq!(info.full_name, "acme/docs");
    }
}
