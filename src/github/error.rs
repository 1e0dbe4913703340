//! Error types for GitHub API operations.
//!
//! Remote failures are classified at the response boundary so callers can
//! distinguish rate limiting from plain HTTP failures from schema mismatches
//! without inspecting status codes themselves.

use thiserror::Error;

/// Errors that can occur while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The API rejected the request due to rate limiting or missing auth.
    ///
    /// Detected by response-body inspection: GitHub returns a rate-limit
    /// message (JSON) or an HTML error page rather than the expected payload.
    #[error(
        "rate limited or unauthorized (HTTP {status}) requesting {url}\n  Suggestion: Provide a GitHub token to raise the rate limit"
    )]
    RateLimited {
        /// The URL that was rejected.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The requested repository or path does not exist.
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// Generic HTTP error response (4xx/5xx not otherwise classified).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body did not match the expected shape.
    #[error("unexpected response shape from {url}: {detail}")]
    Schema {
        /// The URL whose response failed validation.
        url: String,
        /// What went wrong while decoding.
        detail: String,
    },

    /// Directory descent exceeded the depth cap.
    #[error("directory tree at '{path}' exceeds maximum depth {max}")]
    DepthExceeded {
        /// The path where the cap was hit.
        path: String,
        /// The configured maximum depth.
        max: usize,
    },
}

impl GithubError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a rate-limited/unauthorized error.
    pub fn rate_limited(url: impl Into<String>, status: u16) -> Self {
        Self::RateLimited {
            url: url.into(),
            status,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Creates a generic HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Schema {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Creates a depth cap error.
    pub fn depth_exceeded(path: impl Into<String>, max: usize) -> Self {
        Self::DepthExceeded {
            path: path.into(),
            max,
        }
    }

    /// Classifies a non-success response from status code and body text.
    ///
    /// Rate limiting takes priority: GitHub signals it with a JSON message
    /// containing "rate limit" or, behind some proxies, an HTML error page.
    #[must_use]
    pub fn classify_response(url: &str, status: u16, body: &str) -> Self {
        let lowered = body.to_lowercase();
        if lowered.contains("rate limit") || body.trim_start().starts_with('<') {
            return Self::rate_limited(url, status);
        }
        if status == 404 {
            return Self::not_found(url);
        }
        Self::http_status(url, status)
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` because every
// variant requires the request URL for context, which the source error does
// not reliably provide. The helper constructors are the pattern here.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit_message() {
        let body = r#"{"message":"API rate limit exceeded for 1.2.3.4"}"#;
        let err = GithubError::classify_response("https://api.github.com/repos/a/b", 403, body);
        assert!(matches!(err, GithubError::RateLimited { status: 403, .. }));
    }

    #[test]
    fn test_classify_html_error_page() {
        let body = "<!DOCTYPE html><html><body>Blocked</body></html>";
        let err = GithubError::classify_response("https://api.github.com/repos/a/b", 429, body);
        assert!(matches!(err, GithubError::RateLimited { status: 429, .. }));
    }

    #[test]
    fn test_classify_not_found() {
        let body = r#"{"message":"Not Found"}"#;
        let err = GithubError::classify_response("https://api.github.com/repos/a/b", 404, body);
        assert!(matches!(err, GithubError::NotFound { .. }));
    }

    #[test]
    fn test_classify_generic_status() {
        let err = GithubError::classify_response("https://api.github.com/repos/a/b", 500, "oops");
        assert!(matches!(err, GithubError::HttpStatus { status: 500, .. }));
    }

    #[test]
    fn test_rate_limited_display_suggests_token() {
        let err = GithubError::rate_limited("https://api.github.com/repos/a/b", 403);
        let msg = err.to_string();
        assert!(msg.contains("403"), "Expected status in: {msg}");
        assert!(msg.contains("token"), "Expected token suggestion in: {msg}");
    }

    #[test]
    fn test_schema_display() {
        let err = GithubError::schema("https://api.github.com/repos/a/b", "expected JSON array");
        let msg = err.to_string();
        assert!(msg.contains("unexpected response shape"), "msg: {msg}");
        assert!(msg.contains("expected JSON array"), "msg: {msg}");
    }

    #[test]
    fn test_depth_exceeded_display() {
        let err = GithubError::depth_exceeded("docs/a/b/c", 32);
        let msg = err.to_string();
        assert!(msg.contains("docs/a/b/c"), "msg: {msg}");
        assert!(msg.contains("32"), "msg: {msg}");
    }
}
