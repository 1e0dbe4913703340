//! Error types for project reference parsing.

use thiserror::Error;

/// Maximum reference length to accept (standard browser URL limit).
/// References longer than this are rejected to prevent memory issues.
pub const MAX_REFERENCE_LENGTH: usize = 2000;

/// Errors that can occur while parsing a project reference.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// Input matches no known project-reference pattern.
    #[error("invalid project reference '{reference}': {reason}\n  Suggestion: {suggestion}")]
    InvalidReference {
        /// The reference that failed to parse
        reference: String,
        /// Why the reference is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// Reference exceeds maximum allowed length.
    #[error(
        "reference too long ({length} chars, max {max}): {preview}...\n  Suggestion: Check for extraneous pasted content"
    )]
    ReferenceTooLong {
        /// Truncated reference for display
        preview: String,
        /// Actual length
        length: usize,
        /// Maximum allowed
        max: usize,
    },
}

impl ParseError {
    /// Creates an `InvalidReference` error for input matching no known pattern.
    #[must_use]
    pub fn unrecognized(reference: &str) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason: "does not match owner/repo, a GitHub URL, or a GitHub API URL".to_string(),
            suggestion: "Use a form like 'torvalds/linux' or 'https://github.com/owner/repo'"
                .to_string(),
        }
    }

    /// Creates an `InvalidReference` error for a malformed URL form.
    #[must_use]
    pub fn malformed(reference: &str, reason: &str) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
            suggestion: "Check the reference format and try again".to_string(),
        }
    }

    /// Creates an `InvalidReference` error for empty owner/repo segments.
    #[must_use]
    pub fn empty_segment(reference: &str) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason: "owner and repository name must both be non-empty".to_string(),
            suggestion: "Ensure the reference contains both an owner and a repository".to_string(),
        }
    }

    /// Creates a `ReferenceTooLong` error for oversized input.
    #[must_use]
    pub fn too_long(reference: &str) -> Self {
        Self::ReferenceTooLong {
            preview: reference.chars().take(50).collect(),
            length: reference.len(),
            max: MAX_REFERENCE_LENGTH,
        }
    }
}
