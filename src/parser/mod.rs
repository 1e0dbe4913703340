//! Project reference parsing.
//!
//! This module turns user input into a structured [`ProjectLocator`].
//! Three reference forms are recognized:
//!
//! - Bare shorthand: `owner/repo` or `owner/repo/docs/guide`
//! - GitHub web URLs: `https://github.com/owner/repo/tree/branch/path`
//! - GitHub REST API URLs: `https://api.github.com/repos/owner/repo/...`
//!
//! # Example
//!
//! ```
//! use repobook_core::parser::parse_reference;
//!
//! let locator = parse_reference("torvalds/linux").unwrap();
//! assert_eq!(locator.owner, "torvalds");
//! assert_eq!(locator.repo, "linux");
//! ```

mod error;
mod locator;
mod reference;

pub use error::ParseError;
pub use locator::ProjectLocator;
pub use reference::parse_reference;
