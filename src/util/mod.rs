//! Utility functions shared across the crate.
//!
//! - **HTTP bodies**: size-limited response reading
//! - **URL validation**: base URLs for services that receive credentials
//! - **Text processing**: Unicode-aware width, truncation and sanitising of
//!   remote text before it reaches the terminal

mod http;
mod text;
mod url_validator;

pub use http::{read_limited_bytes, ResponseTooLarge};
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_base_url, UrlValidationError};

/// Maximum allowed search query length, enforced by the search input.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
