//! Shared helpers.
//!
//! - **URL validation**: refuses feed sources pointing at internal hosts

mod url_validator;

pub use url_validator::{validate_feed_url, HostPolicy, UrlValidationError};
