//! Custom feed tags for RSS output and the RSS display block.
//!
//! Feeds generated from the post store carry a `wprssblock` namespace with a
//! featured image element and one element per public custom field. When the
//! display block consumes such a feed, the same elements are read back into
//! its rendering context.
//!
//! - [`feed`] - producer side and feed reading
//! - [`block`] - consumer side filters
//! - [`hooks`] - registration of both
//! - [`meta_keys`] - cached list of public meta keys
//! - [`storage`] - SQLite post/meta/transient store

pub mod block;
pub mod config;
pub mod feed;
pub mod hooks;
pub mod meta_keys;
pub mod storage;
pub mod transients;
pub mod util;
