//! Producer and reader of feeds carrying the custom `wprssblock` elements.
//!
//! - `namespace` - element/attribute names shared by both sides
//! - `augment` - per-item featured image and custom field elements
//! - `writer` - RSS 2.0 generation with hook output spliced in
//! - `reader` - namespace-aware item parsing
//! - `fetcher` - loading a feed from a URL or file

mod augment;
mod escape;
mod fetcher;
pub mod namespace;
mod reader;
mod writer;

pub use augment::{custom_field_elements, featured_image_element};
pub use escape::{esc_attr, esc_html, esc_textarea, esc_url};
pub use fetcher::{feed_client, fetch_feed, load_feed, FetchError, FetchOptions};
pub use namespace::namespace_declaration;
pub use reader::{parse_items, FeedParseError, ParsedItem};
pub use writer::{render_rss, Channel};
