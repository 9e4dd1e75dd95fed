//! Consumer side: the RSS display block reading custom feed elements.
//!
//! - `importers` - context filters for images and custom fields
//! - `inner_blocks` - allowlist filter for nested blocks
//! - [`FeedItemTags`] - what the filters need from a parsed feed item

mod context;
mod importers;
mod inner_blocks;
mod item;

pub use context::{CustomField, ImageEntry, RenderContext};
pub use importers::{read_custom_fields_from_feed, read_images_from_feed};
pub use inner_blocks::add_inner_blocks_support;
pub use item::{FeedItemTags, ItemTag};
