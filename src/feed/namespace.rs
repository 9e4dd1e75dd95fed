//! Identifiers shared by the feed producer and the block consumer.
//!
//! Both sides of the custom-tag contract read from here so element and
//! attribute names cannot drift apart.

/// XML prefix bound to [`NS_URI`] in generated feeds.
pub const NS_PREFIX: &str = "wprssblock";

/// Namespace URI of the custom feed elements.
pub const NS_URI: &str = "https://cms.ubc.ca/";

/// Local name of the featured image element.
pub const IMAGE_ELEMENT: &str = "image";

/// Local name of the custom field element.
pub const CUSTOM_FIELD_ELEMENT: &str = "cf";

pub const ATTR_LABEL: &str = "label";
pub const ATTR_ALT: &str = "alt";
pub const ATTR_TITLE: &str = "title";
pub const ATTR_KEY: &str = "key";

/// Label carried by the featured image element.
pub const FEATURED_IMAGE_LABEL: &str = "featured_image";

/// Block type of the RSS display block.
pub const DISPLAY_BLOCK: &str = "ubc/ctlt-rss";

/// Inner block types this crate adds to the display block's allowlist.
pub const INNER_BLOCKS: [&str; 2] = ["ubc/api-image", "ubc/api-custom-field"];

/// Qualified element name, e.g. `wprssblock:image`.
pub fn qualified(local_name: &str) -> String {
    format!("{NS_PREFIX}:{local_name}")
}

/// Namespace declaration emitted into the `<rss>` start tag.
///
/// Output is a single attribute followed by a newline, ready to be spliced
/// between the other attributes of the root element.
pub fn namespace_declaration() -> String {
    format!("xmlns:{NS_PREFIX}=\"{NS_URI}\"\n")
}
