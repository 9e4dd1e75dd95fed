//! Per-item custom elements appended to `<item>` in generated feeds.

use crate::storage::FeedItem;

use super::escape::{esc_attr, esc_html, esc_textarea, esc_url};
use super::namespace::{
    qualified, ATTR_ALT, ATTR_KEY, ATTR_LABEL, ATTR_TITLE, CUSTOM_FIELD_ELEMENT,
    FEATURED_IMAGE_LABEL, IMAGE_ELEMENT,
};

/// Featured image element for a feed item.
///
/// Returns `None` when the item has no featured image; no empty element is
/// ever produced in that case.
///
/// ```text
/// <wprssblock:image label="featured_image" alt="..." title="...">URL</wprssblock:image>
/// ```
pub fn featured_image_element(item: &FeedItem) -> Option<String> {
    let image = item.featured_image.as_ref()?;
    let name = qualified(IMAGE_ELEMENT);

    Some(format!(
        r#"<{name} {ATTR_LABEL}="{FEATURED_IMAGE_LABEL}" {ATTR_ALT}="{alt}" {ATTR_TITLE}="{title}">{src}</{name}>"#,
        alt = esc_textarea(&image.alt),
        title = esc_textarea(&image.title),
        src = esc_url(&image.url),
    ))
}

/// One custom field element per key, in key order.
///
/// Keys the item has no value for still produce an element with an empty
/// body, so every item carries the full key set.
pub fn custom_field_elements(item: &FeedItem, keys: &[String]) -> String {
    let name = qualified(CUSTOM_FIELD_ELEMENT);

    keys.iter()
        .map(|key| {
            format!(
                r#"<{name} {ATTR_KEY}="{key}">{value}</{name}>"#,
                key = esc_attr(key),
                value = esc_html(item.meta_value(key)),
            )
        })
        .collect()
}
