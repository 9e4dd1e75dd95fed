//! Filters that copy custom feed elements into the display block's
//! rendering context.
//!
//! Both filters are no-ops for any block other than [`DISPLAY_BLOCK`]: the
//! context comes back exactly as it went in.

use super::context::{CustomField, ImageEntry, RenderContext};
use super::item::FeedItemTags;
use crate::feed::namespace::{
    ATTR_ALT, ATTR_KEY, ATTR_LABEL, ATTR_TITLE, CUSTOM_FIELD_ELEMENT, DISPLAY_BLOCK,
    IMAGE_ELEMENT, NS_URI,
};

/// Append every `wprssblock:image` of `item` to `context.images`.
pub fn read_images_from_feed(
    mut context: RenderContext,
    block_name: &str,
    item: &dyn FeedItemTags,
) -> RenderContext {
    if block_name != DISPLAY_BLOCK {
        return context;
    }

    let images: Vec<ImageEntry> = item
        .item_tags(NS_URI, IMAGE_ELEMENT)
        .into_iter()
        .map(|tag| ImageEntry {
            label: tag.attr_or_empty(ATTR_LABEL),
            src: tag.data.clone(),
            alt: tag.attr_or_empty(ATTR_ALT),
            title: tag.attr_or_empty(ATTR_TITLE),
        })
        .collect();

    tracing::trace!(count = images.len(), "Images read from feed item");
    context.append_images(images);
    context
}

/// Append every `wprssblock:cf` of `item` to `context.custom`.
pub fn read_custom_fields_from_feed(
    mut context: RenderContext,
    block_name: &str,
    item: &dyn FeedItemTags,
) -> RenderContext {
    if block_name != DISPLAY_BLOCK {
        return context;
    }

    let fields: Vec<CustomField> = item
        .item_tags(NS_URI, CUSTOM_FIELD_ELEMENT)
        .into_iter()
        .map(|tag| CustomField {
            label: tag.attr_or_empty(ATTR_KEY),
            value: tag.data.clone(),
        })
        .collect();

    tracing::trace!(count = fields.len(), "Custom fields read from feed item");
    context.append_custom(fields);
    context
}
