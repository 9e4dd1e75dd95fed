//! Hook registry and the handlers this crate registers on it.
//!
//! The feed renderer fires two actions (`rss2_ns` once per document,
//! `rss2_item` once per item) whose string outputs are concatenated into the
//! document. The display block runs two filters, each threading a value
//! through its handlers in registration order.

use crate::block::{
    add_inner_blocks_support, read_custom_fields_from_feed, read_images_from_feed,
    FeedItemTags, RenderContext,
};
use crate::feed::{custom_field_elements, featured_image_element, namespace_declaration};
use crate::storage::FeedItem;

/// Per-request data item actions may read.
#[derive(Debug, Clone, Default)]
pub struct FeedRenderEnv {
    /// Public meta keys, computed once per feed request.
    pub meta_keys: Vec<String>,
}

pub type NamespaceAction = fn() -> String;
pub type ItemAction = fn(&FeedItem, &FeedRenderEnv) -> String;
pub type ItemContextFilter = fn(RenderContext, &str, &dyn FeedItemTags) -> RenderContext;
pub type InnerBlocksFilter = fn(Vec<String>, &str) -> Vec<String>;

#[derive(Default)]
pub struct HookRegistry {
    rss2_ns: Vec<NamespaceAction>,
    rss2_item: Vec<ItemAction>,
    item_context: Vec<ItemContextFilter>,
    supported_inner_blocks: Vec<InnerBlocksFilter>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with this crate's handlers already registered.
    pub fn with_plugin() -> Self {
        let mut hooks = Self::new();
        register(&mut hooks);
        hooks
    }

    pub fn add_rss2_ns(&mut self, action: NamespaceAction) {
        self.rss2_ns.push(action);
    }

    pub fn add_rss2_item(&mut self, action: ItemAction) {
        self.rss2_item.push(action);
    }

    pub fn add_item_context_filter(&mut self, filter: ItemContextFilter) {
        self.item_context.push(filter);
    }

    pub fn add_supported_inner_blocks_filter(&mut self, filter: InnerBlocksFilter) {
        self.supported_inner_blocks.push(filter);
    }

    /// Concatenated output of all `rss2_ns` actions.
    pub fn rss2_ns(&self) -> String {
        self.rss2_ns.iter().map(|action| action()).collect()
    }

    /// Concatenated output of all `rss2_item` actions for one item.
    pub fn rss2_item(&self, item: &FeedItem, env: &FeedRenderEnv) -> String {
        self.rss2_item
            .iter()
            .map(|action| action(item, env))
            .collect()
    }

    pub fn filter_item_context(
        &self,
        context: RenderContext,
        block_name: &str,
        item: &dyn FeedItemTags,
    ) -> RenderContext {
        self.item_context
            .iter()
            .fold(context, |context, filter| filter(context, block_name, item))
    }

    pub fn filter_supported_inner_blocks(
        &self,
        supported: Vec<String>,
        block_name: &str,
    ) -> Vec<String> {
        self.supported_inner_blocks
            .iter()
            .fold(supported, |supported, filter| filter(supported, block_name))
    }
}

/// Register the feed actions and block filters.
pub fn register(hooks: &mut HookRegistry) {
    hooks.add_rss2_ns(namespace_declaration);
    hooks.add_rss2_item(add_feature_image_to_rss2_item);
    hooks.add_rss2_item(add_custom_fields_to_rss2_item);
    hooks.add_item_context_filter(read_images_from_feed);
    hooks.add_item_context_filter(read_custom_fields_from_feed);
    hooks.add_supported_inner_blocks_filter(add_inner_blocks_support);
}

fn add_feature_image_to_rss2_item(item: &FeedItem, _env: &FeedRenderEnv) -> String {
    featured_image_element(item).unwrap_or_default()
}

fn add_custom_fields_to_rss2_item(item: &FeedItem, env: &FeedRenderEnv) -> String {
    custom_field_elements(item, &env.meta_keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ItemTag;
    use crate::feed::namespace::{DISPLAY_BLOCK, NS_URI};
    use std::collections::BTreeMap;

    fn plain_item() -> FeedItem {
        FeedItem {
            id: 3,
            title: "T".to_string(),
            link: None,
            content: None,
            published: None,
            featured_image: None,
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn test_empty_registry_is_identity() {
        let hooks = HookRegistry::new();
        assert_eq!(hooks.rss2_ns(), "");
        assert_eq!(hooks.rss2_item(&plain_item(), &FeedRenderEnv::default()), "");

        let blocks = vec!["a".to_string()];
        assert_eq!(
            hooks.filter_supported_inner_blocks(blocks.clone(), DISPLAY_BLOCK),
            blocks
        );
    }

    #[test]
    fn test_plugin_namespace_action() {
        let hooks = HookRegistry::with_plugin();
        assert_eq!(hooks.rss2_ns(), "xmlns:wprssblock=\"https://cms.ubc.ca/\"\n");
    }

    #[test]
    fn test_item_actions_run_in_order() {
        let hooks = HookRegistry::with_plugin();
        let env = FeedRenderEnv {
            meta_keys: vec!["k".to_string()],
        };
        let out = hooks.rss2_item(&plain_item(), &env);
        // No featured image: only the custom field element
        assert_eq!(out, "<wprssblock:cf key=\"k\"></wprssblock:cf>");
    }

    #[test]
    fn test_context_filters_chain() {
        let hooks = HookRegistry::with_plugin();
        let item = vec![
            ItemTag {
                namespace: Some(NS_URI.to_string()),
                name: "cf".to_string(),
                attribs: vec![("key".to_string(), "k".to_string())],
                data: "v".to_string(),
            },
            ItemTag {
                namespace: Some(NS_URI.to_string()),
                name: "image".to_string(),
                attribs: vec![("label".to_string(), "featured_image".to_string())],
                data: "https://example.com/a.png".to_string(),
            },
        ];

        let ctx = hooks.filter_item_context(RenderContext::new(), DISPLAY_BLOCK, &item);
        assert_eq!(ctx.images.map(|i| i.len()), Some(1));
        assert_eq!(ctx.custom.map(|c| c.len()), Some(1));

        let untouched = hooks.filter_item_context(RenderContext::new(), "core/list", &item);
        assert_eq!(untouched, RenderContext::new());
    }

    #[test]
    fn test_inner_blocks_filter_registered() {
        let hooks = HookRegistry::with_plugin();
        let result = hooks.filter_supported_inner_blocks(Vec::new(), DISPLAY_BLOCK);
        assert_eq!(result, vec!["ubc/api-image", "ubc/api-custom-field"]);
    }
}
