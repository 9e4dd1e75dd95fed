//! Integration tests for the producer/consumer contract: a feed rendered with
//! the custom tags, read back by the display block filters.
//!
//! Each database-backed test creates its own in-memory SQLite database.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeMap;

use rssblock::block::{CustomField, ImageEntry, RenderContext};
use rssblock::feed::{namespace::DISPLAY_BLOCK, parse_items, render_rss, Channel};
use rssblock::hooks::{FeedRenderEnv, HookRegistry};
use rssblock::meta_keys::{site_meta_keys, META_KEYS_TTL};
use rssblock::storage::{
    Database, FeaturedImage, FeedItem, NewPost, ATTACHMENT_ALT_META_KEY,
};

async fn test_db() -> Database {
    Database::open(":memory:").await.unwrap()
}

fn channel() -> Channel {
    Channel {
        title: "Test Site".to_string(),
        link: "https://site.example.com/".to_string(),
        description: "Round trip".to_string(),
    }
}

fn feed_item(id: i64, image: Option<FeaturedImage>, meta: &[(&str, &str)]) -> FeedItem {
    FeedItem {
        id,
        title: format!("Post {id}"),
        link: Some(format!("https://site.example.com/{id}")),
        content: None,
        published: Some(1_700_000_000 + id),
        featured_image: image,
        meta: meta
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// Render items with the plugin hooks, then rebuild one context per item.
fn round_trip(items: &[FeedItem], meta_keys: &[&str]) -> Vec<RenderContext> {
    let hooks = HookRegistry::with_plugin();
    let env = FeedRenderEnv {
        meta_keys: meta_keys.iter().map(|k| k.to_string()).collect(),
    };
    let xml = render_rss(&channel(), items, &hooks, &env).unwrap();

    parse_items(&xml)
        .unwrap()
        .iter()
        .map(|item| hooks.filter_item_context(RenderContext::new(), DISPLAY_BLOCK, item))
        .collect()
}

// ============================================================================
// Featured Image
// ============================================================================

#[test]
fn test_featured_image_round_trip() {
    let image = FeaturedImage {
        attachment_id: 5,
        url: "https://site.example.com/wp-content/a b.jpg?w=300&h=200".to_string(),
        title: "Sunset <over> \"the\" bay".to_string(),
        alt: "Two lines:\nsecond & last".to_string(),
    };
    let contexts = round_trip(&[feed_item(1, Some(image), &[])], &[]);

    assert_eq!(
        contexts[0].images,
        Some(vec![ImageEntry {
            label: "featured_image".to_string(),
            src: "https://site.example.com/wp-content/a%20b.jpg?w=300&h=200".to_string(),
            alt: "Two lines:\nsecond & last".to_string(),
            title: "Sunset <over> \"the\" bay".to_string(),
        }])
    );
}

#[test]
fn test_no_featured_image_no_entry() {
    let contexts = round_trip(&[feed_item(1, None, &[])], &[]);
    assert_eq!(contexts.len(), 1);
    assert!(contexts[0].images.is_none());
}

#[test]
fn test_disallowed_image_url_has_empty_src() {
    let image = FeaturedImage {
        attachment_id: 5,
        url: "javascript:alert(1)".to_string(),
        title: "t".to_string(),
        alt: "a".to_string(),
    };
    let contexts = round_trip(&[feed_item(1, Some(image), &[])], &[]);
    assert_eq!(contexts[0].images.as_ref().unwrap()[0].src, "");
}

// ============================================================================
// Custom Fields
// ============================================================================

#[test]
fn test_custom_fields_missing_value_kept_empty() {
    let contexts = round_trip(
        &[feed_item(1, None, &[("subtitle", "X")])],
        &["author_note", "subtitle"],
    );

    assert_eq!(
        contexts[0].custom,
        Some(vec![
            CustomField {
                label: "author_note".to_string(),
                value: String::new(),
            },
            CustomField {
                label: "subtitle".to_string(),
                value: "X".to_string(),
            },
        ])
    );
}

#[test]
fn test_custom_field_markup_survives() {
    let contexts = round_trip(
        &[feed_item(1, None, &[("note", "<em>hi</em> & bye")])],
        &["note"],
    );
    assert_eq!(
        contexts[0].custom.as_ref().unwrap()[0].value,
        "<em>hi</em> & bye"
    );
}

#[test]
fn test_items_accumulate_into_one_context() {
    let hooks = HookRegistry::with_plugin();
    let env = FeedRenderEnv {
        meta_keys: vec!["a".to_string(), "b".to_string()],
    };
    let items = vec![
        feed_item(2, None, &[("a", "2a"), ("b", "2b")]),
        feed_item(1, None, &[("a", "1a")]),
    ];
    let xml = render_rss(&channel(), &items, &hooks, &env).unwrap();

    let context = parse_items(&xml)
        .unwrap()
        .iter()
        .fold(RenderContext::new(), |ctx, item| {
            hooks.filter_item_context(ctx, DISPLAY_BLOCK, item)
        });

    let values: Vec<_> = context
        .custom
        .unwrap()
        .into_iter()
        .map(|f| (f.label, f.value))
        .collect();
    assert_eq!(
        values,
        vec![
            ("a".to_string(), "2a".to_string()),
            ("b".to_string(), "2b".to_string()),
            ("a".to_string(), "1a".to_string()),
            ("b".to_string(), String::new()),
        ]
    );
}

#[test]
fn test_other_block_ignores_custom_tags() {
    let hooks = HookRegistry::with_plugin();
    let image = FeaturedImage {
        attachment_id: 5,
        url: "https://site.example.com/a.jpg".to_string(),
        title: "t".to_string(),
        alt: "a".to_string(),
    };
    let xml = render_rss(
        &channel(),
        &[feed_item(1, Some(image), &[("k", "v")])],
        &hooks,
        &FeedRenderEnv {
            meta_keys: vec!["k".to_string()],
        },
    )
    .unwrap();

    let item = &parse_items(&xml).unwrap()[0];
    let base = item.base_context();
    let ctx = hooks.filter_item_context(base.clone(), "ubc/other-block", item);
    assert_eq!(ctx, base);
}

// ============================================================================
// Storage-backed Feed
// ============================================================================

#[tokio::test]
async fn test_feed_from_database() {
    let db = test_db().await;

    let mut with_image = NewPost::post("With image");
    with_image.published = Some(1_700_000_100);
    let post_a = db.insert_post(&with_image).await.unwrap();
    let image_id = db
        .insert_post(&NewPost::attachment("Cover", "https://site.example.com/cover.png"))
        .await
        .unwrap();
    db.set_post_meta(image_id, ATTACHMENT_ALT_META_KEY, "Cover alt")
        .await
        .unwrap();
    db.set_featured_image(post_a, image_id).await.unwrap();
    db.set_post_meta(post_a, "subtitle", "X").await.unwrap();
    db.set_post_meta(post_a, "_edit_lock", "123").await.unwrap();

    let mut plain = NewPost::post("Plain");
    plain.published = Some(1_700_000_000);
    let post_b = db.insert_post(&plain).await.unwrap();
    db.set_post_meta(post_b, "author_note", "Y").await.unwrap();

    let meta_keys = site_meta_keys(&db, &db, META_KEYS_TTL).await.unwrap();
    assert_eq!(meta_keys, vec!["author_note", "subtitle"]);

    let items = db.recent_feed_items(10).await.unwrap();
    let hooks = HookRegistry::with_plugin();
    let xml = render_rss(&channel(), &items, &hooks, &FeedRenderEnv { meta_keys }).unwrap();
    assert!(!xml.contains("_edit_lock"));
    assert!(!xml.contains("_thumbnail_id"));

    let contexts: Vec<_> = parse_items(&xml)
        .unwrap()
        .iter()
        .map(|item| hooks.filter_item_context(item.base_context(), DISPLAY_BLOCK, item))
        .collect();

    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[0].extra["title"], "With image");
    let image = &contexts[0].images.as_ref().unwrap()[0];
    assert_eq!(image.src, "https://site.example.com/cover.png");
    assert_eq!(image.alt, "Cover alt");
    assert_eq!(image.title, "Cover");
    assert!(contexts[1].images.is_none());

    let custom: Vec<_> = contexts[1]
        .custom
        .as_ref()
        .unwrap()
        .iter()
        .map(|f| (f.label.as_str(), f.value.as_str()))
        .collect();
    assert_eq!(custom, vec![("author_note", "Y"), ("subtitle", "")]);
}

proptest! {
    #[test]
    fn prop_image_text_round_trips(
        alt in "[ -~\\n\\t]{0,40}",
        title in "\\PC{0,40}",
    ) {
        let image = FeaturedImage {
            attachment_id: 1,
            url: "https://site.example.com/x.png".to_string(),
            title: title.clone(),
            alt: alt.clone(),
        };
        let contexts = round_trip(&[feed_item(1, Some(image), &[])], &[]);
        let entry = &contexts[0].images.as_ref().unwrap()[0];
        prop_assert_eq!(&entry.alt, &alt);
        prop_assert_eq!(&entry.title, &title);
    }

    #[test]
    fn prop_custom_value_round_trips(value in "[ -~]{0,60}") {
        let contexts = round_trip(&[feed_item(1, None, &[("k", value.as_str())])], &["k"]);
        prop_assert_eq!(&contexts[0].custom.as_ref().unwrap()[0].value, &value);
    }
}
