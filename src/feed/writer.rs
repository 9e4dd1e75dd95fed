//! RSS 2.0 document generation with hook output spliced in.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::hooks::{FeedRenderEnv, HookRegistry};
use crate::storage::FeedItem;

/// Channel-level metadata of a generated feed.
#[derive(Debug, Clone)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
}

/// Render a complete RSS 2.0 document.
///
/// Output of the `rss2_ns` hooks is added to the `<rss>` start tag, and
/// output of the `rss2_item` hooks is appended inside each `<item>` after
/// the standard elements. Hook output is trusted to be escaped already.
pub fn render_rss(
    channel: &Channel,
    items: &[FeedItem],
    hooks: &HookRegistry,
    env: &FeedRenderEnv,
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    // <rss version="2.0" xmlns:...>
    let declarations = hooks.rss2_ns().replace(['\n', '\r'], " ");
    let rss_content = format!("rss version=\"2.0\" {}", declarations.trim())
        .trim_end()
        .to_string();
    writer
        .write_event(Event::Start(BytesStart::from_content(rss_content, 3)))
        .context("Failed to write rss element")?;

    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .context("Failed to write channel element")?;
    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.link)?;
    write_text_element(&mut writer, "description", &channel.description)?;
    write_text_element(&mut writer, "lastBuildDate", &Utc::now().to_rfc2822())?;

    for item in items {
        writer
            .write_event(Event::Start(BytesStart::new("item")))
            .context("Failed to write item element")?;

        write_text_element(&mut writer, "title", &item.title)?;
        if let Some(ref link) = item.link {
            write_text_element(&mut writer, "link", link)?;
        }

        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "false"));
        writer
            .write_event(Event::Start(guid))
            .context("Failed to write guid element")?;
        writer
            .write_event(Event::Text(BytesText::new(&item.id.to_string())))
            .context("Failed to write guid text")?;
        writer
            .write_event(Event::End(BytesEnd::new("guid")))
            .context("Failed to write guid end")?;

        if let Some(date) = item
            .published
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        {
            write_text_element(&mut writer, "pubDate", &date.to_rfc2822())?;
        }
        if let Some(ref content) = item.content {
            write_text_element(&mut writer, "description", content)?;
        }

        let extra = hooks.rss2_item(item, env);
        if !extra.is_empty() {
            writer
                .write_event(Event::Text(BytesText::from_escaped(extra)))
                .context("Failed to write item extensions")?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("item")))
            .context("Failed to write item end")?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .context("Failed to write channel end")?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .context("Failed to write rss end")?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).context("Generated feed contains invalid UTF-8")
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to write {name} element"))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .with_context(|| format!("Failed to write {name} text"))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to write {name} end"))?;
    Ok(())
}
