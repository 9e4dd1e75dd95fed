//! Reads RSS items, keeping every child element with its resolved namespace.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;

use crate::block::{FeedItemTags, ItemTag, RenderContext};

/// Maximum element nesting depth accepted in a feed document.
const MAX_FEED_DEPTH: usize = 64;

/// RSS 1.0 (RDF) namespace; its `item` elements are read like RSS 2.0 ones.
const RSS1_NS: &str = "http://purl.org/rss/1.0/";

/// Errors that can occur while reading a feed document.
#[derive(Debug, Error)]
pub enum FeedParseError {
    /// Nesting depth exceeds safety limit.
    #[error("Feed nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// XML parsing failed, including references to undeclared entities.
    #[error("XML parse error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for FeedParseError {
    fn from(err: quick_xml::Error) -> Self {
        FeedParseError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for FeedParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        FeedParseError::Xml(err.to_string())
    }
}

/// One `<item>` of a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    /// Every direct child element, in document order.
    pub tags: Vec<ItemTag>,
}

impl ParsedItem {
    /// Context the host builds for this item before any filter runs.
    pub fn base_context(&self) -> RenderContext {
        let mut context = RenderContext::new();
        let fields = [
            ("title", &self.title),
            ("link", &self.link),
            ("guid", &self.guid),
            ("description", &self.description),
            ("pub_date", &self.pub_date),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                context
                    .extra
                    .insert(key.to_string(), serde_json::Value::from(value.as_str()));
            }
        }
        context
    }

    fn push_tag(&mut self, tag: ItemTag) {
        if tag.namespace.is_none() || tag.namespace.as_deref() == Some(RSS1_NS) {
            let slot = match tag.name.as_str() {
                "title" => Some(&mut self.title),
                "link" => Some(&mut self.link),
                "guid" => Some(&mut self.guid),
                "description" => Some(&mut self.description),
                "pubDate" => Some(&mut self.pub_date),
                _ => None,
            };
            if let Some(slot) = slot {
                slot.get_or_insert_with(|| tag.data.clone());
            }
        }
        self.tags.push(tag);
    }
}

impl FeedItemTags for ParsedItem {
    fn item_tags(&self, namespace: &str, local_name: &str) -> Vec<&ItemTag> {
        self.tags.item_tags(namespace, local_name)
    }
}

/// Parse the items of an RSS 2.0 (or RSS 1.0) document.
///
/// Entity declarations in a DOCTYPE are never expanded: a reference to
/// anything but the five XML builtins or a character reference is a
/// parse error.
pub fn parse_items(xml: &str) -> Result<Vec<ParsedItem>, FeedParseError> {
    let mut reader = NsReader::from_str(xml);

    let mut items = Vec::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut item_depth: usize = 0;
    let mut current: Option<ParsedItem> = None;
    let mut child: Option<ItemTag> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = namespace_uri(resolved);

        match event {
            Event::Start(e) => {
                depth += 1;
                if depth > MAX_FEED_DEPTH {
                    return Err(FeedParseError::MaxDepthExceeded(MAX_FEED_DEPTH));
                }

                if current.is_none() {
                    if is_item(namespace.as_deref(), &e) {
                        current = Some(ParsedItem::default());
                        item_depth = depth;
                    }
                } else if depth == item_depth + 1 {
                    child = Some(start_tag(&reader, namespace, &e)?);
                }
            }
            Event::Empty(e) => match current.as_mut() {
                None if is_item(namespace.as_deref(), &e) => items.push(ParsedItem::default()),
                Some(item) if depth == item_depth => {
                    item.push_tag(start_tag(&reader, namespace, &e)?);
                }
                _ => {}
            },
            Event::Text(e) => {
                if let Some(tag) = child.as_mut() {
                    tag.data.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(tag) = child.as_mut() {
                    tag.data.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(item) = current.as_mut() {
                    if depth == item_depth + 1 {
                        if let Some(tag) = child.take() {
                            item.push_tag(tag);
                        }
                    } else if depth == item_depth {
                        items.extend(current.take());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(items = items.len(), "Parsed feed items");
    Ok(items)
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn is_item(namespace: Option<&str>, e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"item" && matches!(namespace, None | Some(RSS1_NS))
}

/// Build an [`ItemTag`] from a start tag, keeping only unprefixed attributes.
fn start_tag(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    e: &BytesStart<'_>,
) -> Result<ItemTag, FeedParseError> {
    let decoder = reader.decoder();
    let mut attribs = Vec::new();

    for attr_result in e.attributes() {
        let attr = attr_result?;
        if attr.key.prefix().is_some() || attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attribs.push((name, value));
    }

    Ok(ItemTag {
        namespace,
        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        attribs,
        data: String::new(),
    })
}
