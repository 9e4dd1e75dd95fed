use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Image read back from a feed item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub label: String,
    pub src: String,
    pub alt: String,
    pub title: String,
}

/// Custom field read back from a feed item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub label: String,
    pub value: String,
}

/// Data the RSS display block renders one feed item from.
///
/// `images` and `custom` stay `None` until something is imported into them;
/// every other key set by the host passes through in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Vec<CustomField>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append images after any already present. An empty batch leaves the
    /// context untouched.
    pub fn append_images(&mut self, images: Vec<ImageEntry>) {
        if images.is_empty() {
            return;
        }
        self.images.get_or_insert_with(Vec::new).extend(images);
    }

    /// Append custom fields after any already present. An empty batch leaves
    /// the context untouched.
    pub fn append_custom(&mut self, fields: Vec<CustomField>) {
        if fields.is_empty() {
            return;
        }
        self.custom.get_or_insert_with(Vec::new).extend(fields);
    }
}
