/// A namespaced child element of a parsed feed item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTag {
    /// Resolved namespace URI, `None` for unqualified elements.
    pub namespace: Option<String>,
    /// Local name, without prefix.
    pub name: String,
    /// Unprefixed attributes in document order, values unescaped.
    pub attribs: Vec<(String, String)>,
    /// Unescaped text content.
    pub data: String,
}

impl ItemTag {
    /// Value of the unprefixed attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attribs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`ItemTag::attr`], reading a missing attribute as "".
    pub fn attr_or_empty(&self, name: &str) -> String {
        self.attr(name).unwrap_or_default().to_string()
    }

    pub fn matches(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == local_name
    }
}

/// Read access to the child elements of one parsed feed item.
pub trait FeedItemTags {
    /// Child elements with the given namespace URI and local name, in
    /// document order.
    fn item_tags(&self, namespace: &str, local_name: &str) -> Vec<&ItemTag>;
}

impl FeedItemTags for Vec<ItemTag> {
    fn item_tags(&self, namespace: &str, local_name: &str) -> Vec<&ItemTag> {
        self.iter()
            .filter(|tag| tag.matches(namespace, local_name))
            .collect()
    }
}
