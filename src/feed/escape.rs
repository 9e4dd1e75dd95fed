//! Output escaping for custom feed elements.
//!
//! All helpers return text that is safe to splice verbatim into XML, either
//! as element content or inside a double-quoted attribute value.

use std::borrow::Cow;

use quick_xml::escape::escape;
use url::Url;

/// URL schemes `esc_url` lets through. Anything else collapses to "".
const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto", "feed"];

/// Escape text for a double-quoted attribute value.
pub fn esc_attr(text: &str) -> Cow<'_, str> {
    escape(text)
}

/// Escape text for element content.
///
/// Carriage returns are written as `&#13;`: XML readers normalise a raw
/// `\r\n` in element content to `\n`.
pub fn esc_html(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}

/// Escape multi-line text for an attribute value.
///
/// Line breaks are written as character references: a literal newline inside
/// an attribute would be folded to a space by any conforming XML reader.
pub fn esc_textarea(text: &str) -> String {
    let escaped = escape(text);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped.into_owned();
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}

/// Clean and escape a URL for output.
///
/// - Surrounding whitespace is trimmed and inner spaces become `%20`
/// - Site-relative references (`/path`, `#frag`, `?query`) pass through
/// - Scheme-less values get `http://` prepended, as a bare domain would
/// - URLs with a scheme outside the allowlist, or that fail to parse, yield ""
pub fn esc_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let cleaned: String = trimmed
        .replace(' ', "%20")
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.starts_with(['/', '#', '?']) {
        return escape(&cleaned).into_owned();
    }

    let candidate = match Url::parse(&cleaned) {
        Ok(_) => cleaned,
        Err(url::ParseError::RelativeUrlWithoutBase) => format!("http://{cleaned}"),
        Err(e) => {
            tracing::debug!(url = %cleaned, error = %e, "Dropping unparsable URL");
            return String::new();
        }
    };

    match Url::parse(&candidate) {
        Ok(url) if ALLOWED_URL_SCHEMES.contains(&url.scheme()) => escape(&candidate).into_owned(),
        Ok(url) => {
            tracing::debug!(scheme = %url.scheme(), "Dropping URL with disallowed scheme");
            String::new()
        }
        Err(_) => String::new(),
    }
}
