use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Why a feed source URL was refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Which hosts a remote feed may be fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostPolicy {
    /// Public hosts only: loopback and private ranges are refused.
    #[default]
    PublicOnly,
    /// Any host, for feeds served from an intranet or a local dev site.
    AllowPrivate,
}

/// Validate a remote feed URL before fetching it.
///
/// Only `http` and `https` are accepted. Under [`HostPolicy::PublicOnly`],
/// `localhost`, loopback addresses and private/link-local ranges are
/// refused as well, so a feed source cannot be pointed at internal services.
pub fn validate_feed_url(url_str: &str, policy: HostPolicy) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if policy == HostPolicy::AllowPrivate {
        return Ok(url);
    }

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlValidationError::Localhost);
        }

        let bare_host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = bare_host.parse::<IpAddr>() {
            if ip.is_loopback() {
                return Err(UrlValidationError::Localhost);
            }
            if is_private_ip(&ip) {
                return Err(UrlValidationError::PrivateIp(ip.to_string()));
            }
        }
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => ipv4.is_private() || ipv4.is_link_local() || ipv4.is_unspecified(),
        IpAddr::V6(ipv6) => {
            let first = ipv6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link-local
            ipv6.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}
