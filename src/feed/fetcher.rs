use futures::StreamExt;
use reqwest::redirect::Policy;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::reader::{parse_items, FeedParseError, ParsedItem};
use crate::util::{validate_feed_url, HostPolicy, UrlValidationError};

/// Errors that can occur while loading a feed for the display block.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    #[error("Response too large")]
    ResponseTooLarge,
    #[error("Feed is not valid UTF-8")]
    InvalidUtf8,
    #[error("Refused feed URL: {0}")]
    Url(#[from] UrlValidationError),
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] FeedParseError),
}

/// Limits applied when fetching a remote feed.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_bytes: usize,
    pub max_retries: u32,
    /// First retry delay; doubles on each further attempt.
    pub retry_base: Duration,
    pub host_policy: HostPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: 10 * 1024 * 1024,
            max_retries: 3,
            retry_base: Duration::from_secs(1),
            host_policy: HostPolicy::PublicOnly,
        }
    }
}

/// Load feed items from a URL or a local file path.
///
/// Sources starting with `http://` or `https://` are validated against the
/// host policy and fetched with `client`, which should come from
/// [`feed_client`]; anything else is read from disk.
pub async fn load_feed(
    client: &reqwest::Client,
    source: &str,
    options: &FetchOptions,
) -> Result<Vec<ParsedItem>, FetchError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let url = validate_feed_url(source, options.host_policy)?;
        return fetch_feed(client, url.as_str(), options).await;
    }

    let path = Path::new(source);
    let len = tokio::fs::metadata(path).await?.len();
    if len > options.max_bytes as u64 {
        return Err(FetchError::ResponseTooLarge);
    }
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_items(&content)?)
}

/// Maximum redirect hops followed for a single feed request.
const MAX_REDIRECTS: usize = 3;

/// Build the HTTP client used for feed requests.
///
/// Every redirect target is checked against `policy`, so a public feed cannot
/// bounce the request to a private address.
pub fn feed_client(options: &FetchOptions) -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder()
        .redirect(create_redirect_policy(options.host_policy))
        .timeout(options.timeout)
        .build()?)
}

fn create_redirect_policy(policy: HostPolicy) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("Too many redirects (max {MAX_REDIRECTS})"));
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        if let Err(e) = validate_feed_url(url.as_str(), policy) {
            tracing::warn!(to = %url, error = %e, "Refusing feed redirect");
            return attempt.error(e);
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// Outcome of a single request attempt.
enum Attempt {
    Body(Vec<u8>),
    Retry(reqwest::StatusCode),
}

/// Fetch and parse a remote feed.
///
/// Does not apply the host policy to `url` itself; callers pass URLs that
/// were already validated and a client from [`feed_client`]. Each attempt,
/// body included, must finish within `options.timeout`. 429 and 5xx
/// responses are retried with exponential backoff, other non-2xx statuses
/// fail immediately.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<Vec<ParsedItem>, FetchError> {
    let mut retry_count = 0;

    let bytes = loop {
        let attempt = tokio::time::timeout(
            options.timeout,
            fetch_once(client, url, options.max_bytes),
        )
        .await
        .map_err(|_| FetchError::Timeout)??;

        let status = match attempt {
            Attempt::Body(bytes) => break bytes,
            Attempt::Retry(status) => status,
        };

        if retry_count >= options.max_retries {
            return Err(if status.is_server_error() {
                FetchError::HttpStatus(status.as_u16())
            } else {
                FetchError::RateLimited(options.max_retries)
            });
        }

        let delay = backoff_delay(options.retry_base, retry_count);
        tracing::warn!(
            feed = %url,
            status = %status,
            retry = retry_count,
            delay_ms = delay.as_millis() as u64,
            "Feed fetch failed, retrying after delay"
        );
        tokio::time::sleep(delay).await;
        retry_count += 1;
    };

    let content = String::from_utf8(bytes).map_err(|_| FetchError::InvalidUtf8)?;
    let items = parse_items(&content)?;
    tracing::info!(feed = %url, items = items.len(), "Fetched feed");
    Ok(items)
}

async fn fetch_once(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> Result<Attempt, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Ok(Attempt::Retry(status));
    }
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    Ok(Attempt::Body(read_limited_bytes(response, max_bytes).await?))
}

/// `base * 2^retry`, saturating instead of overflowing.
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
