//! Site-wide list of public meta keys, cached in a transient.
//!
//! The key list drives which custom field elements every feed item carries.
//! Keys starting with `_` are private by convention and never listed.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

use crate::storage::Database;
use crate::transients::TransientStore;

/// Transient slot holding the JSON-encoded key list.
pub const META_KEYS_TRANSIENT: &str = "wp_metadata_get_keys";

/// How long a computed key list is reused.
pub const META_KEYS_TTL: Duration = Duration::from_secs(60 * 60);

/// Anything that can enumerate the distinct public meta keys.
pub trait MetaKeySource: Sync {
    /// Distinct keys without a leading `_`, sorted.
    fn public_meta_keys(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

impl MetaKeySource for Database {
    async fn public_meta_keys(&self) -> Result<Vec<String>> {
        self.query_public_meta_keys().await
    }
}

/// Public meta keys across the site.
///
/// Served from the [`META_KEYS_TRANSIENT`] slot when present; otherwise the
/// source is queried once and the result cached for `ttl`. Query errors are
/// returned to the caller unchanged. A cached value that fails to decode is
/// treated as a miss.
pub async fn site_meta_keys<S, T>(source: &S, transients: &T, ttl: Duration) -> Result<Vec<String>>
where
    S: MetaKeySource,
    T: TransientStore,
{
    if let Some(cached) = transients.get_transient(META_KEYS_TRANSIENT).await? {
        match serde_json::from_str::<Vec<String>>(&cached) {
            Ok(keys) => {
                tracing::trace!(count = keys.len(), "Meta keys served from transient");
                return Ok(keys);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable meta key transient");
            }
        }
    }

    let mut keys = source.public_meta_keys().await?;
    // Normalise whatever the source returned
    keys.retain(|k| !k.starts_with('_'));
    keys.sort();
    keys.dedup();

    let encoded = serde_json::to_string(&keys)?;
    transients
        .set_transient(META_KEYS_TRANSIENT, &encoded, ttl)
        .await?;
    tracing::debug!(count = keys.len(), "Meta keys computed and cached");

    Ok(keys)
}
