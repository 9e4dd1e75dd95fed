//! Configuration file parser for ~/.config/rssblock/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as likely typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{Channel, FetchOptions};
use crate::util::HostPolicy;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding posts and transients. Relative to the config
    /// directory when not absolute.
    pub database: PathBuf,

    /// Channel title of the generated feed.
    pub site_title: String,

    /// Channel link of the generated feed.
    pub site_link: String,

    /// Channel description of the generated feed.
    pub site_description: String,

    /// Number of posts rendered into the feed.
    pub feed_limit: i64,

    /// How long the public meta key list is cached, in seconds.
    pub meta_keys_ttl_secs: u64,

    /// Timeout for fetching a remote feed, in seconds.
    pub fetch_timeout_secs: u64,

    /// Largest feed body accepted, in bytes.
    pub max_feed_bytes: usize,

    /// Allow fetching feeds from loopback and private network hosts.
    pub allow_private_hosts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("rssblock.db"),
            site_title: "rssblock".to_string(),
            site_link: "http://localhost/".to_string(),
            site_description: String::new(),
            feed_limit: 10,
            meta_keys_ttl_secs: 3600,
            fetch_timeout_secs: 30,
            max_feed_bytes: 10 * 1024 * 1024,
            allow_private_hosts: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 9] = [
        "database",
        "site_title",
        "site_link",
        "site_description",
        "feed_limit",
        "meta_keys_ttl_secs",
        "fetch_timeout_secs",
        "max_feed_bytes",
        "allow_private_hosts",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Database path, resolved against `base_dir` when relative.
    pub fn database_path(&self, base_dir: &Path) -> PathBuf {
        if self.database.is_absolute() {
            self.database.clone()
        } else {
            base_dir.join(&self.database)
        }
    }

    pub fn meta_keys_ttl(&self) -> Duration {
        Duration::from_secs(self.meta_keys_ttl_secs)
    }

    pub fn channel(&self) -> Channel {
        Channel {
            title: self.site_title.clone(),
            link: self.site_link.clone(),
            description: self.site_description.clone(),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_bytes: self.max_feed_bytes,
            host_policy: if self.allow_private_hosts {
                HostPolicy::AllowPrivate
            } else {
                HostPolicy::PublicOnly
            },
            ..FetchOptions::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
