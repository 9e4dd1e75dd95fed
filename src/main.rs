use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use rssblock::block::RenderContext;
use rssblock::config::Config;
use rssblock::feed::{feed_client, load_feed, namespace::DISPLAY_BLOCK, render_rss};
use rssblock::hooks::{FeedRenderEnv, HookRegistry};
use rssblock::meta_keys::site_meta_keys;
use rssblock::storage::{Database, DatabaseError, NewPost, ATTACHMENT_ALT_META_KEY};

/// Get the config directory path (~/.config/rssblock/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("rssblock"))
}

#[derive(Parser, Debug)]
#[command(
    name = "rssblock",
    about = "Custom feed tags for RSS output and the RSS display block"
)]
struct Args {
    /// Config file (defaults to ~/.config/rssblock/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, value_name = "FILE", global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the RSS feed of recent posts, with custom tags
    Render {
        /// Number of posts (defaults to feed_limit from the config)
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Read a feed from a URL or file and print the block rendering context
    Import {
        /// Feed URL or file path
        source: String,
        /// Block type the context is built for
        #[arg(long, default_value = DISPLAY_BLOCK)]
        block: String,
        /// Accumulate all items into a single context
        #[arg(long)]
        merge: bool,
    },
    /// Print the public meta keys of the site
    MetaKeys,
    /// Print the inner blocks allowed in a block
    InnerBlocks {
        block: String,
        /// Blocks already allowed
        existing: Vec<String>,
    },
    /// Add a post, optionally with custom fields and a featured image
    AddPost {
        #[arg(long)]
        title: String,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Unix timestamp (defaults to now)
        #[arg(long)]
        published: Option<i64>,
        /// Custom field as key=value (repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta_pair)]
        meta: Vec<(String, String)>,
        /// Featured image URL
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long, requires = "image_url", default_value = "")]
        image_title: String,
        #[arg(long, requires = "image_url", default_value = "")]
        image_alt: String,
    },
}

fn parse_meta_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

async fn open_database(path: &Path) -> Result<Database> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    match Database::open(path_str).await {
        Ok(db) => Ok(db),
        Err(DatabaseError::InstanceLocked) => {
            anyhow::bail!("Database {} is locked by another process", path.display())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open database: {}", e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| config.database_path(&config_dir));

    let hooks = HookRegistry::with_plugin();

    match args.command {
        Command::Render { limit } => {
            let db = open_database(&db_path).await?;
            let limit = limit.unwrap_or(config.feed_limit);

            // A failed key lookup drops the custom fields, never the feed
            let meta_keys = match site_meta_keys(&db, &db, config.meta_keys_ttl()).await {
                Ok(keys) => keys,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to list meta keys, omitting custom fields");
                    Vec::new()
                }
            };
            let items = db
                .recent_feed_items(limit)
                .await
                .context("Failed to load posts")?;

            let env = FeedRenderEnv { meta_keys };
            let xml = render_rss(&config.channel(), &items, &hooks, &env)?;
            println!("{xml}");
        }
        Command::Import {
            source,
            block,
            merge,
        } => {
            let options = config.fetch_options();
            let client = feed_client(&options).context("Failed to build HTTP client")?;
            let items = load_feed(&client, &source, &options)
                .await
                .with_context(|| format!("Failed to load feed from {source}"))?;

            let output = if merge {
                let context = items.iter().fold(RenderContext::new(), |context, item| {
                    hooks.filter_item_context(context, &block, item)
                });
                serde_json::to_string_pretty(&context)?
            } else {
                let contexts: Vec<RenderContext> = items
                    .iter()
                    .map(|item| hooks.filter_item_context(item.base_context(), &block, item))
                    .collect();
                serde_json::to_string_pretty(&contexts)?
            };
            println!("{output}");
        }
        Command::MetaKeys => {
            let db = open_database(&db_path).await?;
            let keys = site_meta_keys(&db, &db, config.meta_keys_ttl())
                .await
                .context("Failed to list meta keys")?;
            for key in keys {
                println!("{key}");
            }
        }
        Command::InnerBlocks { block, existing } => {
            for allowed in hooks.filter_supported_inner_blocks(existing, &block) {
                println!("{allowed}");
            }
        }
        Command::AddPost {
            title,
            link,
            content,
            published,
            meta,
            image_url,
            image_title,
            image_alt,
        } => {
            let db = open_database(&db_path).await?;
            let post = NewPost {
                link,
                content,
                published: Some(published.unwrap_or_else(|| chrono::Utc::now().timestamp())),
                ..NewPost::post(&title)
            };
            let post_id = db.insert_post(&post).await.context("Failed to add post")?;

            for (key, value) in &meta {
                db.set_post_meta(post_id, key, value)
                    .await
                    .with_context(|| format!("Failed to set meta '{key}'"))?;
            }

            if let Some(url) = image_url {
                let image_id = db
                    .insert_post(&NewPost::attachment(&image_title, &url))
                    .await
                    .context("Failed to add image attachment")?;
                if !image_alt.is_empty() {
                    db.set_post_meta(image_id, ATTACHMENT_ALT_META_KEY, &image_alt)
                        .await
                        .context("Failed to set image alt text")?;
                }
                db.set_featured_image(post_id, image_id)
                    .await
                    .context("Failed to set featured image")?;
            }

            tracing::info!(post_id, fields = meta.len(), "Post added");
            println!("{post_id}");
        }
    }

    Ok(())
}
