use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process holds a lock on the database
    #[error("The database is locked by another process. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

// ============================================================================
// Helper Types
// ============================================================================

/// Post type used for media attachments.
pub const ATTACHMENT_POST_TYPE: &str = "attachment";

/// Meta key on a post pointing at its featured image attachment.
pub const THUMBNAIL_META_KEY: &str = "_thumbnail_id";

/// Meta key on an attachment holding its alt text.
pub const ATTACHMENT_ALT_META_KEY: &str = "_wp_attachment_image_alt";

/// Post to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_type: String,
    pub title: String,
    /// Permalink for posts, file URL for attachments.
    pub link: Option<String>,
    pub content: Option<String>,
    pub published: Option<i64>,
}

impl NewPost {
    pub fn post(title: &str) -> Self {
        Self {
            post_type: "post".to_string(),
            title: title.to_string(),
            link: None,
            content: None,
            published: None,
        }
    }

    pub fn attachment(title: &str, url: &str) -> Self {
        Self {
            post_type: ATTACHMENT_POST_TYPE.to_string(),
            title: title.to_string(),
            link: Some(url.to_string()),
            content: None,
            published: None,
        }
    }
}

/// Internal row type for post queries (used by sqlx FromRow)
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PostRow {
    pub id: i64,
    pub title: String,
    pub link: Option<String>,
    pub content: Option<String>,
    pub published: Option<i64>,
}

// ============================================================================
// Data Structures
// ============================================================================

/// A post's featured image, resolved from its attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedImage {
    pub attachment_id: i64,
    pub url: String,
    pub title: String,
    pub alt: String,
}

/// Read-only snapshot of a post as it is serialized into a feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    pub link: Option<String>,
    pub content: Option<String>,
    /// Unix timestamp
    pub published: Option<i64>,
    pub featured_image: Option<FeaturedImage>,
    /// All meta of the post, private keys included.
    pub meta: BTreeMap<String, String>,
}

impl FeedItem {
    /// Meta value for `key`, or "" when the post has none.
    pub fn meta_value(&self, key: &str) -> &str {
        self.meta.get(key).map(String::as_str).unwrap_or_default()
    }
}
