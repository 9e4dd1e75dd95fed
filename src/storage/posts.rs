use anyhow::Result;

use super::schema::Database;
use super::types::{
    FeaturedImage, FeedItem, NewPost, PostRow, ATTACHMENT_ALT_META_KEY, ATTACHMENT_POST_TYPE,
    THUMBNAIL_META_KEY,
};

impl Database {
    // ========================================================================
    // Post Operations
    // ========================================================================

    /// Insert a post (or attachment) and return its ID.
    pub async fn insert_post(&self, post: &NewPost) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO posts (post_type, title, link, content, published)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
        "#,
        )
        .bind(&post.post_type)
        .bind(&post.title)
        .bind(&post.link)
        .bind(&post.content)
        .bind(post.published)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Point a post's featured image at an attachment.
    pub async fn set_featured_image(&self, post_id: i64, attachment_id: i64) -> Result<()> {
        self.set_post_meta(post_id, THUMBNAIL_META_KEY, &attachment_id.to_string())
            .await
    }

    /// Load a post with all its meta and its resolved featured image.
    ///
    /// Returns `None` if no post with this ID exists. A dangling or
    /// non-numeric `_thumbnail_id` resolves to no featured image.
    pub async fn load_feed_item(&self, post_id: i64) -> Result<Option<FeedItem>> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT id, title, link, content, published FROM posts WHERE id = ?",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let meta = self.all_post_meta(row.id).await?;
        let featured_image = match meta.get(THUMBNAIL_META_KEY) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(attachment_id) => self.load_featured_image(attachment_id).await?,
                Err(_) => {
                    tracing::debug!(post_id = row.id, value = %raw, "Ignoring non-numeric thumbnail id");
                    None
                }
            },
            None => None,
        };

        Ok(Some(FeedItem {
            id: row.id,
            title: row.title,
            link: row.link,
            content: row.content,
            published: row.published,
            featured_image,
            meta,
        }))
    }

    /// Most recent non-attachment posts, newest first.
    pub async fn recent_feed_items(&self, limit: i64) -> Result<Vec<FeedItem>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM posts
            WHERE post_type <> ?
            ORDER BY published IS NULL, published DESC, id DESC
            LIMIT ?
        "#,
        )
        .bind(ATTACHMENT_POST_TYPE)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(ids.len());
        for (id,) in ids {
            if let Some(item) = self.load_feed_item(id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Resolve an attachment into a featured image.
    ///
    /// Attachments without a file URL count as missing.
    async fn load_featured_image(&self, attachment_id: i64) -> Result<Option<FeaturedImage>> {
        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT title, link FROM posts WHERE id = ? AND post_type = ?")
                .bind(attachment_id)
                .bind(ATTACHMENT_POST_TYPE)
                .fetch_optional(&self.pool)
                .await?;

        let Some((title, Some(url))) = row else {
            tracing::debug!(attachment_id, "Featured image attachment missing");
            return Ok(None);
        };
        if url.trim().is_empty() {
            return Ok(None);
        }

        let alt = self
            .get_post_meta(attachment_id, ATTACHMENT_ALT_META_KEY)
            .await?
            .unwrap_or_default();

        Ok(Some(FeaturedImage {
            attachment_id,
            url,
            title,
            alt,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, NewPost, ATTACHMENT_ALT_META_KEY, THUMBNAIL_META_KEY};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_post() {
        let db = test_db().await;
        assert!(db.load_feed_item(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_post_with_featured_image() {
        let db = test_db().await;
        let post_id = db.insert_post(&NewPost::post("Hello")).await.unwrap();
        let image_id = db
            .insert_post(&NewPost::attachment("Cover", "https://example.com/cover.jpg"))
            .await
            .unwrap();
        db.set_post_meta(image_id, ATTACHMENT_ALT_META_KEY, "A cover")
            .await
            .unwrap();
        db.set_featured_image(post_id, image_id).await.unwrap();

        let item = db.load_feed_item(post_id).await.unwrap().unwrap();
        let image = item.featured_image.unwrap();
        assert_eq!(image.attachment_id, image_id);
        assert_eq!(image.url, "https://example.com/cover.jpg");
        assert_eq!(image.title, "Cover");
        assert_eq!(image.alt, "A cover");
    }

    #[tokio::test]
    async fn test_featured_image_without_alt() {
        let db = test_db().await;
        let post_id = db.insert_post(&NewPost::post("Hello")).await.unwrap();
        let image_id = db
            .insert_post(&NewPost::attachment("Cover", "https://example.com/c.jpg"))
            .await
            .unwrap();
        db.set_featured_image(post_id, image_id).await.unwrap();

        let item = db.load_feed_item(post_id).await.unwrap().unwrap();
        assert_eq!(item.featured_image.unwrap().alt, "");
    }

    #[tokio::test]
    async fn test_dangling_thumbnail_is_ignored() {
        let db = test_db().await;
        let post_id = db.insert_post(&NewPost::post("Hello")).await.unwrap();
        db.set_post_meta(post_id, THUMBNAIL_META_KEY, "9999")
            .await
            .unwrap();

        let item = db.load_feed_item(post_id).await.unwrap().unwrap();
        assert!(item.featured_image.is_none());
    }

    #[tokio::test]
    async fn test_thumbnail_pointing_at_regular_post_is_ignored() {
        let db = test_db().await;
        let post_id = db.insert_post(&NewPost::post("Hello")).await.unwrap();
        let other_id = db.insert_post(&NewPost::post("Other")).await.unwrap();
        db.set_featured_image(post_id, other_id).await.unwrap();

        let item = db.load_feed_item(post_id).await.unwrap().unwrap();
        assert!(item.featured_image.is_none());
    }

    #[tokio::test]
    async fn test_recent_feed_items_order_and_attachments_excluded() {
        let db = test_db().await;
        let mut old = NewPost::post("Old");
        old.published = Some(1_700_000_000);
        let mut new = NewPost::post("New");
        new.published = Some(1_700_000_500);
        db.insert_post(&old).await.unwrap();
        db.insert_post(&new).await.unwrap();
        db.insert_post(&NewPost::attachment("Img", "https://example.com/i.png"))
            .await
            .unwrap();

        let items = db.recent_feed_items(10).await.unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);

        let limited = db.recent_feed_items(1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
