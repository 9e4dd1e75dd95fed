use anyhow::Result;
use std::collections::BTreeMap;

use super::schema::Database;

/// LIKE pattern matching keys that start with a literal underscore.
const PRIVATE_KEY_PATTERN: &str = "\\_%";

impl Database {
    // ========================================================================
    // Post Meta Operations
    // ========================================================================

    /// Set a meta value on a post, replacing any previous value for the key.
    pub async fn set_post_meta(&self, post_id: i64, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO postmeta (post_id, meta_key, meta_value)
            VALUES (?, ?, ?)
            ON CONFLICT(post_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value
        "#,
        )
        .bind(post_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Single meta value for a post, if set.
    pub async fn get_post_meta(&self, post_id: i64, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT meta_value FROM postmeta WHERE post_id = ? AND meta_key = ?")
                .bind(post_id)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Remove a meta key from a post. Returns whether a value was removed.
    pub async fn delete_post_meta(&self, post_id: i64, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM postmeta WHERE post_id = ? AND meta_key = ?")
            .bind(post_id)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn all_post_meta(&self, post_id: i64) -> Result<BTreeMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT meta_key, meta_value FROM postmeta WHERE post_id = ?")
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    /// Distinct meta keys across all posts, excluding `_`-prefixed keys,
    /// sorted by key.
    pub async fn query_public_meta_keys(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT meta_key
            FROM postmeta
            WHERE meta_key NOT LIKE ? ESCAPE '\'
            ORDER BY meta_key
        "#,
        )
        .bind(PRIVATE_KEY_PATTERN)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}
