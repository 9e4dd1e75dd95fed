use anyhow::Result;
use std::time::Duration;

use super::schema::Database;
use crate::transients::TransientStore;

impl Database {
    // ========================================================================
    // Transient Operations
    // ========================================================================

    /// Delete all expired transients.
    ///
    /// Returns the number of entries evicted.
    pub async fn evict_expired_transients(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM transients WHERE expires_at <= datetime('now')")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

impl TransientStore for Database {
    async fn get_transient(&self, name: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT value FROM transients WHERE name = ? AND expires_at > datetime('now')",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set_transient(&self, name: &str, value: &str, ttl: Duration) -> Result<()> {
        let ttl_modifier = format!("+{} seconds", ttl.as_secs());

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO transients (name, value, expires_at)
            VALUES (?, ?, datetime('now', ?))
        "#,
        )
        .bind(name)
        .bind(value)
        .bind(&ttl_modifier)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
