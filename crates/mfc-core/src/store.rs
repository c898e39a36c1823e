//! PostgreSQL dataset store
//!
//! Owns the connection pool shared by the gold-standard loaders.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::{CorpusError, DatabaseConfig, Result};

/// PostgreSQL dataset store
pub struct DatasetStore {
    pool: PgPool,
    page_size: usize,
}

impl DatasetStore {
    /// Create a new store connection
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.postgres_pool_size)
            .connect(&config.postgres_url)
            .await
            .map_err(|e| CorpusError::DatabaseError(format!("PostgreSQL connection failed: {e}")))?;

        info!(pool_size = config.postgres_pool_size, "connected to PostgreSQL");

        Ok(Self {
            pool,
            page_size: config.page_size.max(1),
        })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Rows per bulk statement
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Count the rows of `table`. The name is quoted as an identifier.
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let row: (i64,) = sqlx::query_as(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CorpusError::DatabaseError(format!("Failed to count {table}: {e}")))?;

        Ok(row.0)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Quote a SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("mm_framing_full"), "\"mm_framing_full\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
