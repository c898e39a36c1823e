//! PostgreSQL access for the gold-standard tables
//!
//! Bulk writes are sent as multi-row `VALUES` statements of at most
//! [`DatasetStore::page_size`] rows.

use async_trait::async_trait;
use mfc_core::store::quote_ident;
use mfc_core::DatasetStore;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::frames::prepare_updates;
use crate::{FracRow, GoldError, Result, SemEvalArticle};

/// Article and labeled counts of one SemEval split
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SplitSummary {
    pub split: String,
    pub articles: i64,
    pub labeled: i64,
}

/// Trait for gold-standard table operations
#[async_trait]
pub trait GoldStandardRepository: Send + Sync {
    /// Create `frac_gold_standard` and its indexes if missing
    async fn create_frac_table(&self) -> Result<()>;

    /// Append FrAC rows; returns the number inserted
    async fn insert_frac_rows(&self, rows: &[FracRow]) -> Result<u64>;

    /// `(label_frac, count)`, most frequent first
    async fn frac_label_distribution(&self) -> Result<Vec<(String, i64)>>;

    /// Create `semeval_subtask2` and its indexes if missing
    async fn create_semeval_table(&self) -> Result<()>;

    /// Insert or update articles keyed by `article_id`
    async fn upsert_semeval_articles(&self, articles: &[SemEvalArticle]) -> Result<u64>;

    /// Per-split article and labeled counts, ordered by split
    async fn semeval_split_summary(&self) -> Result<Vec<SplitSummary>>;

    /// `(frame, count)` over all labeled articles, most frequent first
    async fn semeval_frame_distribution(&self) -> Result<Vec<(String, i64)>>;

    async fn count_rows(&self, table: &str) -> Result<i64>;

    /// Convert the `text_generic_frame` column of `table` into a cleaned `text[]`.
    /// Returns the number of rows updated.
    async fn fix_frames(&self, table: &str) -> Result<u64>;
}

const FRAC_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS frac_gold_standard (
        id SERIAL PRIMARY KEY,
        sentence TEXT NOT NULL,
        label_numeric INTEGER NOT NULL,
        label_frac TEXT NOT NULL,
        label_mfc TEXT NOT NULL,
        source TEXT DEFAULT 'frac_gold_standard',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_frac_label_frac ON frac_gold_standard(label_frac)",
    "CREATE INDEX IF NOT EXISTS idx_frac_label_mfc ON frac_gold_standard(label_mfc)",
];

const SEMEVAL_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS semeval_subtask2 (
        id SERIAL PRIMARY KEY,
        article_id TEXT UNIQUE NOT NULL,
        title TEXT,
        text TEXT NOT NULL,
        frames_raw TEXT[],
        frames_mfc TEXT[],
        split TEXT NOT NULL,
        source TEXT DEFAULT 'semeval_2023_task3_subtask2_en',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_semeval_article_id ON semeval_subtask2(article_id)",
    "CREATE INDEX IF NOT EXISTS idx_semeval_split ON semeval_subtask2(split)",
    "CREATE INDEX IF NOT EXISTS idx_semeval_frames_mfc ON semeval_subtask2 USING GIN(frames_mfc)",
];

async fn execute_all(store: &DatasetStore, statements: &[&str], context: &str) -> Result<()> {
    for statement in statements {
        sqlx::query(statement)
            .execute(store.pool())
            .await
            .map_err(|e| GoldError::db(context, e))?;
    }
    Ok(())
}

#[async_trait]
impl GoldStandardRepository for DatasetStore {
    async fn create_frac_table(&self) -> Result<()> {
        execute_all(self, FRAC_DDL, "Failed to create frac_gold_standard").await
    }

    async fn insert_frac_rows(&self, rows: &[FracRow]) -> Result<u64> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| GoldError::db("Failed to begin transaction", e))?;

        let mut inserted = 0;
        for page in rows.chunks(self.page_size()) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO frac_gold_standard (sentence, label_numeric, label_frac, label_mfc) ",
            );
            builder.push_values(page, |mut b, row| {
                b.push_bind(&row.sentence)
                    .push_bind(row.label_numeric)
                    .push_bind(&row.label_frac)
                    .push_bind(&row.label_mfc);
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| GoldError::db("Failed to insert FrAC rows", e))?;
            inserted += result.rows_affected();
            debug!(rows = page.len(), "inserted FrAC page");
        }

        tx.commit()
            .await
            .map_err(|e| GoldError::db("Failed to commit FrAC rows", e))?;

        Ok(inserted)
    }

    async fn frac_label_distribution(&self) -> Result<Vec<(String, i64)>> {
        sqlx::query_as(
            r#"
            SELECT label_frac, COUNT(*) AS cnt
            FROM frac_gold_standard
            GROUP BY label_frac
            ORDER BY cnt DESC, label_frac
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| GoldError::db("Failed to read FrAC distribution", e))
    }

    async fn create_semeval_table(&self) -> Result<()> {
        execute_all(self, SEMEVAL_DDL, "Failed to create semeval_subtask2").await
    }

    async fn upsert_semeval_articles(&self, articles: &[SemEvalArticle]) -> Result<u64> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| GoldError::db("Failed to begin transaction", e))?;

        let mut written = 0;
        for page in articles.chunks(self.page_size()) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO semeval_subtask2 (article_id, title, text, frames_raw, frames_mfc, split) ",
            );
            builder.push_values(page, |mut b, article| {
                b.push_bind(&article.article_id)
                    .push_bind(&article.title)
                    .push_bind(&article.text)
                    .push_bind(&article.frames_raw)
                    .push_bind(&article.frames_mfc)
                    .push_bind(&article.split);
            });
            builder.push(
                r#"
                ON CONFLICT (article_id) DO UPDATE SET
                    title = EXCLUDED.title,
                    text = EXCLUDED.text,
                    frames_raw = EXCLUDED.frames_raw,
                    frames_mfc = EXCLUDED.frames_mfc,
                    split = EXCLUDED.split
                "#,
            );

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| GoldError::db("Failed to upsert SemEval articles", e))?;
            written += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| GoldError::db("Failed to commit SemEval articles", e))?;

        Ok(written)
    }

    async fn semeval_split_summary(&self) -> Result<Vec<SplitSummary>> {
        sqlx::query_as(
            r#"
            SELECT split,
                   COUNT(*) AS articles,
                   COUNT(*) FILTER (WHERE array_length(frames_mfc, 1) > 0) AS labeled
            FROM semeval_subtask2
            GROUP BY split
            ORDER BY split
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| GoldError::db("Failed to summarize SemEval splits", e))
    }

    async fn semeval_frame_distribution(&self) -> Result<Vec<(String, i64)>> {
        sqlx::query_as(
            r#"
            SELECT frame, COUNT(*) AS cnt
            FROM semeval_subtask2, unnest(frames_mfc) AS frame
            WHERE array_length(frames_mfc, 1) > 0
            GROUP BY frame
            ORDER BY cnt DESC, frame
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| GoldError::db("Failed to read SemEval frame distribution", e))
    }

    async fn count_rows(&self, table: &str) -> Result<i64> {
        Ok(DatasetStore::count_rows(self, table).await?)
    }

    async fn fix_frames(&self, table: &str) -> Result<u64> {
        let table = quote_ident(table);
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| GoldError::db("Failed to begin transaction", e))?;

        sqlx::query(&format!(
            "ALTER TABLE {table} ADD COLUMN IF NOT EXISTS frames_array text[]"
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| GoldError::db("Failed to add frames_array", e))?;

        let rows: Vec<(String, Option<String>)> = sqlx::query_as(&format!(
            "SELECT url, text_generic_frame FROM {table} WHERE url IS NOT NULL"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| GoldError::db("Failed to read frame column", e))?;
        info!(rows = rows.len(), "cleaning frame lists");

        let updates = prepare_updates(rows);
        let mut updated = 0;
        for page in updates.chunks(self.page_size()) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "UPDATE {table} AS t SET frames_array = v.new_frames FROM ("
            ));
            builder.push_values(page, |mut b, update| {
                b.push_bind(&update.frames).push_bind(&update.url);
            });
            builder.push(") AS v(new_frames, url_key) WHERE t.url = v.url_key");

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| GoldError::db("Failed to update frames_array", e))?;
            updated += result.rows_affected();
            debug!(rows = page.len(), "updated frame page");
        }

        for statement in [
            format!("ALTER TABLE {table} DROP COLUMN text_generic_frame"),
            format!("ALTER TABLE {table} RENAME COLUMN frames_array TO text_generic_frame"),
        ] {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| GoldError::db("Failed to swap frame columns", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| GoldError::db("Failed to commit frame cleanup", e))?;

        Ok(updated)
    }
}
