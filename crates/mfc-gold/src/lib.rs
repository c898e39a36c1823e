//! MFC Gold - gold-standard framing datasets
//!
//! Loads external framing benchmarks into PostgreSQL next to the assembled
//! corpus, using the Media Frames Corpus label names throughout:
//!
//! - [`frac`]: the FrAC sentence-level gold standard (CSV)
//! - [`semeval`]: SemEval 2023 Task 3 subtask 2 article-level frames
//! - [`frames`]: cleanup of free-text frame lists into canonical label arrays
//!
//! Database access goes through [`GoldStandardRepository`], implemented for
//! [`mfc_core::DatasetStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mfc_core::CorpusError;
use thiserror::Error;
use tracing::{info, warn};

pub mod frac;
pub mod frames;
pub mod repository;
pub mod semeval;

pub use frac::{FracRecord, FracRow, PreparedFrac};
pub use frames::{clean_frame_row, FrameUpdate};
pub use repository::{GoldStandardRepository, SplitSummary};
pub use semeval::SemEvalArticle;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum GoldError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl GoldError {
    pub(crate) fn db(context: &str, e: sqlx::Error) -> Self {
        Self::Database(format!("{context}: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, GoldError>;

// ============================================================================
// Load Runs
// ============================================================================

/// Outcome of a FrAC load
#[derive(Debug, Clone, PartialEq)]
pub struct FracLoadSummary {
    pub inserted: u64,
    pub unmapped_codes: Vec<i32>,
    pub table_rows: i64,
    pub distribution: Vec<(String, i64)>,
}

/// Read the FrAC CSV and append it to `frac_gold_standard`
pub async fn load_frac<R>(repo: &R, csv_path: &Path) -> Result<FracLoadSummary>
where
    R: GoldStandardRepository + ?Sized,
{
    repo.create_frac_table().await?;

    let records = frac::read_csv(csv_path)?;
    info!(rows = records.len(), path = %csv_path.display(), "read FrAC gold standard");

    let prepared = frac::prepare_rows(records);
    if !prepared.unmapped.is_empty() {
        warn!(codes = ?prepared.unmapped, "unmapped FrAC labels, stored as Unknown");
    }

    let inserted = repo.insert_frac_rows(&prepared.rows).await?;
    let table_rows = repo.count_rows(frac::TABLE).await?;
    let distribution = repo.frac_label_distribution().await?;

    info!(inserted, table_rows, "loaded FrAC gold standard");
    for (label, count) in &distribution {
        info!(label = %label, count, "FrAC label");
    }

    Ok(FracLoadSummary {
        inserted,
        unmapped_codes: prepared.unmapped.into_iter().collect(),
        table_rows,
        distribution,
    })
}

/// Outcome of a SemEval load
#[derive(Debug, Clone, PartialEq)]
pub struct SemEvalLoadSummary {
    /// Articles read per split; skipped splits are absent
    pub loaded: BTreeMap<String, usize>,
    pub table_rows: i64,
    pub splits: Vec<SplitSummary>,
    pub frame_distribution: Vec<(String, i64)>,
}

/// Upsert every available split under `data_dir` into `semeval_subtask2`
pub async fn load_semeval<R>(repo: &R, data_dir: &Path, splits: &[String]) -> Result<SemEvalLoadSummary>
where
    R: GoldStandardRepository + ?Sized,
{
    repo.create_semeval_table().await?;

    let mut loaded = BTreeMap::new();
    for split in splits {
        let Some(articles) = semeval::load_split(data_dir, split)? else {
            warn!(split = %split, "articles directory not found, skipping split");
            continue;
        };

        repo.upsert_semeval_articles(&articles).await?;
        info!(split = %split, articles = articles.len(), "loaded split");
        loaded.insert(split.clone(), articles.len());
    }

    let table_rows = repo.count_rows(semeval::TABLE).await?;
    let split_summary = repo.semeval_split_summary().await?;
    let frame_distribution = repo.semeval_frame_distribution().await?;

    info!(table_rows, "SemEval subtask 2 in database");
    for s in &split_summary {
        info!(split = %s.split, articles = s.articles, labeled = s.labeled, "split");
    }
    for (frame, count) in &frame_distribution {
        info!(frame = %frame, count, "frame");
    }

    Ok(SemEvalLoadSummary {
        loaded,
        table_rows,
        splits: split_summary,
        frame_distribution,
    })
}

/// Replace the free-text frame column of `table` with a cleaned `text[]` column
pub async fn fix_frames<R>(repo: &R, table: &str) -> Result<u64>
where
    R: GoldStandardRepository + ?Sized,
{
    let updated = repo.fix_frames(table).await?;
    info!(table = %table, rows = updated, "frame column is now a cleaned text[]");
    Ok(updated)
}
