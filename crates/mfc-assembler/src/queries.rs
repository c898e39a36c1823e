//! Headline search query batches
//!
//! The archive search box accepts queries up to a fixed length, so article
//! titles are packed greedily into `(headline("A") OR headline("B") ...)`
//! queries. Each batch is downloaded by hand into a `batch_NN` folder, which
//! is the layout [`crate::discover_documents`] reads back.

use std::path::Path;

use mfc_core::{ArticleCorpus, ArticleRecord, Scalar};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AssemblyError, Result};

// Characters of `headline("")` and ` OR headline("")`
const FIRST_TERM_OVERHEAD: usize = 12;
const NEXT_TERM_OVERHEAD: usize = 16;

/// Articles to search for: matching source, non-blank title, ordered by (year, month)
pub fn select_articles<'a>(corpus: &'a ArticleCorpus, source: &str) -> Vec<&'a ArticleRecord> {
    let mut articles: Vec<&ArticleRecord> = corpus
        .from_source(source)
        .filter(|a| !a.title.trim().is_empty())
        .collect();
    articles.sort_by_key(|a| (a.year_number().unwrap_or(0), a.month_number().unwrap_or(0)));
    articles
}

/// Escape double quotes for use inside a quoted search term
pub fn escape_title(title: &str) -> String {
    title.replace('"', "\\\"")
}

/// Pack articles into batches whose formatted query fits in `max_chars`
pub fn generate_batches<'a>(
    articles: &[&'a ArticleRecord],
    max_chars: usize,
) -> Vec<Vec<&'a ArticleRecord>> {
    let mut batches = Vec::new();
    let mut current: Vec<&ArticleRecord> = Vec::new();
    // Opening parenthesis
    let mut current_len = 1;

    for &article in articles {
        let title_len = escape_title(&article.title).chars().count();
        let cost = if current.is_empty() {
            FIRST_TERM_OVERHEAD + title_len
        } else {
            NEXT_TERM_OVERHEAD + title_len
        };

        // +1 for the closing parenthesis
        if current_len + cost + 1 > max_chars && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current.push(article);
            current_len = 1 + FIRST_TERM_OVERHEAD + title_len;
        } else {
            current.push(article);
            current_len += cost;
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

/// Format a batch as a headline query
pub fn format_query(batch: &[&ArticleRecord]) -> String {
    let terms: Vec<String> = batch
        .iter()
        .map(|a| format!("headline(\"{}\")", escape_title(&a.title)))
        .collect();
    format!("({})", terms.join(" OR "))
}

// ============================================================================
// Manifest
// ============================================================================

/// Download progress of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Pending,
    Downloaded,
    Processed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestArticle {
    pub id: String,
    pub title: String,
    pub year: Option<Scalar>,
    pub month: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchInfo {
    pub batch_id: String,
    pub article_count: usize,
    pub year_range: [Option<i64>; 2],
    pub query_length: usize,
    pub query_file: String,
    pub download_folder: String,
    pub status: BatchStatus,
    pub articles: Vec<ManifestArticle>,
}

/// Tracking file written next to the query batches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub total_articles: usize,
    pub total_batches: usize,
    pub batches: Vec<BatchInfo>,
}

impl BatchManifest {
    /// Describe `batches`; batch ids are 1-based and zero-padded
    pub fn new(batches: &[Vec<&ArticleRecord>]) -> Self {
        let infos = batches
            .iter()
            .enumerate()
            .map(|(i, batch)| {
                let batch_id = format!("{:02}", i + 1);
                let years = batch.iter().filter_map(|a| a.year_number());
                BatchInfo {
                    article_count: batch.len(),
                    year_range: [years.clone().min(), years.max()],
                    query_length: format_query(batch).chars().count(),
                    query_file: format!("batch_{batch_id}.txt"),
                    download_folder: format!("batch_{batch_id}"),
                    status: BatchStatus::Pending,
                    articles: batch
                        .iter()
                        .map(|a| ManifestArticle {
                            id: a.id.clone(),
                            title: a.title.clone(),
                            year: a.year.clone(),
                            month: a.month.clone(),
                        })
                        .collect(),
                    batch_id,
                }
            })
            .collect::<Vec<_>>();

        Self {
            total_articles: infos.iter().map(|b| b.article_count).sum(),
            total_batches: infos.len(),
            batches: infos,
        }
    }
}

/// Write one query file per batch plus `manifest.json` into `dir`
pub fn write_query_batches(dir: &Path, batches: &[Vec<&ArticleRecord>]) -> Result<BatchManifest> {
    let io_err = |path: &Path, source| AssemblyError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let manifest = BatchManifest::new(batches);
    for (info, batch) in manifest.batches.iter().zip(batches) {
        let path = dir.join(&info.query_file);
        std::fs::write(&path, format_query(batch)).map_err(|e| io_err(&path, e))?;
        info!(
            batch = %info.batch_id,
            articles = info.article_count,
            chars = info.query_length,
            "wrote query batch"
        );
    }

    let manifest_path = dir.join("manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .map_err(|e| io_err(&manifest_path, e))?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, title: &str, year: i64, month: i64) -> ArticleRecord {
        ArticleRecord::new(id, title)
            .with_source("New York Times")
            .with_date(year, month)
    }

    #[test]
    fn test_select_articles_filters_and_sorts() {
        let corpus: ArticleCorpus = vec![
            article("late", "Late", 2010, 1),
            article("blank", "   ", 2000, 1),
            article("early", "Early", 2001, 3),
            article("blog", "Blog", 1999, 1).with_source("New York Times Blogs"),
            article("earlier", "Earlier", 2001, 2),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = select_articles(&corpus, "new york times")
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["earlier", "early", "late"]);
    }

    #[test]
    fn test_format_query_escapes_quotes() {
        let a = article("1", "Say \"No\"", 2000, 1);
        let b = article("2", "Plain", 2000, 1);
        assert_eq!(
            format_query(&[&a, &b]),
            r#"(headline("Say \"No\"") OR headline("Plain"))"#
        );
    }

    #[test]
    fn test_batches_fit_the_limit() {
        let articles: Vec<ArticleRecord> = (0..40)
            .map(|i| article(&i.to_string(), &format!("Headline number {i}"), 2000, 1))
            .collect();
        let refs: Vec<&ArticleRecord> = articles.iter().collect();

        let batches = generate_batches(&refs, 200);

        assert!(batches.len() > 1);
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 40);
        for batch in &batches {
            assert!(format_query(batch).chars().count() <= 200);
        }
    }

    #[test]
    fn test_exact_fit_stays_in_one_batch() {
        // "(headline(\"ab\"))" is 1 + 12 + 2 + 1 = 16 chars
        let a = article("1", "ab", 2000, 1);
        let b = article("2", "cd", 2000, 1);
        let single = generate_batches(&[&a], 16);
        assert_eq!(single.len(), 1);

        // adding " OR headline(\"cd\")" needs 18 more
        assert_eq!(generate_batches(&[&a, &b], 34).len(), 1);
        assert_eq!(generate_batches(&[&a, &b], 33).len(), 2);
    }

    #[test]
    fn test_oversized_title_gets_its_own_batch() {
        let long = article("long", &"x".repeat(100), 2000, 1);
        let short = article("short", "y", 2000, 1);

        let batches = generate_batches(&[&long, &short], 50);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| !b.is_empty()));
    }

    #[test]
    fn test_write_query_batches() {
        let dir = tempfile::tempdir().unwrap();
        let a = article("1", "First", 2004, 2);
        let b = article("2", "Second", 2006, 7);
        let c = ArticleRecord::new("3", "Undated").with_source("New York Times");

        let manifest = write_query_batches(dir.path(), &[vec![&a, &b], vec![&c]]).unwrap();

        assert_eq!(manifest.total_articles, 3);
        assert_eq!(manifest.total_batches, 2);
        assert_eq!(manifest.batches[0].year_range, [Some(2004), Some(2006)]);
        assert_eq!(manifest.batches[1].year_range, [None, None]);
        assert_eq!(manifest.batches[1].download_folder, "batch_02");

        let query = std::fs::read_to_string(dir.path().join("batch_01.txt")).unwrap();
        assert_eq!(query, r#"(headline("First") OR headline("Second"))"#);
        assert_eq!(manifest.batches[0].query_length, query.len());

        let written: BatchManifest = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("manifest.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written, manifest);
    }
}
