//! Assembly report
//!
//! Summarizes one assembly pass. Sample lists are capped so the report stays
//! small whatever the corpus size.

use std::collections::HashSet;
use std::path::Path;

use mfc_core::{ArticleRecord, AssemblyConfig};
use serde::{Deserialize, Serialize};

use crate::{AssemblyError, MatchOutcome, MatchResult, Provenance, Result};

/// Sample caps for the report lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLimits {
    pub unmatched_sample: usize,
    pub missing_sample: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self::from(&AssemblyConfig::default())
    }
}

impl From<&AssemblyConfig> for ReportLimits {
    fn from(config: &AssemblyConfig) -> Self {
        Self {
            unmatched_sample: config.unmatched_sample,
            missing_sample: config.missing_sample,
        }
    }
}

/// A document that matched no article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedFile {
    pub file: String,
    pub filename_title: String,
    pub content_title: Option<String>,
}

/// Summary of an assembly pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Articles eligible for matching (after the source filter)
    pub total_articles: usize,
    pub documents_found: usize,
    pub matched: usize,
    pub matched_by_filename: usize,
    pub matched_by_content: usize,
    /// Matches that reused an already claimed article
    pub reclaimed_matches: usize,
    pub unmatched_files: Vec<UnmatchedFile>,
    pub unmatched_files_count: usize,
    pub missing_articles_count: usize,
    /// Never-claimed article ids, sorted
    pub missing_articles_sample: Vec<String>,
}

impl AssemblyReport {
    /// Build the report from the indexed articles and the match results
    pub fn summarize(
        articles: &[&ArticleRecord],
        documents_found: usize,
        results: &[MatchResult<'_>],
        limits: ReportLimits,
    ) -> Self {
        let mut claimed = HashSet::new();
        let mut matched_by_filename = 0;
        let mut matched_by_content = 0;
        let mut reclaimed_matches = 0;
        let mut unmatched = Vec::new();

        for result in results {
            match &result.outcome {
                MatchOutcome::Matched(m) => {
                    claimed.insert(m.article.id.as_str());
                    match m.provenance {
                        Provenance::Filename => matched_by_filename += 1,
                        Provenance::Content => matched_by_content += 1,
                    }
                    if m.reclaimed {
                        reclaimed_matches += 1;
                    }
                }
                MatchOutcome::Unmatched {
                    filename_title,
                    content_title,
                } => unmatched.push(UnmatchedFile {
                    file: result.file.clone(),
                    filename_title: filename_title.clone(),
                    content_title: content_title.clone(),
                }),
            }
        }

        let mut missing: Vec<&str> = articles
            .iter()
            .map(|a| a.id.as_str())
            .filter(|id| !claimed.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();

        let unmatched_files_count = unmatched.len();
        unmatched.truncate(limits.unmatched_sample);

        Self {
            total_articles: articles.len(),
            documents_found,
            matched: matched_by_filename + matched_by_content,
            matched_by_filename,
            matched_by_content,
            reclaimed_matches,
            unmatched_files: unmatched,
            unmatched_files_count,
            missing_articles_count: missing.len(),
            missing_articles_sample: missing
                .into_iter()
                .take(limits.missing_sample)
                .map(str::to_string)
                .collect(),
        }
    }

    /// Write the report as pretty JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| AssemblyError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
