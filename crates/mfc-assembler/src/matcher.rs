//! Document-to-article matching
//!
//! A document matches when its file name, or failing that its first content
//! paragraph, normalizes to a title in the [`TitleIndex`]. Each article can be
//! claimed once per run; the set of claimed ids is owned by the caller and
//! passed into every match, so results depend on processing order.

use std::collections::HashSet;

use mfc_core::ArticleRecord;
use mfc_parser::TextExtractor;
use serde::Serialize;
use tracing::{debug, warn};

use crate::annotations::{extract_frames, extract_tones, FrameLabels, ToneLabels};
use crate::{normalize_title, IndexEntry, InputDocument, TitleIndex};

// ============================================================================
// Claim tracking
// ============================================================================

/// Article ids already consumed by a match in the current run
#[derive(Debug, Clone, Default)]
pub struct ClaimSet {
    claimed: HashSet<String>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as claimed. Returns false if it already was.
    pub fn claim(&mut self, id: &str) -> bool {
        self.claimed.insert(id.to_string())
    }

    pub fn is_claimed(&self, id: &str) -> bool {
        self.claimed.contains(id)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

// ============================================================================
// Match results
// ============================================================================

/// Which title guess produced the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Filename,
    Content,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Content => "content",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document resolved to an article
#[derive(Debug, Clone)]
pub struct MatchedDocument<'a> {
    pub article: &'a ArticleRecord,
    pub provenance: Provenance,
    pub body_text: String,
    pub frames: FrameLabels,
    pub tones: ToneLabels,
    /// The article had already been claimed by an earlier document
    pub reclaimed: bool,
}

/// Disposition of one document
#[derive(Debug, Clone)]
pub enum MatchOutcome<'a> {
    Matched(MatchedDocument<'a>),
    Unmatched {
        filename_title: String,
        content_title: Option<String>,
    },
}

/// The result of matching one input document
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    /// Path of the document as reported in outputs
    pub file: String,
    pub outcome: MatchOutcome<'a>,
}

impl<'a> MatchResult<'a> {
    /// The matched document paired with its file, if any
    pub fn matched(&self) -> Option<(&str, &MatchedDocument<'a>)> {
        match &self.outcome {
            MatchOutcome::Matched(matched) => Some((self.file.as_str(), matched)),
            MatchOutcome::Unmatched { .. } => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Matched(_))
    }

    pub fn article_id(&self) -> Option<&str> {
        self.matched().map(|(_, m)| m.article.id.as_str())
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Resolves documents against a title index
pub struct Matcher<'i, 'a> {
    index: &'i TitleIndex<'a>,
    extractor: &'i TextExtractor,
}

impl<'i, 'a> Matcher<'i, 'a> {
    pub fn new(index: &'i TitleIndex<'a>, extractor: &'i TextExtractor) -> Self {
        Self { index, extractor }
    }

    /// Match one document, claiming the chosen article in `claims`.
    ///
    /// Never fails: a document without a matching title is `Unmatched`.
    pub fn match_document(&self, document: &InputDocument, claims: &mut ClaimSet) -> MatchResult<'a> {
        let content_title = self.extractor.extract_title(&document.parsed);

        let candidate = self
            .index
            .get(&normalize_title(&document.filename_title))
            .map(|entry| (entry, Provenance::Filename))
            .or_else(|| {
                let title = content_title.as_deref()?;
                self.index
                    .get(&normalize_title(title))
                    .map(|entry| (entry, Provenance::Content))
            });

        let Some((entry, provenance)) = candidate else {
            debug!(file = %document.display_path, "no matching title");
            return MatchResult {
                file: document.display_path.clone(),
                outcome: MatchOutcome::Unmatched {
                    filename_title: document.filename_title.clone(),
                    content_title,
                },
            };
        };

        let article = resolve(entry, claims);
        let reclaimed = !claims.claim(&article.id);
        if reclaimed {
            warn!(
                file = %document.display_path,
                article_id = %article.id,
                "every article with this title is already claimed, reusing the first"
            );
        }
        debug!(file = %document.display_path, article_id = %article.id, %provenance, "matched");

        MatchResult {
            file: document.display_path.clone(),
            outcome: MatchOutcome::Matched(MatchedDocument {
                article,
                provenance,
                body_text: self.extractor.extract_body(&document.parsed),
                frames: extract_frames(article),
                tones: extract_tones(article),
                reclaimed,
            }),
        }
    }
}

/// First unclaimed record of the entry, else its first record
fn resolve<'a>(entry: &IndexEntry<'a>, claims: &ClaimSet) -> &'a ArticleRecord {
    let records = entry.records();
    records
        .iter()
        .find(|record| !claims.is_claimed(&record.id))
        .copied()
        .unwrap_or(records[0])
}
