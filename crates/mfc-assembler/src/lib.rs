//! MFC Assembler - Media Frames Corpus assembly pipeline
//!
//! Resolves downloaded article files to records of the corpus metadata file
//! and produces the annotated dataset:
//!
//! 1. [`TitleIndex`] maps normalized titles to article records
//! 2. [`discover_documents`] lists the downloaded files in a stable order
//! 3. [`Matcher`] resolves each document, tracking claimed articles in a [`ClaimSet`]
//! 4. [`AssemblyReport`] summarizes the pass; [`output`] writes the corpus files
//!
//! [`queries`] produces the search query batches used to download the files
//! in the first place.

use std::path::PathBuf;

use mfc_core::{AppConfig, ArticleCorpus, CodeBook, CorpusError};
use mfc_parser::{ParserRegistry, TextExtractor};
use thiserror::Error;
use tracing::info;

pub mod annotations;
pub mod discovery;
pub mod index;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod queries;
pub mod report;

pub use annotations::{extract_frames, extract_tones, FrameLabels, ToneLabels};
pub use discovery::{discover_documents, InputDocument};
pub use index::{IndexEntry, TitleIndex};
pub use matcher::{ClaimSet, MatchOutcome, MatchResult, MatchedDocument, Matcher, Provenance};
pub use normalize::normalize_title;
pub use output::CorpusRow;
pub use queries::{BatchInfo, BatchManifest, BatchStatus, ManifestArticle};
pub use report::{AssemblyReport, ReportLimits};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort an assembly or query run
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Parquet error on {}: {source}", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

// ============================================================================
// Assembly Run
// ============================================================================

/// Run a full assembly pass as configured: load metadata, match every
/// downloaded document, write the corpus files and the report.
///
/// Missing inputs fail before anything is written.
pub fn run_assembly(config: &AppConfig) -> Result<AssemblyReport> {
    let paths = &config.paths;
    let rules = &config.assembly;

    info!("Loading source data");
    let corpus = ArticleCorpus::from_path(&paths.resolve(&paths.metadata_file))?;
    let codes = CodeBook::from_path(&paths.resolve(&paths.codes_file))?;
    let index = TitleIndex::build(&corpus, &rules.source_filter);
    info!(
        articles = index.article_count(),
        titles = index.len(),
        duplicate_titles = index.duplicate_count(),
        code_definitions = codes.len(),
        source = %rules.source_filter,
        "loaded article metadata"
    );

    let downloads = paths.resolve(&paths.downloads_dir);
    let files = discover_documents(&downloads, &rules.document_extensions)?;
    info!(documents = files.len(), dir = %downloads.display(), "discovered documents");

    let registry = ParserRegistry::with_defaults();
    let extractor = TextExtractor::new(&rules.body_marker, rules.header_skip);
    let matcher = Matcher::new(&index, &extractor);
    let mut claims = ClaimSet::new();

    let results: Vec<MatchResult<'_>> = files
        .iter()
        .map(|path| {
            let document = InputDocument::load(path, &paths.base_dir, &registry);
            matcher.match_document(&document, &mut claims)
        })
        .collect();

    let report = AssemblyReport::summarize(
        index.articles(),
        files.len(),
        &results,
        ReportLimits::from(rules),
    );
    info!(
        matched = report.matched,
        unmatched_files = report.unmatched_files_count,
        missing_articles = report.missing_articles_count,
        "matching complete"
    );

    let rows = results
        .iter()
        .filter_map(MatchResult::matched)
        .map(CorpusRow::from_match)
        .collect::<Result<Vec<_>>>()?;

    if !rows.is_empty() {
        let parquet_path = paths.resolve(&paths.corpus_parquet);
        let csv_path = paths.resolve(&paths.corpus_csv);
        let jsonl_path = paths.resolve(&paths.corpus_jsonl);
        output::write_parquet(&parquet_path, &rows)?;
        output::write_csv(&csv_path, &rows)?;
        output::write_jsonl(&jsonl_path, &rows)?;
        info!(
            rows = rows.len(),
            parquet = %parquet_path.display(),
            csv = %csv_path.display(),
            jsonl = %jsonl_path.display(),
            "wrote corpus"
        );
    }

    let report_path = paths.resolve(&paths.report_file);
    report.write(&report_path)?;
    info!(path = %report_path.display(), "wrote assembly report");

    Ok(report)
}

// ============================================================================
// Query Generation
// ============================================================================

/// Write the headline search batches for every article of the configured source
pub fn run_queries(config: &AppConfig) -> Result<BatchManifest> {
    let paths = &config.paths;

    let corpus = ArticleCorpus::from_path(&paths.resolve(&paths.metadata_file))?;
    let articles = queries::select_articles(&corpus, &config.assembly.source_filter);
    info!(
        articles = articles.len(),
        source = %config.assembly.source_filter,
        "selected articles for search"
    );

    let batches = queries::generate_batches(&articles, config.queries.max_query_chars);
    let dir = paths.resolve(&paths.query_dir);
    let manifest = queries::write_query_batches(&dir, &batches)?;
    info!(
        batches = manifest.total_batches,
        dir = %dir.display(),
        "wrote search queries"
    );

    Ok(manifest)
}
