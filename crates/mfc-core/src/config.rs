//! MFC Configuration Management
//!
//! Handles configuration from environment variables and TOML config files,
//! with defaults matching the layout of the media frames dataset directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Corpus assembly rules
    pub assembly: AssemblyConfig,

    /// Search query batching
    pub queries: QueryConfig,

    /// Gold-standard dataset locations
    pub gold: GoldConfig,

    /// Database connection
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Apply environment variables on top of the current values (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(dir) = std::env::var("MFC_BASE_DIR") {
            self.paths.base_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("MFC_PROJECT_ROOT") {
            self.paths.project_root = PathBuf::from(dir);
        }
        if let Ok(skip) = std::env::var("MFC_HEADER_SKIP") {
            self.assembly.header_skip = skip.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MFC_HEADER_SKIP".to_string(),
                value: skip,
            })?;
        }

        // PostgreSQL: a full URL wins over the individual parts
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.postgres_url = url;
        } else if let Ok(name) = std::env::var("DB_NAME") {
            let port = match std::env::var("DB_PORT") {
                Ok(port) => port.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                    key: "DB_PORT".to_string(),
                    value: port,
                })?,
                Err(_) => 5432,
            };
            self.database.postgres_url = DatabaseConfig::url_from_parts(
                &std::env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string()),
                std::env::var("DB_PASSWORD").ok().as_deref(),
                &std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port,
                &name,
            );
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }
}

/// Input and output locations. Relative paths resolve against `base_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the dataset directory and the gold-standard downloads
    pub project_root: PathBuf,

    /// Dataset directory
    pub base_dir: PathBuf,

    /// Article metadata JSON (article id -> record)
    pub metadata_file: PathBuf,

    /// Code definitions JSON
    pub codes_file: PathBuf,

    /// Directory holding `batch_*` subfolders of downloaded documents
    pub downloads_dir: PathBuf,

    /// Assembled corpus as CSV
    pub corpus_csv: PathBuf,

    /// Assembled corpus as JSON Lines
    pub corpus_jsonl: PathBuf,

    /// Assembled corpus as Parquet
    pub corpus_parquet: PathBuf,

    /// Assembly report
    pub report_file: PathBuf,

    /// Search query batches and manifest
    pub query_dir: PathBuf,
}

impl PathsConfig {
    /// Resolve a configured path against the dataset directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Resolve a gold-standard path against the project root
    pub fn resolve_project(&self, path: &Path) -> PathBuf {
        self.project_root.join(path)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            base_dir: PathBuf::from("media_frames_corpus"),
            metadata_file: PathBuf::from("immigration.json"),
            codes_file: PathBuf::from("codes.json"),
            downloads_dir: PathBuf::from("downloads"),
            corpus_csv: PathBuf::from("immigration_corpus.csv"),
            corpus_jsonl: PathBuf::from("immigration_corpus.jsonl"),
            corpus_parquet: PathBuf::from("immigration_corpus.parquet"),
            report_file: PathBuf::from("assembly_report.json"),
            query_dir: PathBuf::from("search_queries"),
        }
    }
}

/// Corpus assembly rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Only articles from this source (case-insensitive, exact) are indexed
    pub source_filter: String,

    /// Paragraph text that separates the metadata header from the body
    pub body_marker: String,

    /// Paragraphs skipped as metadata header when no body marker is present
    pub header_skip: usize,

    /// Document file extensions picked up during discovery (case-insensitive)
    pub document_extensions: Vec<String>,

    /// Unmatched documents listed in the report
    pub unmatched_sample: usize,

    /// Unclaimed articles listed in the report
    pub missing_sample: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            source_filter: "new york times".to_string(),
            body_marker: "body".to_string(),
            header_skip: 10,
            document_extensions: vec!["docx".to_string()],
            unmatched_sample: 50,
            missing_sample: 20,
        }
    }
}

/// Search query batching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum characters of a single search query
    pub max_query_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_query_chars: 5000,
        }
    }
}

/// Gold-standard dataset locations, relative to `paths.project_root`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldConfig {
    /// FrAC single-label CSV (`sentence`, `label`)
    pub frac_csv: PathBuf,

    /// SemEval 2023 task 3 English data directory
    pub semeval_dir: PathBuf,

    /// SemEval splits to load, in order
    pub semeval_splits: Vec<String>,

    /// Table whose `text_generic_frame` column is cleaned by `fix-frames`
    pub framing_table: String,
}

impl Default for GoldConfig {
    fn default() -> Self {
        Self {
            frac_csv: PathBuf::from("FrAC/gold_standard_single_label_all.csv"),
            semeval_dir: PathBuf::from("sem_eval_23/data/en"),
            semeval_splits: vec!["train".to_string(), "dev".to_string(), "test".to_string()],
            framing_table: "mm_framing_full".to_string(),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub postgres_url: String,

    /// PostgreSQL connection pool size
    pub postgres_pool_size: u32,

    /// Rows per bulk insert/update statement
    pub page_size: usize,
}

impl DatabaseConfig {
    /// Build a connection URL from individual parts
    pub fn url_from_parts(
        user: &str,
        password: Option<&str>,
        host: &str,
        port: u16,
        name: &str,
    ) -> String {
        match password.filter(|p| !p.is_empty()) {
            Some(password) => format!("postgres://{user}:{password}@{host}:{port}/{name}"),
            None => format!("postgres://{user}@{host}:{port}/{name}"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: "postgres://postgres@localhost:5432/mfc".to_string(),
            postgres_pool_size: 5,
            page_size: 10_000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
