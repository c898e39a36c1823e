//! MFC CLI - Media Frames dataset tools
//!
//! Usage:
//!   mfc queries
//!   mfc assemble
//!   mfc load-frac [--csv <path>]
//!   mfc load-semeval [--dir <path>]
//!   mfc fix-frames [--table <name>]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use mfc_core::{AppConfig, DatasetStore, LoggingConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mfc")]
#[command(about = "Media Frames Corpus assembly and gold-standard loading")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset directory (overrides config and MFC_BASE_DIR)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write headline search query batches for the metadata articles
    Queries {
        /// Maximum characters per query
        #[arg(long)]
        max_chars: Option<usize>,
    },
    /// Match downloaded documents to articles and write the corpus
    Assemble,
    /// Load the FrAC gold standard into PostgreSQL
    LoadFrac {
        /// Gold standard CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Load SemEval 2023 task 3 subtask 2 into PostgreSQL
    LoadSemeval {
        /// Directory holding the split folders and label files
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Convert a text frame column into a cleaned text[] column
    FixFrames {
        /// Table with `url` and `text_generic_frame` columns
        #[arg(long)]
        table: Option<String>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    if let Some(dir) = &cli.base_dir {
        config.paths.base_dir = dir.clone();
    }
    Ok(config)
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// A path given on the command line, or the configured one under the project root
fn gold_input(flag: Option<PathBuf>, configured: &Path, config: &AppConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.paths.resolve_project(configured))
}

async fn connect(config: &AppConfig) -> anyhow::Result<DatasetStore> {
    DatasetStore::connect(&config.database)
        .await
        .context("could not connect to PostgreSQL")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let mut config = load_config(&cli).context("invalid configuration")?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Queries { max_chars } => {
            if let Some(max) = max_chars {
                config.queries.max_query_chars = max;
            }
            let manifest = mfc_assembler::run_queries(&config).context("query generation failed")?;
            println!(
                "Wrote {} queries covering {} articles to {}",
                manifest.total_batches,
                manifest.total_articles,
                config.paths.resolve(&config.paths.query_dir).display()
            );
        }
        Commands::Assemble => {
            let report = mfc_assembler::run_assembly(&config).context("assembly failed")?;
            println!("Articles:          {}", report.total_articles);
            println!("Documents found:   {}", report.documents_found);
            println!(
                "Matched:           {} ({} by filename, {} by content)",
                report.matched, report.matched_by_filename, report.matched_by_content
            );
            println!("Unmatched files:   {}", report.unmatched_files_count);
            println!("Missing articles:  {}", report.missing_articles_count);
        }
        Commands::LoadFrac { csv } => {
            let path = gold_input(csv, &config.gold.frac_csv, &config);
            let store = connect(&config).await?;
            let summary = mfc_gold::load_frac(&store, &path)
                .await
                .with_context(|| format!("failed to load {}", path.display()))?;
            store.close().await;

            println!("Inserted {} rows ({} in table)", summary.inserted, summary.table_rows);
            for (label, count) in summary.distribution {
                println!("  {label}: {count}");
            }
        }
        Commands::LoadSemeval { dir } => {
            let dir = gold_input(dir, &config.gold.semeval_dir, &config);
            let store = connect(&config).await?;
            let summary = mfc_gold::load_semeval(&store, &dir, &config.gold.semeval_splits)
                .await
                .with_context(|| format!("failed to load {}", dir.display()))?;
            store.close().await;

            println!("Total in database: {}", summary.table_rows);
            for split in summary.splits {
                println!(
                    "  {}: {} articles ({} labeled)",
                    split.split, split.articles, split.labeled
                );
            }
        }
        Commands::FixFrames { table } => {
            let table = table.unwrap_or_else(|| config.gold.framing_table.clone());
            let store = connect(&config).await?;
            let updated = mfc_gold::fix_frames(&store, &table)
                .await
                .with_context(|| format!("frame cleanup of {table} failed, no changes kept"))?;
            store.close().await;

            println!("Cleaned {updated} rows of {table}");
        }
    }

    info!("done");
    Ok(())
}
