//! Discovery and loading of downloaded documents
//!
//! Downloads are grouped in batch subfolders (`downloads/batch_01/...`).
//! Batches and the files inside each batch are visited in name order so that
//! two runs over the same tree process documents identically.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mfc_core::CorpusError;
use mfc_parser::{FileType, ParsedDocument, ParserRegistry};
use tracing::{debug, warn};

use crate::{AssemblyError, Result};

/// List document files under the batch subfolders of `downloads`.
///
/// Only files whose extension is in `extensions` (case-insensitive) are kept.
/// Files directly inside `downloads` are ignored. A missing directory is fatal.
pub fn discover_documents(downloads: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !downloads.is_dir() {
        return Err(CorpusError::MissingInput {
            path: downloads.to_path_buf(),
        }
        .into());
    }

    let wanted: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut documents = Vec::new();

    for batch in sorted_entries(downloads)? {
        if !batch.is_dir() {
            continue;
        }

        for file in sorted_entries(&batch)? {
            let matches_extension = file
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| wanted.contains(&e.to_lowercase()));

            if file.is_file() && matches_extension && seen.insert(file.clone()) {
                documents.push(file);
            }
        }
    }

    Ok(documents)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| AssemblyError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_err)?;
    entries.sort();
    Ok(entries)
}

/// One downloaded file, parsed
#[derive(Debug, Clone)]
pub struct InputDocument {
    /// Location on disk
    pub path: PathBuf,

    /// Path as reported in outputs (relative to the dataset directory when possible)
    pub display_path: String,

    /// Title guess from the file name (the stem)
    pub filename_title: String,

    /// Parsed paragraphs; empty when the file could not be read
    pub parsed: ParsedDocument,
}

impl InputDocument {
    /// Parse the file at `path`. Unreadable or malformed files degrade to an
    /// empty document instead of failing the run.
    pub fn load(path: &Path, base_dir: &Path, registry: &ParserRegistry) -> Self {
        let parsed = match registry.parse(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not parse document, continuing without content");
                ParsedDocument::empty(path.display().to_string(), FileType::from_path(path))
            }
        };
        debug!(path = %path.display(), paragraphs = parsed.paragraphs.len(), "loaded document");

        let display_path = path
            .strip_prefix(base_dir)
            .unwrap_or(path)
            .display()
            .to_string();

        Self::from_parsed(path, display_path, parsed)
    }

    /// Wrap an already parsed document
    pub fn from_parsed(path: &Path, display_path: impl Into<String>, parsed: ParsedDocument) -> Self {
        Self {
            path: path.to_path_buf(),
            display_path: display_path.into(),
            filename_title: filename_title(path),
            parsed,
        }
    }
}

/// File name without its extension
pub fn filename_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
