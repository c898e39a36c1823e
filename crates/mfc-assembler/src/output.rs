//! Corpus output
//!
//! One flat row per matched document. Annotation maps are embedded as JSON
//! text so every format stays one row per article.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray, UInt64Array};
use arrow_schema::{DataType, Field as ArrowField, Schema};
use mfc_core::Scalar;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};

use crate::{AssemblyError, MatchedDocument, Result};

/// A matched article with its text and labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRow {
    pub article_id: String,
    pub title: String,
    pub year: Option<Scalar>,
    pub month: Option<Scalar>,
    pub source: Option<String>,
    pub byline: Option<String>,
    pub section: Option<String>,
    pub length: Option<Scalar>,
    pub text: String,
    /// Length of `text` in characters
    pub text_length: usize,
    pub docx_file: String,
    pub match_method: String,
    pub frame_annotations: String,
    pub tone_annotations: String,
}

impl CorpusRow {
    /// Flatten a matched document found at `file`
    pub fn from_match((file, matched): (&str, &MatchedDocument<'_>)) -> Result<Self> {
        let article = matched.article;
        Ok(Self {
            article_id: article.id.clone(),
            title: article.title.clone(),
            year: article.year.clone(),
            month: article.month.clone(),
            source: article.source.clone(),
            byline: article.byline.clone(),
            section: article.section.clone(),
            length: article.length.clone(),
            text: matched.body_text.clone(),
            text_length: matched.body_text.chars().count(),
            docx_file: file.to_string(),
            match_method: matched.provenance.to_string(),
            frame_annotations: serde_json::to_string(&matched.frames)?,
            tone_annotations: serde_json::to_string(&matched.tones)?,
        })
    }
}

/// Write rows as a single Parquet row group.
///
/// Year, month and length become `Int64` columns when every present value is
/// an integer and `Utf8` columns otherwise.
pub fn write_parquet(path: &Path, rows: &[CorpusRow]) -> Result<()> {
    let (year_type, years) = scalar_column(rows.iter().map(|r| r.year.as_ref()).collect());
    let (month_type, months) = scalar_column(rows.iter().map(|r| r.month.as_ref()).collect());
    let (length_type, lengths) = scalar_column(rows.iter().map(|r| r.length.as_ref()).collect());

    let schema = Arc::new(Schema::new(vec![
        ArrowField::new("article_id", DataType::Utf8, false),
        ArrowField::new("title", DataType::Utf8, false),
        ArrowField::new("year", year_type, true),
        ArrowField::new("month", month_type, true),
        ArrowField::new("source", DataType::Utf8, true),
        ArrowField::new("byline", DataType::Utf8, true),
        ArrowField::new("section", DataType::Utf8, true),
        ArrowField::new("length", length_type, true),
        ArrowField::new("text", DataType::Utf8, false),
        ArrowField::new("text_length", DataType::UInt64, false),
        ArrowField::new("docx_file", DataType::Utf8, false),
        ArrowField::new("match_method", DataType::Utf8, false),
        ArrowField::new("frame_annotations", DataType::Utf8, false),
        ArrowField::new("tone_annotations", DataType::Utf8, false),
    ]));

    let text_lengths = UInt64Array::from(
        rows.iter()
            .map(|r| r.text_length as u64)
            .collect::<Vec<_>>(),
    );

    let batch = RecordBatch::try_new(
        schema,
        vec![
            text_column(rows, |r| r.article_id.as_str()),
            text_column(rows, |r| r.title.as_str()),
            years,
            months,
            optional_column(rows, |r| r.source.as_deref()),
            optional_column(rows, |r| r.byline.as_deref()),
            optional_column(rows, |r| r.section.as_deref()),
            lengths,
            text_column(rows, |r| r.text.as_str()),
            Arc::new(text_lengths),
            text_column(rows, |r| r.docx_file.as_str()),
            text_column(rows, |r| r.match_method.as_str()),
            text_column(rows, |r| r.frame_annotations.as_str()),
            text_column(rows, |r| r.tone_annotations.as_str()),
        ],
    )?;

    let parquet_err = |source| AssemblyError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|source| AssemblyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).map_err(parquet_err)?;
    writer.write(&batch).map_err(parquet_err)?;
    writer.close().map_err(parquet_err)?;
    Ok(())
}

fn text_column<'a>(rows: &'a [CorpusRow], field: impl Fn(&'a CorpusRow) -> &'a str) -> ArrayRef {
    let values: Vec<&str> = rows.iter().map(field).collect();
    Arc::new(StringArray::from(values))
}

fn optional_column<'a>(
    rows: &'a [CorpusRow],
    field: impl Fn(&'a CorpusRow) -> Option<&'a str>,
) -> ArrayRef {
    let values: Vec<Option<&str>> = rows.iter().map(field).collect();
    Arc::new(StringArray::from(values))
}

fn scalar_column(values: Vec<Option<&Scalar>>) -> (DataType, ArrayRef) {
    if values.iter().flatten().all(|v| matches!(v, Scalar::Int(_))) {
        let ints: Vec<Option<i64>> = values
            .iter()
            .copied()
            .map(|v| v.and_then(Scalar::as_int))
            .collect();
        (DataType::Int64, Arc::new(Int64Array::from(ints)))
    } else {
        let text: Vec<Option<String>> = values
            .iter()
            .copied()
            .map(|v| v.map(Scalar::to_string))
            .collect();
        (DataType::Utf8, Arc::new(StringArray::from(text)))
    }
}

/// Write rows as CSV with a header line
pub fn write_csv(path: &Path, rows: &[CorpusRow]) -> Result<()> {
    let csv_err = |source| AssemblyError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| AssemblyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write rows as JSON Lines
pub fn write_jsonl(path: &Path, rows: &[CorpusRow]) -> Result<()> {
    let io_err = |source| AssemblyError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n").map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}
