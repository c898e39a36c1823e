//! Article metadata records
//!
//! The corpus metadata file is a JSON object keyed by article id. Field types
//! in the wild are loose (numbers as strings, nulls where objects are
//! expected), so fields are read leniently: a value that does not fit its
//! slot reads as absent instead of failing the whole file. Date and length
//! fields are kept exactly as written, see [`Scalar`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{CorpusError, Result};

// ============================================================================
// Annotations
// ============================================================================

/// A single annotated span. Only the code is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    #[serde(default, deserialize_with = "lenient_number")]
    pub code: Option<f64>,
}

impl AnnotationEntry {
    pub fn with_code(code: f64) -> Self {
        Self { code: Some(code) }
    }
}

/// Per-annotator framing and tone annotations.
///
/// Keys are raw annotator keys such as `annotator3_54.0_r`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, deserialize_with = "null_as_default")]
    pub framing: BTreeMap<String, Vec<AnnotationEntry>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tone: BTreeMap<String, Vec<AnnotationEntry>>,
}

// ============================================================================
// Scalar
// ============================================================================

/// A metadata value passed through unchanged: `2006`, `"May"`, `"1,204 words"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Integer reading of the value: integral numbers, truncated floats and
    /// strings holding only an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

// ============================================================================
// Article Record
// ============================================================================

/// One known source article from the corpus metadata file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Key of the record in the metadata file
    #[serde(skip)]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_title")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_scalar")]
    pub year: Option<Scalar>,

    #[serde(default, deserialize_with = "lenient_scalar")]
    pub month: Option<Scalar>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub byline: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub section: Option<String>,

    #[serde(default, deserialize_with = "lenient_scalar")]
    pub length: Option<Scalar>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Annotations,
}

impl ArticleRecord {
    /// Create a record with an id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the publication source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set year and month
    pub fn with_date(mut self, year: i64, month: i64) -> Self {
        self.year = Some(Scalar::Int(year));
        self.month = Some(Scalar::Int(month));
        self
    }

    /// Year as an integer, if it reads as one
    pub fn year_number(&self) -> Option<i64> {
        self.year.as_ref().and_then(Scalar::as_int)
    }

    /// Month as an integer, if it reads as one
    pub fn month_number(&self) -> Option<i64> {
        self.month.as_ref().and_then(Scalar::as_int)
    }

    /// Add a framing annotation under a raw annotator key
    pub fn with_frame(mut self, annotator_key: &str, code: f64) -> Self {
        self.annotations
            .framing
            .entry(annotator_key.to_string())
            .or_default()
            .push(AnnotationEntry::with_code(code));
        self
    }

    /// Add a tone annotation under a raw annotator key
    pub fn with_tone(mut self, annotator_key: &str, code: f64) -> Self {
        self.annotations
            .tone
            .entry(annotator_key.to_string())
            .or_default()
            .push(AnnotationEntry::with_code(code));
        self
    }

    /// Case-insensitive comparison of the source field; a missing source never matches
    /// a non-empty filter.
    pub fn is_from(&self, source: &str) -> bool {
        self.source.as_deref().unwrap_or_default().to_lowercase() == source.to_lowercase()
    }
}

// ============================================================================
// Article Corpus
// ============================================================================

/// All article records of a metadata file, in file order.
///
/// File order matters: it decides which record comes first when several
/// titles collide in the title index.
#[derive(Debug, Clone, Default)]
pub struct ArticleCorpus {
    records: Vec<ArticleRecord>,
    positions: HashMap<String, usize>,
}

impl ArticleCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the metadata file at `path`
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CorpusError::from_io(path, e))?;
        Self::from_json(&content).map_err(|source| CorpusError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Insert a record. A repeated id replaces the earlier record in place.
    pub fn insert(&mut self, record: ArticleRecord) {
        match self.positions.get(&record.id) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.positions.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ArticleRecord> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.records.iter()
    }

    /// Records whose source matches `source`, in file order
    pub fn from_source(&self, source: &str) -> impl Iterator<Item = &ArticleRecord> {
        let source = source.to_lowercase();
        self.records
            .iter()
            .filter(move |record| record.is_from(&source))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ArticleRecord> for ArticleCorpus {
    fn from_iter<I: IntoIterator<Item = ArticleRecord>>(iter: I) -> Self {
        let mut corpus = Self::new();
        for record in iter {
            corpus.insert(record);
        }
        corpus
    }
}

impl<'de> Deserialize<'de> for ArticleCorpus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CorpusVisitor;

        impl<'de> Visitor<'de> for CorpusVisitor {
            type Value = ArticleCorpus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of article id to article record")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut corpus = ArticleCorpus::new();
                while let Some((id, mut record)) = map.next_entry::<String, ArticleRecord>()? {
                    record.id = id;
                    corpus.insert(record);
                }
                Ok(corpus)
            }
        }

        deserializer.deserialize_map(CorpusVisitor)
    }
}

// ============================================================================
// Code Book
// ============================================================================

/// The code definitions file, carried through without interpretation
#[derive(Debug, Clone, Default)]
pub struct CodeBook(pub Value);

impl CodeBook {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CorpusError::from_io(path, e))?;
        let value = serde_json::from_str(&content).map_err(|source| CorpusError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self(value))
    }

    /// Number of top-level definitions
    pub fn len(&self) -> usize {
        match &self.0 {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Lenient field readers
// ============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn lenient_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(Scalar::Bool(b)),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| n.as_f64().map(Scalar::Float)),
        Some(Value::String(s)) => Some(Scalar::Text(s)),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_title<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}
