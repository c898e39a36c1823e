//! Title index over the article corpus

use std::collections::HashMap;

use mfc_core::{ArticleCorpus, ArticleRecord};

use crate::normalize_title;

/// Records sharing one normalized title
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEntry<'a> {
    Single(&'a ArticleRecord),
    /// Colliding titles, in corpus order
    Many(Vec<&'a ArticleRecord>),
}

impl<'a> IndexEntry<'a> {
    fn push(&mut self, record: &'a ArticleRecord) {
        match self {
            IndexEntry::Single(first) => {
                let first = *first;
                *self = IndexEntry::Many(vec![first, record]);
            }
            IndexEntry::Many(records) => records.push(record),
        }
    }

    /// All records of the entry in insertion order
    pub fn records(&self) -> &[&'a ArticleRecord] {
        match self {
            IndexEntry::Single(record) => std::slice::from_ref(record),
            IndexEntry::Many(records) => records,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, IndexEntry::Many(_))
    }
}

/// Normalized title -> article record(s), restricted to one source.
///
/// Borrowed from the corpus and never modified after [`TitleIndex::build`].
#[derive(Debug, Clone)]
pub struct TitleIndex<'a> {
    entries: HashMap<String, IndexEntry<'a>>,
    articles: Vec<&'a ArticleRecord>,
}

impl<'a> TitleIndex<'a> {
    /// Index every record whose source matches `source` (case-insensitive)
    pub fn build(corpus: &'a ArticleCorpus, source: &str) -> Self {
        Self::from_records(corpus.from_source(source))
    }

    /// Index the given records as-is
    pub fn from_records(records: impl IntoIterator<Item = &'a ArticleRecord>) -> Self {
        let mut entries: HashMap<String, IndexEntry<'a>> = HashMap::new();
        let mut articles = Vec::new();

        for record in records {
            articles.push(record);
            let key = normalize_title(&record.title);
            match entries.get_mut(&key) {
                Some(entry) => entry.push(record),
                None => {
                    entries.insert(key, IndexEntry::Single(record));
                }
            }
        }

        Self { entries, articles }
    }

    /// Look up an already normalized key. The empty key never matches.
    pub fn get(&self, key: &str) -> Option<&IndexEntry<'a>> {
        // "" is shared by every blank or punctuation-only title and identifies no article
        if key.is_empty() {
            return None;
        }
        self.entries.get(key)
    }

    /// Normalize `title` and look it up
    pub fn lookup(&self, title: &str) -> Option<&IndexEntry<'a>> {
        self.get(&normalize_title(title))
    }

    /// Indexed articles in corpus order
    pub fn articles(&self) -> &[&'a ArticleRecord] {
        &self.articles
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// Number of distinct normalized titles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of titles shared by more than one record
    pub fn duplicate_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_duplicate()).count()
    }
}
