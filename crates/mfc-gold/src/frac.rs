//! FrAC gold standard
//!
//! Sentences labeled with a numeric Media Frames Corpus code. FrAC collapses
//! the 15 frames into a coarser scheme: Legality and Crime are merged, as are
//! Policy and Political, and Capacity and External Regulation are dropped.
//! Both the FrAC name and the MFC name are stored for each row.

use std::collections::BTreeSet;
use std::path::Path;

use mfc_core::{CorpusError, Frame};
use serde::Deserialize;

use crate::{GoldError, Result};

pub const TABLE: &str = "frac_gold_standard";

/// Label used on both schemes when a code has no FrAC mapping
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One CSV line
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FracRecord {
    pub sentence: String,
    pub label: i32,
}

/// A row of `frac_gold_standard`
#[derive(Debug, Clone, PartialEq)]
pub struct FracRow {
    pub sentence: String,
    pub label_numeric: i32,
    pub label_frac: String,
    pub label_mfc: String,
}

/// Rows ready to insert plus the codes that had no mapping
#[derive(Debug, Clone, Default)]
pub struct PreparedFrac {
    pub rows: Vec<FracRow>,
    pub unmapped: BTreeSet<i32>,
}

/// FrAC label of an MFC frame; `None` for frames FrAC does not use
pub fn frac_label(frame: Frame) -> Option<&'static str> {
    let label = match frame {
        Frame::Economic => "Economic",
        Frame::Morality => "Morality",
        Frame::FairnessAndEquality => "Fairness and Equality",
        Frame::Legality | Frame::CrimeAndPunishment => "Legality and Crime",
        Frame::PolicyPrescription | Frame::Political => "Political and Policies",
        Frame::SecurityAndDefense => "Security and Defense",
        Frame::HealthAndSafety => "Health and Safety",
        Frame::QualityOfLife => "Quality of Life",
        Frame::CulturalIdentity => "Cultural Identity",
        Frame::PublicOpinion => "Public Opinion",
        Frame::Other => "Other",
        Frame::CapacityAndResources | Frame::ExternalRegulation => return None,
    };
    Some(label)
}

/// `(frac label, mfc label)` for a numeric code
pub fn map_code(code: i32) -> Option<(&'static str, &'static str)> {
    let frame = u8::try_from(code).ok().and_then(Frame::from_code)?;
    Some((frac_label(frame)?, frame.label()))
}

/// Read the gold standard CSV (`sentence`, `label` columns)
pub fn read_csv(path: &Path) -> Result<Vec<FracRecord>> {
    if !path.is_file() {
        return Err(CorpusError::MissingInput {
            path: path.to_path_buf(),
        }
        .into());
    }

    let csv_err = |source| GoldError::Csv {
        path: path.to_path_buf(),
        source,
    };

    csv::Reader::from_path(path)
        .map_err(csv_err)?
        .deserialize()
        .collect::<std::result::Result<Vec<FracRecord>, _>>()
        .map_err(csv_err)
}

/// Attach both label names to every record
pub fn prepare_rows(records: Vec<FracRecord>) -> PreparedFrac {
    let mut prepared = PreparedFrac::default();

    for record in records {
        let (frac, mfc) = map_code(record.label).unwrap_or_else(|| {
            prepared.unmapped.insert(record.label);
            (UNKNOWN_LABEL, UNKNOWN_LABEL)
        });
        prepared.rows.push(FracRow {
            sentence: record.sentence,
            label_numeric: record.label,
            label_frac: frac.to_string(),
            label_mfc: mfc.to_string(),
        });
    }

    prepared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_labels() {
        assert_eq!(
            map_code(5),
            Some(("Legality and Crime", "Legality, constitutionality and jurisprudence"))
        );
        assert_eq!(map_code(7), Some(("Legality and Crime", "Crime and punishment")));
        assert_eq!(
            map_code(6),
            Some(("Political and Policies", "Policy prescription and evaluation"))
        );
        assert_eq!(map_code(13), Some(("Political and Policies", "Political")));
        assert_eq!(map_code(4), Some(("Fairness and Equality", "Fairness and equality")));
    }

    #[test]
    fn test_dropped_and_invalid_codes() {
        assert_eq!(map_code(2), None);
        assert_eq!(map_code(14), None);
        assert_eq!(map_code(0), None);
        assert_eq!(map_code(-1), None);
        assert_eq!(map_code(300), None);
    }

    #[test]
    fn test_prepare_rows_collects_unmapped() {
        let records = vec![
            FracRecord {
                sentence: "a".into(),
                label: 2,
            },
            FracRecord {
                sentence: "b".into(),
                label: 15,
            },
            FracRecord {
                sentence: "c".into(),
                label: 2,
            },
            FracRecord {
                sentence: "d".into(),
                label: 99,
            },
        ];

        let prepared = prepare_rows(records);

        assert_eq!(prepared.rows.len(), 4);
        assert_eq!(prepared.unmapped.into_iter().collect::<Vec<_>>(), vec![2, 99]);
        assert_eq!(prepared.rows[0].label_frac, UNKNOWN_LABEL);
        assert_eq!(prepared.rows[0].label_mfc, UNKNOWN_LABEL);
        assert_eq!(prepared.rows[1].label_frac, "Other");
        assert_eq!(prepared.rows[1].label_numeric, 15);
    }

    #[test]
    fn test_read_csv_rejects_bad_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold.csv");
        std::fs::write(&path, "sentence,label\nfine,1\nbroken,abc\n").unwrap();

        assert!(matches!(read_csv(&path), Err(GoldError::Csv { .. })));
    }
}
