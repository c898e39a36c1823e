//! MFC Core - Domain models, configuration and shared types
//!
//! This crate defines the abstractions shared by the media frames toolkit:
//! - Article records and their annotations (the corpus metadata file)
//! - The frame vocabulary and tone labels
//! - Common error types
//! - Configuration management
//! - The PostgreSQL dataset store

pub mod article;
pub mod config;
pub mod store;

pub use article::{AnnotationEntry, Annotations, ArticleCorpus, ArticleRecord, CodeBook, Scalar};
pub use config::{
    AppConfig, AssemblyConfig, ConfigError, DatabaseConfig, GoldConfig, LoggingConfig,
    PathsConfig, QueryConfig,
};
pub use store::DatasetStore;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for corpus operations
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Required input not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CorpusError {
    /// Map an IO error on `path`, turning `NotFound` into [`CorpusError::MissingInput`]
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingInput { path }
        } else {
            Self::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, CorpusError>;

// ============================================================================
// Tone Labels
// ============================================================================

/// An annotator's judgment of a text's stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Pro,
    Neutral,
    Anti,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Neutral => "neutral",
            Self::Anti => "anti",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Frame Vocabulary
// ============================================================================

/// The fifteen generic frames of the Media Frames Corpus.
///
/// Discriminants are the numeric codes used by the annotation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Frame {
    Economic = 1,
    CapacityAndResources = 2,
    Morality = 3,
    FairnessAndEquality = 4,
    Legality = 5,
    PolicyPrescription = 6,
    CrimeAndPunishment = 7,
    SecurityAndDefense = 8,
    HealthAndSafety = 9,
    QualityOfLife = 10,
    CulturalIdentity = 11,
    PublicOpinion = 12,
    Political = 13,
    ExternalRegulation = 14,
    Other = 15,
}

impl Frame {
    /// All frames in code order
    pub const ALL: [Frame; 15] = [
        Frame::Economic,
        Frame::CapacityAndResources,
        Frame::Morality,
        Frame::FairnessAndEquality,
        Frame::Legality,
        Frame::PolicyPrescription,
        Frame::CrimeAndPunishment,
        Frame::SecurityAndDefense,
        Frame::HealthAndSafety,
        Frame::QualityOfLife,
        Frame::CulturalIdentity,
        Frame::PublicOpinion,
        Frame::Political,
        Frame::ExternalRegulation,
        Frame::Other,
    ];

    /// Look up a frame by its numeric code (1-15)
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Official label as written in the corpus codebook
    pub fn label(&self) -> &'static str {
        match self {
            Self::Economic => "Economic",
            Self::CapacityAndResources => "Capacity and resources",
            Self::Morality => "Morality",
            Self::FairnessAndEquality => "Fairness and equality",
            Self::Legality => "Legality, constitutionality and jurisprudence",
            Self::PolicyPrescription => "Policy prescription and evaluation",
            Self::CrimeAndPunishment => "Crime and punishment",
            Self::SecurityAndDefense => "Security and defense",
            Self::HealthAndSafety => "Health and safety",
            Self::QualityOfLife => "Quality of life",
            Self::CulturalIdentity => "Cultural identity",
            Self::PublicOpinion => "Public opinion",
            Self::Political => "Political",
            Self::ExternalRegulation => "External regulation and reputation",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive lookup by official label
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|frame| frame.label().to_lowercase() == wanted)
            .copied()
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_codes_round_trip() {
        for frame in Frame::ALL {
            assert_eq!(Frame::from_code(frame.code()), Some(frame));
        }
        assert_eq!(Frame::from_code(0), None);
        assert_eq!(Frame::from_code(16), None);
    }

    #[test]
    fn test_frame_from_label() {
        assert_eq!(Frame::from_label("economic"), Some(Frame::Economic));
        assert_eq!(
            Frame::from_label("  Legality, Constitutionality and Jurisprudence "),
            Some(Frame::Legality)
        );
        assert_eq!(Frame::from_label("Race and ethnicity"), None);
    }

    #[test]
    fn test_tone_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tone::Neutral).unwrap(), "\"neutral\"");
        assert_eq!(Tone::Anti.to_string(), "anti");
        assert!(Tone::Pro < Tone::Neutral && Tone::Neutral < Tone::Anti);
    }

    #[test]
    fn test_missing_input_error_mapping() {
        let err = CorpusError::from_io(
            "/nope/immigration.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, CorpusError::MissingInput { .. }));

        let err = CorpusError::from_io(
            "/nope/immigration.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, CorpusError::Io { .. }));
    }
}
