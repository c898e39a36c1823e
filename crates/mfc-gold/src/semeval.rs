//! SemEval 2023 Task 3, subtask 2 (English)
//!
//! Article-level multi-label framing. Each split has a directory of
//! `article<ID>.txt` files and a tab-separated labels file.

use std::collections::HashMap;
use std::path::Path;

use mfc_core::Frame;
use tracing::{debug, warn};

use crate::{GoldError, Result};

pub const TABLE: &str = "semeval_subtask2";

/// One article row of `semeval_subtask2`
#[derive(Debug, Clone, PartialEq)]
pub struct SemEvalArticle {
    pub article_id: String,
    pub title: String,
    pub text: String,
    pub frames_raw: Vec<String>,
    pub frames_mfc: Vec<String>,
    pub split: String,
}

/// MFC frame for a SemEval frame name (`Crime_and_punishment`, ...)
pub fn frame_for(name: &str) -> Option<Frame> {
    let frame = match name {
        "Economic" => Frame::Economic,
        "Capacity_and_resources" => Frame::CapacityAndResources,
        "Morality" => Frame::Morality,
        "Fairness_and_equality" => Frame::FairnessAndEquality,
        "Legality_Constitutionality_and_jurisprudence" => Frame::Legality,
        "Policy_prescription_and_evaluation" => Frame::PolicyPrescription,
        "Crime_and_punishment" => Frame::CrimeAndPunishment,
        "Security_and_defense" => Frame::SecurityAndDefense,
        "Health_and_safety" => Frame::HealthAndSafety,
        "Quality_of_life" => Frame::QualityOfLife,
        "Cultural_identity" => Frame::CulturalIdentity,
        "Public_opinion" => Frame::PublicOpinion,
        "Political" => Frame::Political,
        "External_regulation_and_reputation" => Frame::ExternalRegulation,
        _ => return None,
    };
    Some(frame)
}

/// Rename frames to MFC labels. Unknown names are kept as they are.
pub fn normalize_frames(frames: &[String]) -> Vec<String> {
    frames
        .iter()
        .map(|name| match frame_for(name) {
            Some(frame) => frame.label().to_string(),
            None => {
                warn!(frame = %name, "unknown SemEval frame");
                name.clone()
            }
        })
        .collect()
}

/// Parse a labels file: `id<TAB>frame,frame,...` per line.
/// A line with only an id means the article has no frames.
pub fn parse_labels(content: &str) -> HashMap<String, Vec<String>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.split('\t');
            let id = parts.next().unwrap_or_default().trim().to_string();
            let frames = parts
                .next()
                .map(|frames| {
                    frames
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            (id, frames)
        })
        .collect()
}

/// Split an article file into `(title, text)`.
///
/// The title is the first line; the text starts at the third line.
pub fn parse_article(content: &str) -> (String, String) {
    let mut lines = content.split_inclusive('\n');
    let title = lines.next().unwrap_or_default().trim().to_string();
    let text = lines.skip(1).collect::<String>().trim().to_string();
    (title, text)
}

/// Article id from a file name: `article123.txt` -> `123`
pub fn article_id(file_name: &str) -> String {
    file_name.replace("article", "").replace(".txt", "")
}

/// Load one split. Returns `None` when its articles directory does not exist.
pub fn load_split(data_dir: &Path, split: &str) -> Result<Option<Vec<SemEvalArticle>>> {
    let articles_dir = data_dir.join(format!("{split}-articles-subtask-2"));
    let labels_file = data_dir.join(format!("{split}-labels-subtask-2.txt"));

    if !articles_dir.is_dir() {
        return Ok(None);
    }

    let labels = if labels_file.is_file() {
        let labels = parse_labels(&read(&labels_file)?);
        debug!(split = %split, entries = labels.len(), "read labels");
        labels
    } else {
        warn!(split = %split, "no labels file, articles will have no frames");
        HashMap::new()
    };

    let mut names: Vec<String> = std::fs::read_dir(&articles_dir)
        .map_err(|source| GoldError::Io {
            path: articles_dir.clone(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".txt") && !name.starts_with("._"))
        .collect();
    names.sort();

    let mut articles = Vec::new();
    for name in names {
        let (title, text) = parse_article(&read(&articles_dir.join(&name))?);
        if text.is_empty() {
            continue;
        }

        let id = article_id(&name);
        let frames_raw = labels.get(&id).cloned().unwrap_or_default();
        articles.push(SemEvalArticle {
            frames_mfc: normalize_frames(&frames_raw),
            frames_raw,
            article_id: id,
            title,
            text,
            split: split.to_string(),
        });
    }

    Ok(Some(articles))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| GoldError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_labels() {
        let labels = parse_labels(
            "111\tEconomic, Political\n\n222\n333\tCrime_and_punishment,,\n",
        );
        assert_eq!(labels["111"], vec!["Economic", "Political"]);
        assert!(labels["222"].is_empty());
        assert_eq!(labels["333"], vec!["Crime_and_punishment"]);
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_normalize_frames() {
        let frames = vec![
            "Legality_Constitutionality_and_jurisprudence".to_string(),
            "Made_up_frame".to_string(),
        ];
        assert_eq!(
            normalize_frames(&frames),
            vec!["Legality, constitutionality and jurisprudence", "Made_up_frame"]
        );
    }

    #[test]
    fn test_every_mfc_frame_except_other_has_a_name() {
        let named = Frame::ALL
            .iter()
            .filter(|frame| {
                [
                    "Economic",
                    "Capacity_and_resources",
                    "Morality",
                    "Fairness_and_equality",
                    "Legality_Constitutionality_and_jurisprudence",
                    "Policy_prescription_and_evaluation",
                    "Crime_and_punishment",
                    "Security_and_defense",
                    "Health_and_safety",
                    "Quality_of_life",
                    "Cultural_identity",
                    "Public_opinion",
                    "Political",
                    "External_regulation_and_reputation",
                ]
                .iter()
                .any(|name| frame_for(name) == Some(**frame))
            })
            .count();
        assert_eq!(named, 14);
    }

    #[test]
    fn test_parse_article() {
        let (title, text) = parse_article("The Title \n\nFirst line.\nSecond line.\n\n");
        assert_eq!(title, "The Title");
        assert_eq!(text, "First line.\nSecond line.");

        let (title, text) = parse_article("Only a title\n");
        assert_eq!(title, "Only a title");
        assert!(text.is_empty());
    }

    #[test]
    fn test_article_id() {
        assert_eq!(article_id("article701225819.txt"), "701225819");
    }

    #[test]
    fn test_load_split() {
        let dir = tempfile::tempdir().unwrap();
        let articles = dir.path().join("dev-articles-subtask-2");
        fs::create_dir_all(&articles).unwrap();
        fs::write(articles.join("article2.txt"), "Second\n\nText two.").unwrap();
        fs::write(articles.join("article1.txt"), "First\n\nText one.").unwrap();
        fs::write(articles.join("article3.txt"), "Empty\n\n   \n").unwrap();
        fs::write(articles.join("._article1.txt"), "junk").unwrap();
        fs::write(articles.join("notes.md"), "ignored").unwrap();

        let loaded = load_split(dir.path(), "dev").unwrap().unwrap();

        let ids: Vec<_> = loaded.iter().map(|a| a.article_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(loaded.iter().all(|a| a.frames_raw.is_empty()));
        assert_eq!(loaded[0].split, "dev");
        assert_eq!(loaded[0].text, "Text one.");

        assert!(load_split(dir.path(), "test").unwrap().is_none());
    }
}
