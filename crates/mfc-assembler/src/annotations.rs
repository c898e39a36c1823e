//! Frame and tone labels per annotator
//!
//! Annotator keys look like `annotator3_54.0_r`: the part before the first
//! underscore names the annotator, the rest identifies one annotation pass.
//! Passes by the same annotator are merged.

use std::collections::{BTreeMap, BTreeSet};

use mfc_core::{AnnotationEntry, ArticleRecord, Tone};

/// Annotator id -> ascending distinct frame codes
pub type FrameLabels = BTreeMap<String, BTreeSet<u8>>;

/// Annotator id -> distinct tone labels
pub type ToneLabels = BTreeMap<String, BTreeSet<Tone>>;

/// Annotator id of a raw annotator key
pub fn annotator_id(key: &str) -> &str {
    key.split_once('_').map_or(key, |(id, _)| id)
}

/// Base frame of a code: the integer part, kept only in `1..=15` (10.2 -> 10)
pub fn frame_code(code: f64) -> Option<u8> {
    let base = code.trunc();
    (1.0..=15.0).contains(&base).then_some(base as u8)
}

/// Tone band of a code: `[17, 18)` pro, `[18, 19)` neutral, `[19, 20)` anti
pub fn tone_code(code: f64) -> Option<Tone> {
    if (17.0..18.0).contains(&code) {
        Some(Tone::Pro)
    } else if (18.0..19.0).contains(&code) {
        Some(Tone::Neutral)
    } else if (19.0..20.0).contains(&code) {
        Some(Tone::Anti)
    } else {
        None
    }
}

/// Frame codes per annotator from the article's framing annotations
pub fn extract_frames(article: &ArticleRecord) -> FrameLabels {
    collect_labels(&article.annotations.framing, frame_code)
}

/// Tone labels per annotator from the article's tone annotations
pub fn extract_tones(article: &ArticleRecord) -> ToneLabels {
    collect_labels(&article.annotations.tone, tone_code)
}

// Every annotator key yields an entry, even when none of its codes qualify.
fn collect_labels<T: Ord>(
    by_key: &BTreeMap<String, Vec<AnnotationEntry>>,
    classify: impl Fn(f64) -> Option<T>,
) -> BTreeMap<String, BTreeSet<T>> {
    let mut labels: BTreeMap<String, BTreeSet<T>> = BTreeMap::new();

    for (key, entries) in by_key {
        labels
            .entry(annotator_id(key).to_string())
            .or_default()
            .extend(entries.iter().filter_map(|e| e.code).filter_map(&classify));
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotator_id() {
        assert_eq!(annotator_id("annotator3_54.0_r"), "annotator3");
        assert_eq!(annotator_id("annotator7"), "annotator7");
        assert_eq!(annotator_id("_odd"), "");
    }

    #[test]
    fn test_frame_code_truncates_and_bounds() {
        assert_eq!(frame_code(10.2), Some(10));
        assert_eq!(frame_code(1.0), Some(1));
        assert_eq!(frame_code(15.9), Some(15));
        assert_eq!(frame_code(16.0), None);
        assert_eq!(frame_code(0.0), None);
        assert_eq!(frame_code(0.5), None);
        assert_eq!(frame_code(-3.0), None);
    }

    #[test]
    fn test_tone_bands() {
        assert_eq!(tone_code(17.5), Some(Tone::Pro));
        assert_eq!(tone_code(18.9), Some(Tone::Neutral));
        assert_eq!(tone_code(19.1), Some(Tone::Anti));
        assert_eq!(tone_code(20.0), None);
        assert_eq!(tone_code(16.99), None);
        assert_eq!(tone_code(17.0), Some(Tone::Pro));
    }

    #[test]
    fn test_extract_frames_merges_annotator_passes() {
        let article = ArticleRecord::new("A1", "Border Crisis Grows")
            .with_frame("annotator3_54.0_r", 10.2)
            .with_frame("annotator3_54.0_r", 16.0)
            .with_frame("annotator3_60.0_q", 5.0)
            .with_frame("annotator3_60.0_q", 10.0)
            .with_frame("annotator9_12.0_r", 0.0);

        let frames = extract_frames(&article);

        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames["annotator3"].iter().copied().collect::<Vec<_>>(),
            vec![5, 10]
        );
        assert!(frames["annotator9"].is_empty());
    }

    #[test]
    fn test_extract_frames_skips_absent_codes() {
        let mut article = ArticleRecord::new("A1", "t");
        article
            .annotations
            .framing
            .insert("annotator1_1.0_r".to_string(), vec![AnnotationEntry::default()]);

        let frames = extract_frames(&article);
        assert!(frames["annotator1"].is_empty());
    }

    #[test]
    fn test_extract_tones() {
        let article = ArticleRecord::new("A1", "t")
            .with_tone("annotator1_1.0_r", 17.5)
            .with_tone("annotator1_2.0_q", 17.0)
            .with_tone("annotator1_2.0_q", 19.1)
            .with_tone("annotator2_1.0_r", 18.9)
            .with_tone("annotator2_1.0_r", 20.0);

        let tones = extract_tones(&article);

        assert_eq!(
            tones["annotator1"],
            BTreeSet::from([Tone::Pro, Tone::Anti])
        );
        assert_eq!(tones["annotator2"], BTreeSet::from([Tone::Neutral]));
    }
}
