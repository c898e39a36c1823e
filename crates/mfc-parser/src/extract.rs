//! Title and body extraction
//!
//! Archive exports start with a metadata header (source, date, byline, ...)
//! followed by a line reading `Body` and then the article text. The first
//! non-empty paragraph is the headline.

use crate::ParsedDocument;

/// Splits a parsed document into title and body text
#[derive(Debug, Clone)]
pub struct TextExtractor {
    /// Paragraph that ends the metadata header (compared case-insensitively)
    pub body_marker: String,

    /// Paragraphs skipped when the marker is missing
    pub header_skip: usize,
}

impl TextExtractor {
    pub fn new(body_marker: impl Into<String>, header_skip: usize) -> Self {
        Self {
            body_marker: body_marker.into(),
            header_skip,
        }
    }

    /// First non-empty paragraph, trimmed
    pub fn extract_title(&self, doc: &ParsedDocument) -> Option<String> {
        doc.paragraphs
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
            .map(str::to_string)
    }

    /// Text after the body marker, or after the fixed header when there is no marker.
    ///
    /// Paragraphs are trimmed and joined with `\n`; the result is trimmed.
    pub fn extract_body(&self, doc: &ParsedDocument) -> String {
        let paragraphs: Vec<&str> = doc.paragraphs.iter().map(|p| p.trim()).collect();
        let marker = self.body_marker.trim().to_lowercase();

        let start = paragraphs
            .iter()
            .position(|p| p.to_lowercase() == marker)
            .map(|idx| idx + 1)
            .unwrap_or(self.header_skip);

        paragraphs
            .get(start..)
            .map(|rest| rest.join("\n"))
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new("body", 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileType;
    use proptest::prelude::*;

    fn doc(paragraphs: &[&str]) -> ParsedDocument {
        ParsedDocument::new("test.docx", FileType::Docx).with_paragraphs(paragraphs.iter().copied())
    }

    #[test]
    fn test_title_is_first_non_empty_paragraph() {
        let extractor = TextExtractor::default();
        let d = doc(&["", "   ", "  Border Crisis Grows  ", "The New York Times"]);
        assert_eq!(
            extractor.extract_title(&d),
            Some("Border Crisis Grows".to_string())
        );
        assert_eq!(extractor.extract_title(&doc(&["", " "])), None);
        assert_eq!(extractor.extract_title(&doc(&[])), None);
    }

    #[test]
    fn test_body_after_marker() {
        let extractor = TextExtractor::default();
        let d = doc(&[
            "Border Crisis Grows",
            "The New York Times",
            "  BODY ",
            "  First paragraph. ",
            "",
            "Second paragraph.",
            "",
        ]);
        assert_eq!(
            extractor.extract_body(&d),
            "First paragraph.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_first_marker_wins() {
        let extractor = TextExtractor::default();
        let d = doc(&["Title", "Body", "Text mentions", "body", "again"]);
        assert_eq!(extractor.extract_body(&d), "Text mentions\nbody\nagain");
    }

    #[test]
    fn test_body_fallback_skips_header() {
        let extractor = TextExtractor::new("body", 3);
        let d = doc(&["h1", "h2", "h3", "text one", "text two"]);
        assert_eq!(extractor.extract_body(&d), "text one\ntext two");
    }

    #[test]
    fn test_body_of_short_document_is_empty() {
        let extractor = TextExtractor::default();
        assert_eq!(extractor.extract_body(&doc(&["only", "a", "header"])), "");
        assert_eq!(extractor.extract_body(&doc(&[])), "");
        assert_eq!(extractor.extract_body(&doc(&["Title", "Body"])), "");
    }

    #[test]
    fn test_marker_must_be_whole_paragraph() {
        let extractor = TextExtractor::new("body", 1);
        let d = doc(&["Title", "Body text inline", "rest"]);
        assert_eq!(extractor.extract_body(&d), "Body text inline\nrest");
    }

    proptest! {
        #[test]
        fn body_extraction_accepts_any_document(
            paragraphs in proptest::collection::vec("\\PC{0,20}", 0..16),
            header_skip in 0usize..32,
        ) {
            let extractor = TextExtractor::new("body", header_skip);
            let d = ParsedDocument::new("any.docx", FileType::Docx)
                .with_paragraphs(paragraphs.iter().cloned());

            let body = extractor.extract_body(&d);
            prop_assert_eq!(body.trim(), body.as_str());

            let has_marker = paragraphs.iter().any(|p| p.trim().to_lowercase() == "body");
            if !has_marker && header_skip >= paragraphs.len() {
                prop_assert!(body.is_empty());
            }
        }
    }
}
