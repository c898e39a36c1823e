//! Frame-label cleanup
//!
//! Frame columns imported from annotation exports hold Python list literals
//! such as `['Economic', 'safety and health']` with inconsistent casing and
//! spelling. Cleaning maps each entry onto one of the 15 official labels.

use std::collections::BTreeSet;

use mfc_core::Frame;

/// Misspellings and synonyms seen in exports, keyed by lowercase label
const LABEL_FIXES: &[(&str, Frame)] = &[
    ("legality, constitutionality and jurispudence", Frame::Legality),
    ("safety and health", Frame::HealthAndSafety),
    ("race and ethnicity", Frame::CulturalIdentity),
];

/// Official label for a raw label, or `Other` if it is not recognized
pub fn canonical_label(raw: &str) -> &'static str {
    let lowered = raw.trim().to_lowercase();
    Frame::from_label(&lowered)
        .or_else(|| {
            LABEL_FIXES
                .iter()
                .find(|(fix, _)| *fix == lowered)
                .map(|(_, frame)| *frame)
        })
        .unwrap_or(Frame::Other)
        .label()
}

/// Clean one stored frame list into sorted, deduplicated official labels.
///
/// Missing, unparseable or non-list values give an empty list.
pub fn clean_frame_row(raw: Option<&str>) -> Vec<String> {
    let Some(items) = raw.and_then(parse_list_literal) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| canonical_label(item))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Cleaned frames for one row, keyed by url
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameUpdate {
    pub url: String,
    pub frames: Vec<String>,
}

/// Clean every `(url, raw frames)` row
pub fn prepare_updates(rows: Vec<(String, Option<String>)>) -> Vec<FrameUpdate> {
    rows.into_iter()
        .map(|(url, raw)| FrameUpdate {
            frames: clean_frame_row(raw.as_deref()),
            url,
        })
        .collect()
}

// ============================================================================
// List literal parsing
// ============================================================================

/// Parse a flat Python list literal into its items as strings.
///
/// Quoted items (single or double quotes, backslash escapes) give their
/// contents; bare items such as numbers or `None` give their source text.
/// Returns `None` for anything else.
pub fn parse_list_literal(input: &str) -> Option<Vec<String>> {
    let mut chars = input.trim().chars().peekable();
    if chars.next()? != '[' {
        return None;
    }

    let mut items = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        match chars.peek()? {
            ']' => {
                chars.next();
                break;
            }
            '\'' | '"' => {
                let quote = chars.next()?;
                items.push(parse_quoted(&mut chars, quote)?);
            }
            _ => {
                let mut bare = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' || c == ']' {
                        break;
                    }
                    bare.push(c);
                    chars.next();
                }
                let bare = bare.trim();
                if bare.is_empty() || bare.contains(['[', '\'', '"']) {
                    return None;
                }
                items.push(bare.to_string());
            }
        }

        skip_whitespace(&mut chars);
        match chars.next()? {
            ',' => continue,
            ']' => break,
            _ => return None,
        }
    }

    // nothing may follow the closing bracket
    skip_whitespace(&mut chars);
    chars.next().is_none().then_some(items)
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn skip_whitespace(chars: &mut Chars<'_>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn parse_quoted(chars: &mut Chars<'_>, quote: char) -> Option<String> {
    let mut out = String::new();
    loop {
        match chars.next()? {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other => out.push(other),
            },
            c if c == quote => return Some(out),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_literal() {
        assert_eq!(
            parse_list_literal(r#"['Economic', "Crime and punishment"]"#),
            Some(vec!["Economic".to_string(), "Crime and punishment".to_string()])
        );
        assert_eq!(parse_list_literal("[]"), Some(vec![]));
        assert_eq!(parse_list_literal(" [ 'a' , ] "), Some(vec!["a".to_string()]));
        assert_eq!(
            parse_list_literal(r"['it\'s', 3]"),
            Some(vec!["it's".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_parse_list_literal_rejects() {
        assert_eq!(parse_list_literal(""), None);
        assert_eq!(parse_list_literal("Economic"), None);
        assert_eq!(parse_list_literal("'Economic'"), None);
        assert_eq!(parse_list_literal("['Economic'"), None);
        assert_eq!(parse_list_literal("['a'] extra"), None);
        assert_eq!(parse_list_literal("['a' 'b']"), None);
        assert_eq!(parse_list_literal("[, 'a']"), None);
    }

    #[test]
    fn test_canonical_label() {
        assert_eq!(canonical_label("  PUBLIC OPINION "), "Public opinion");
        assert_eq!(
            canonical_label("Legality, constitutionality and jurispudence"),
            "Legality, constitutionality and jurisprudence"
        );
        assert_eq!(canonical_label("safety and health"), "Health and safety");
        assert_eq!(canonical_label("Race and Ethnicity"), "Cultural identity");
        assert_eq!(canonical_label("weather"), "Other");
    }

    #[test]
    fn test_clean_frame_row() {
        assert_eq!(
            clean_frame_row(Some(
                "['Economic', 'economic', 'weather', 'Safety and health', 'unknown']"
            )),
            vec!["Economic", "Health and safety", "Other"]
        );
        assert!(clean_frame_row(None).is_empty());
        assert!(clean_frame_row(Some("")).is_empty());
        assert!(clean_frame_row(Some("not a list")).is_empty());
        assert!(clean_frame_row(Some("{'Economic': 1}")).is_empty());
    }

    #[test]
    fn test_prepare_updates() {
        let updates = prepare_updates(vec![
            ("https://a".to_string(), Some("['Political']".to_string())),
            ("https://b".to_string(), None),
        ]);
        assert_eq!(
            updates,
            vec![
                FrameUpdate {
                    url: "https://a".to_string(),
                    frames: vec!["Political".to_string()],
                },
                FrameUpdate {
                    url: "https://b".to_string(),
                    frames: vec![],
                },
            ]
        );
    }
}
