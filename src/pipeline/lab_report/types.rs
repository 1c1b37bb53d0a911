use std::fmt;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::LabParseError;

/// Ordered set of recognized section-header strings.
///
/// Headers are matched as exact, case-sensitive substrings. All headers are
/// compiled into one leftmost-first alternation, so a single scan yields the
/// earliest header and, at equal offsets, the one declared first.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    headers: Vec<String>,
    matcher: Regex,
}

impl Vocabulary {
    /// Build a vocabulary. Empty strings and repeats are dropped; order of
    /// first declaration is kept.
    pub fn new<I, S>(headers: I) -> Result<Self, LabParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for header in headers {
            let header = header.into();
            if header.is_empty() || kept.contains(&header) {
                continue;
            }
            kept.push(header);
        }

        if kept.is_empty() {
            return Err(LabParseError::InvalidVocabulary(
                "no non-empty section headers".into(),
            ));
        }

        let pattern = kept
            .iter()
            .map(|h| regex::escape(h))
            .collect::<Vec<_>>()
            .join("|");
        let matcher =
            Regex::new(&pattern).map_err(|e| LabParseError::InvalidVocabulary(e.to_string()))?;

        Ok(Self {
            headers: kept,
            matcher,
        })
    }

    /// Parse a JSON array of header strings, e.g. `["Chemistry Panel", "Hematology"]`.
    pub fn from_json(json: &str) -> Result<Self, LabParseError> {
        let headers: Vec<String> = serde_json::from_str(json)
            .map_err(|e| LabParseError::InvalidVocabulary(e.to_string()))?;
        Self::new(headers)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Earliest header occurrence starting at or after byte offset `from`.
    /// `from` must lie on a char boundary of `text`.
    pub fn find_from<'t>(&self, text: &'t str, from: usize) -> Option<(usize, &'t str)> {
        if from > text.len() {
            return None;
        }
        self.matcher
            .find_at(text, from)
            .map(|m| (m.start(), m.as_str()))
    }
}

/// Byte range of one section within the document, from its header up to the
/// next header (or the end of the document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSpan {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl SectionSpan {
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// Source of "now" for reports without a collection date (allows fixed clocks in tests).
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Non-fatal problems found while parsing. Attached to the report so one bad
/// line never discards the rest of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    MalformedRow { section: String, line: String },
    AmbiguousDate { field: String, token: String },
    NoHeadersFound,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRow { section, line } => {
                write!(f, "unreadable row in {section}: \"{line}\"")
            }
            Self::AmbiguousDate { field, token } => {
                write!(f, "date {token} in {field} is not a valid calendar date")
            }
            Self::NoHeadersFound => f.write_str("no known section headers found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn vocabulary_drops_empty_and_duplicate_headers() {
        let vocab = Vocabulary::new(["Hematology", "", "Chemistry", "Hematology"]).unwrap();
        assert_eq!(vocab.headers(), &["Hematology", "Chemistry"]);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn empty_vocabulary_rejected() {
        let result = Vocabulary::new(Vec::<String>::new());
        assert!(matches!(result, Err(LabParseError::InvalidVocabulary(_))));
        assert!(Vocabulary::new([""]).is_err());
    }

    #[test]
    fn vocabulary_from_json() {
        let vocab = Vocabulary::from_json(r#"["Lipid Panel", "Urinalysis"]"#).unwrap();
        assert_eq!(vocab.headers(), &["Lipid Panel", "Urinalysis"]);
    }

    #[test]
    fn vocabulary_from_bad_json() {
        let result = Vocabulary::from_json(r#"{"headers": 3}"#);
        assert!(matches!(result, Err(LabParseError::InvalidVocabulary(_))));
    }

    #[test]
    fn regex_metacharacters_match_literally() {
        let vocab = Vocabulary::new(["CBC (w/ Diff)", "A1c*"]).unwrap();
        let text = "xx A1c* yy CBC (w/ Diff)";
        assert_eq!(vocab.find_from(text, 0), Some((3, "A1c*")));
        assert_eq!(vocab.find_from(text, 4), Some((11, "CBC (w/ Diff)")));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let vocab = Vocabulary::new(["Hematology"]).unwrap();
        assert_eq!(vocab.find_from("hematology HEMATOLOGY", 0), None);
    }

    #[test]
    fn find_from_past_end_is_none() {
        let vocab = Vocabulary::new(["Hematology"]).unwrap();
        assert_eq!(vocab.find_from("Hematology", 11), None);
    }

    #[test]
    fn fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn span_slices_document() {
        let span = SectionSpan {
            name: "Lipids".into(),
            start: 4,
            end: 10,
        };
        assert_eq!(span.slice("abc Lipids xyz"), "Lipids");
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let json = serde_json::to_value(ParseWarning::NoHeadersFound).unwrap();
        assert_eq!(json["kind"], "no_headers_found");
    }
}
