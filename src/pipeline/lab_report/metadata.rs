use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use super::dates::{parse_dmy, start_of_day_utc};
use super::types::{Clock, ParseWarning};

static SPECIMEN_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Specimen|Sample)\s+ID:\s*([A-Za-z0-9-]+)").expect("specimen pattern is valid")
});

static COLLECTION_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Collection|Drawn|Sample)\s+Date:\s*(\d{1,2}/\d{1,2}/\d{4})")
        .expect("collection date pattern is valid")
});

/// Report-level fields found anywhere in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub specimen_id: Option<String>,
    pub collection_date: DateTime<Utc>,
}

/// Scan the whole document for the specimen ID and collection date.
///
/// A missing collection date is not an error: it defaults to `clock.now()`.
pub fn extract_metadata(document: &str, clock: &dyn Clock) -> (DocumentMetadata, Vec<ParseWarning>) {
    let mut warnings = Vec::new();

    let specimen_id = SPECIMEN_ID_RE
        .captures(document)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_string());

    let parsed_date = COLLECTION_DATE_RE
        .captures(document)
        .and_then(|c| c.get(2))
        .and_then(|m| {
            let token = m.as_str();
            let parsed = parse_dmy(token)?;
            if !parsed.is_exact() {
                tracing::warn!("Collection date is outside the calendar, using rolled-over date");
                warnings.push(ParseWarning::AmbiguousDate {
                    field: "collection_date".into(),
                    token: token.to_string(),
                });
            }
            start_of_day_utc(parsed.date())
        });

    let collection_date = match parsed_date {
        Some(date) => date,
        None => {
            tracing::debug!("No collection date in document, defaulting to parse time");
            clock.now()
        }
    };

    (
        DocumentMetadata {
            specimen_id,
            collection_date,
        },
        warnings,
    )
}
