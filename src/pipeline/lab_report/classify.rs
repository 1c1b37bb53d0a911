use super::tokenizer::tokenize_row;
use super::types::ParseWarning;
use crate::models::{Section, TestResult};

/// Lines containing this (lowercased) are column-group captions, not rows.
const PREVIOUS_RESULTS_CAPTION: &str = "previous results";

/// A table header line must contain this token...
const HEADER_ANCHOR: &str = "Test";

/// ...and at least one of these.
const HEADER_COLUMNS: &[&str] = &["Result", "Value", "Units", "Reference"];

/// Decide whether a section span is a results table or free text.
///
/// A span is a table when one of its lines looks like a column header
/// ("Test" plus "Result", "Value", "Units" or "Reference"). Every line after
/// that header is tokenized into a row; rows that cannot be read are
/// reported as warnings instead of being dropped silently. Spans with no
/// header line are kept verbatim (trimmed) as text.
pub fn classify_section(span: &str, section_name: &str) -> (Section, Vec<ParseWarning>) {
    let lines: Vec<&str> = span
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter(|l| !l.to_lowercase().contains(PREVIOUS_RESULTS_CAPTION))
        .collect();

    let Some(header_idx) = lines.iter().position(|l| is_table_header(l)) else {
        return (
            Section::Text {
                name: section_name.to_string(),
                content: span.trim().to_string(),
            },
            Vec::new(),
        );
    };

    let mut results: Vec<TestResult> = Vec::new();
    let mut warnings: Vec<ParseWarning> = Vec::new();

    for line in &lines[header_idx + 1..] {
        match tokenize_row(line) {
            Ok(row) => {
                if let Some(token) = row.ambiguous_date {
                    tracing::warn!(
                        section = section_name,
                        "Row has a previous-result date outside the calendar"
                    );
                    warnings.push(ParseWarning::AmbiguousDate {
                        field: format!("previous_date of {}", row.result.test_name),
                        token,
                    });
                }
                results.push(row.result);
            }
            Err(_) => {
                tracing::warn!(section = section_name, "Skipping unreadable table row");
                warnings.push(ParseWarning::MalformedRow {
                    section: section_name.to_string(),
                    line: line.trim().to_string(),
                });
            }
        }
    }

    (
        Section::Table {
            name: section_name.to_string(),
            results,
        },
        warnings,
    )
}

fn is_table_header(line: &str) -> bool {
    line.contains(HEADER_ANCHOR) && HEADER_COLUMNS.iter().any(|c| line.contains(c))
}
