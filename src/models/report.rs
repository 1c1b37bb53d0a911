use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::SectionKind;
use super::lab::TestResult;
use crate::pipeline::lab_report::ParseWarning;

/// A contiguous span of a lab report bound to one recognized header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    Text { name: String, content: String },
    Table { name: String, results: Vec<TestResult> },
}

impl Section {
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::Table { name, .. } => name,
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Text { .. } => SectionKind::Text,
            Self::Table { .. } => SectionKind::Table,
        }
    }

    /// Parsed rows for a table section, empty for text.
    pub fn results(&self) -> &[TestResult] {
        match self {
            Self::Table { results, .. } => results,
            Self::Text { .. } => &[],
        }
    }
}

/// Persistence view: one row per section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRow<'a> {
    pub name: &'a str,
    pub kind: SectionKind,
}

/// Persistence view: one row per parsed test result, tagged with its section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow<'a> {
    pub section: &'a str,
    #[serde(flatten)]
    pub result: &'a TestResult,
}

/// Structured output of one lab report parse.
///
/// Built once per parse and never mutated afterwards. Sections keep the order
/// in which their names first appeared in the document; names are unique.
/// Serialized, `sections` is a JSON array of tagged sections in that order,
/// not an object keyed by name; each entry carries its own `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    specimen_id: Option<String>,
    collection_date: DateTime<Utc>,
    sections: Vec<Section>,
    warnings: Vec<ParseWarning>,
}

impl Report {
    pub(crate) fn new(
        specimen_id: Option<String>,
        collection_date: DateTime<Utc>,
        sections: Vec<Section>,
        warnings: Vec<ParseWarning>,
    ) -> Self {
        Self {
            specimen_id,
            collection_date,
            sections,
            warnings,
        }
    }

    pub fn specimen_id(&self) -> Option<&str> {
        self.specimen_id.as_deref()
    }

    pub fn collection_date(&self) -> DateTime<Utc> {
        self.collection_date
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn section_rows(&self) -> impl Iterator<Item = SectionRow<'_>> {
        self.sections.iter().map(|s| SectionRow {
            name: s.name(),
            kind: s.kind(),
        })
    }

    pub fn result_rows(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.sections.iter().flat_map(|s| {
            s.results().iter().map(move |result| ResultRow {
                section: s.name(),
                result,
            })
        })
    }

    /// All warnings folded into one user-facing advisory, or `None` if the
    /// parse was clean.
    pub fn advisory_message(&self) -> Option<String> {
        if self.warnings.is_empty() {
            return None;
        }
        let details = self
            .warnings
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Some(format!(
            "Lab report parsed with {} warning(s); please review: {}",
            self.warnings.len(),
            details
        ))
    }
}
