use crate::pipeline::lab_report::{LabParseError, Vocabulary};

/// Application-level constants
pub const APP_NAME: &str = "labreport-parser";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding a JSON array of section headers.
pub const VOCABULARY_ENV: &str = "LAB_PARSER_VOCABULARY";

/// Starter vocabulary covering common lab panel headings.
/// Deployments are expected to supply their own through configuration.
pub const DEFAULT_SECTION_HEADERS: &[&str] = &[
    "Complete Blood Count",
    "Comprehensive Metabolic Panel",
    "Basic Metabolic Panel",
    "Chemistry Panel",
    "Hematology",
    "Lipid Panel",
    "Liver Function Tests",
    "Thyroid Panel",
    "Urinalysis",
    "Coagulation",
    "Comments",
];

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_CRATE_NAME"))
}

/// The built-in starter vocabulary.
pub fn default_vocabulary() -> Vocabulary {
    Vocabulary::new(DEFAULT_SECTION_HEADERS.iter().copied())
        .expect("default section headers are non-empty")
}

/// Vocabulary from `LAB_PARSER_VOCABULARY` if set, else the starter list.
pub fn vocabulary_from_env() -> Result<Vocabulary, LabParseError> {
    match std::env::var(VOCABULARY_ENV) {
        Ok(json) => {
            tracing::info!(source = VOCABULARY_ENV, "Loading section vocabulary");
            Vocabulary::from_json(&json)
        }
        Err(_) => Ok(default_vocabulary()),
    }
}
