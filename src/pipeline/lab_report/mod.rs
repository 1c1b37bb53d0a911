pub mod types;
pub mod dates;
pub mod tokenizer;
pub mod classify;
pub mod locator;
pub mod metadata;
pub mod orchestrator;

pub use types::*;
pub use tokenizer::*;
pub use classify::*;
pub use locator::*;
pub use metadata::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabParseError {
    #[error("Document text is empty")]
    EmptyDocument,

    #[error("Invalid section vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("Row has no numeric result column: {0:?}")]
    MalformedRow(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
