use crate::models::QuestionType;
use thiserror::Error;

/// Why a stored `answer_data` blob could not be decoded. The grading path
/// fails closed on these (logs a diagnostic, answers "not correct"); the
/// authoring path surfaces them as validation issues.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("answer data is not valid JSON: {0}")]
    Encoding(#[source] serde_json::Error),
    #[error("answer data does not match the {kind:?} shape: {source}")]
    Shape {
        kind: QuestionType,
        #[source]
        source: serde_json::Error,
    },
}
