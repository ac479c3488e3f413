//! Answer checking and exam-result computation for the exam platform.
//!
//! Pure, synchronous and fail-closed: every function takes its full input as
//! arguments, returns a conservative default (`false`, `None`, a sentinel
//! string) on malformed data, and never panics in the grading path. The HTTP
//! and storage layers around it call in with a [`models::QuestionRecord`] and
//! a raw submitted value and get a verdict back.

pub mod check;
pub mod error;
pub mod format;
pub mod models;
pub mod normalize;
pub mod stats;

pub use check::{
    check_answer, check_fill_blank, check_match, check_mcq_multiple, check_mcq_single,
    check_true_false, requires_manual_grading,
};
pub use error::SchemaError;
pub use format::{
    format_correct_answer, format_user_answer, ANSWER_NOT_AVAILABLE, INVALID_ANSWER,
    NO_ANSWER_PROVIDED,
};
pub use models::{
    validate_answer_data, AnswerData, AnswerSchema, AttemptAnswer, BlankAnswers, MatchPair,
    QuestionRecord, QuestionType, UserAnswer, ValidationIssue,
};
pub use normalize::{
    is_boolean_selected, is_option_selected, label_to_index, normalize_string, to_boolean,
    to_number, user_answer_to_index, OPTION_LABELS,
};
pub use stats::{
    calculate_exam_stats, calculate_streaks, CorrectStreaks, ExamResultStats,
    DEFAULT_PASSING_PERCENTAGE,
};
