use crate::error::SchemaError;
use crate::normalize::{to_boolean, to_number};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[serde(alias = "mcq")]
    McqSingle,
    McqTwo,
    McqThree,
    McqMultiple,
    #[serde(alias = "tf")]
    TrueFalse,
    FillBlank,
    Match,
    ShortAnswer,
    LongAnswer,
    Programming,
}

impl QuestionType {
    /// Parses a stored type tag, accepting the legacy `mcq`/`tf` aliases
    /// still present in old question rows.
    pub fn from_tag(tag: &str) -> Option<QuestionType> {
        match tag {
            "mcq_single" | "mcq" => Some(QuestionType::McqSingle),
            "mcq_two" => Some(QuestionType::McqTwo),
            "mcq_three" => Some(QuestionType::McqThree),
            "mcq_multiple" => Some(QuestionType::McqMultiple),
            "true_false" | "tf" => Some(QuestionType::TrueFalse),
            "fill_blank" => Some(QuestionType::FillBlank),
            "match" => Some(QuestionType::Match),
            "short_answer" => Some(QuestionType::ShortAnswer),
            "long_answer" => Some(QuestionType::LongAnswer),
            "programming" => Some(QuestionType::Programming),
            _ => None,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            QuestionType::McqSingle
                | QuestionType::McqTwo
                | QuestionType::McqThree
                | QuestionType::McqMultiple
        )
    }

    /// Fixed number of correct indices the variant demands, where it has one.
    pub fn expected_selections(&self) -> Option<usize> {
        match self {
            QuestionType::McqTwo => Some(2),
            QuestionType::McqThree => Some(3),
            _ => None,
        }
    }
}

/// A submitted answer as it arrives from a client: a scalar, a list of
/// scalars, or a left-to-right mapping for match questions. Absence is
/// `Option<UserAnswer>` at every boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    Bool(bool),
    Number(f64),
    Text(String),
    Many(Vec<UserAnswer>),
    Pairs(HashMap<String, String>),
}

impl UserAnswer {
    /// The empty string counts as "no answer", same as a missing value.
    pub fn is_blank(&self) -> bool {
        matches!(self, UserAnswer::Text(text) if text.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            UserAnswer::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Stored answer schema, which the storage layer hands over either as a
/// JSON-encoded string or already structured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerData {
    Encoded(String),
    Structured(Value),
}

impl AnswerData {
    pub fn to_value(&self) -> Result<Value, SchemaError> {
        match self {
            AnswerData::Structured(value) => Ok(value.clone()),
            AnswerData::Encoded(raw) => serde_json::from_str(raw).map_err(SchemaError::Encoding),
        }
    }
}

/// Schema shared by all MCQ variants: `correct` holds a scalar index for
/// `mcq_single` and a list of indices otherwise, either form possibly as
/// numeric strings in legacy rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceSchema {
    #[serde(default)]
    pub options: Vec<String>,
    pub correct: UserAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueFalseSchema {
    pub correct: UserAnswer,
}

/// Acceptable spellings for one blank: a single string or a list of
/// interchangeable alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlankAnswers {
    One(String),
    Any(Vec<String>),
}

impl BlankAnswers {
    pub fn alternatives(&self) -> &[String] {
        match self {
            BlankAnswers::One(answer) => std::slice::from_ref(answer),
            BlankAnswers::Any(answers) => answers.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillBlankSchema {
    pub blanks: Vec<BlankAnswers>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSchema {
    pub pairs: Vec<MatchPair>,
}

/// Reference material for manually graded types; never used to auto-grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeTextSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, rename = "sampleAnswer", skip_serializing_if = "Option::is_none")]
    pub sample_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnswerSchema {
    Choice(ChoiceSchema),
    TrueFalse(TrueFalseSchema),
    FillBlank(FillBlankSchema),
    Match(MatchSchema),
    FreeText(FreeTextSchema),
}

impl AnswerSchema {
    /// Decodes stored answer data under the question's type tag. The string
    /// form is parsed on demand; any failure is reported, never panicked on.
    pub fn decode(kind: QuestionType, data: &AnswerData) -> Result<AnswerSchema, SchemaError> {
        let value = data.to_value()?;
        let shape = |source| SchemaError::Shape { kind, source };
        let schema = match kind {
            QuestionType::McqSingle
            | QuestionType::McqTwo
            | QuestionType::McqThree
            | QuestionType::McqMultiple => {
                AnswerSchema::Choice(serde_json::from_value(value).map_err(shape)?)
            }
            QuestionType::TrueFalse => {
                AnswerSchema::TrueFalse(serde_json::from_value(value).map_err(shape)?)
            }
            QuestionType::FillBlank => {
                AnswerSchema::FillBlank(serde_json::from_value(value).map_err(shape)?)
            }
            QuestionType::Match => {
                AnswerSchema::Match(serde_json::from_value(value).map_err(shape)?)
            }
            QuestionType::ShortAnswer | QuestionType::LongAnswer | QuestionType::Programming => {
                AnswerSchema::FreeText(serde_json::from_value(value).map_err(shape)?)
            }
        };
        Ok(schema)
    }
}

/// A question row as the evaluator consumes it. Owned by the store; this
/// crate only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub question_type: QuestionType,
    #[serde(default)]
    pub answer_data: Option<AnswerData>,
    pub marks: f64,
}

/// One scored row of an attempt. `is_correct = None` means "not graded
/// automatically", which is distinct from graded-and-wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptAnswer {
    #[serde(default)]
    pub user_answer: Option<UserAnswer>,
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub marks_obtained: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
}

fn issue(field: impl Into<String>, text: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        field: field.into(),
        issue: text.into(),
    }
}

/// Authoring-time check that stored answer data is usable by the evaluator.
/// Collects every problem found rather than stopping at the first.
pub fn validate_answer_data(
    kind: QuestionType,
    data: &AnswerData,
) -> Result<(), Vec<ValidationIssue>> {
    let schema = match AnswerSchema::decode(kind, data) {
        Ok(schema) => schema,
        Err(err) => return Err(vec![issue("answer_data", err.to_string())]),
    };

    let mut issues = Vec::new();
    match &schema {
        AnswerSchema::Choice(choice) => validate_choice(kind, choice, &mut issues),
        AnswerSchema::TrueFalse(tf) => {
            if to_boolean(&tf.correct).is_none() {
                issues.push(issue("correct", "must be a boolean"));
            }
        }
        AnswerSchema::FillBlank(fill) => {
            if fill.blanks.is_empty() {
                issues.push(issue("blanks", "must contain at least one blank"));
            }
            for (i, blank) in fill.blanks.iter().enumerate() {
                if blank.alternatives().is_empty() {
                    issues.push(issue(
                        format!("blanks[{i}]"),
                        "must offer at least one acceptable answer",
                    ));
                }
                for (j, alternative) in blank.alternatives().iter().enumerate() {
                    if alternative.trim().is_empty() {
                        issues.push(issue(format!("blanks[{i}][{j}]"), "must not be empty"));
                    }
                }
            }
        }
        AnswerSchema::Match(schema) => {
            if schema.pairs.is_empty() {
                issues.push(issue("pairs", "must contain at least one pair"));
            }
            for (i, pair) in schema.pairs.iter().enumerate() {
                if pair.left.trim().is_empty() {
                    issues.push(issue(format!("pairs[{i}].left"), "must not be empty"));
                }
                if pair.right.trim().is_empty() {
                    issues.push(issue(format!("pairs[{i}].right"), "must not be empty"));
                }
            }
        }
        AnswerSchema::FreeText(free) => {
            if let Some(answer) = &free.answer {
                if answer.trim().is_empty() {
                    issues.push(issue("answer", "must not be empty when present"));
                }
            }
            if let Some(sample) = &free.sample_answer {
                if sample.trim().is_empty() {
                    issues.push(issue("sampleAnswer", "must not be empty when present"));
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn validate_choice(kind: QuestionType, choice: &ChoiceSchema, issues: &mut Vec<ValidationIssue>) {
    if choice.options.len() < 2 {
        issues.push(issue("options", "must contain at least 2 options"));
    }
    for (i, option) in choice.options.iter().enumerate() {
        if option.trim().is_empty() {
            issues.push(issue(format!("options[{i}]"), "must not be empty"));
        }
    }

    let in_range = |idx: i64| idx >= 0 && (idx as usize) < choice.options.len();
    if kind == QuestionType::McqSingle {
        match to_number(&choice.correct) {
            Some(idx) if in_range(idx) => {}
            Some(_) => issues.push(issue("correct", "must reference an existing option")),
            None => issues.push(issue("correct", "must be a single option index")),
        }
        return;
    }

    let UserAnswer::Many(entries) = &choice.correct else {
        issues.push(issue("correct", "must be a list of option indices"));
        return;
    };
    let mut seen = BTreeSet::new();
    for (i, entry) in entries.iter().enumerate() {
        match to_number(entry) {
            Some(idx) if in_range(idx) => {
                if !seen.insert(idx) {
                    issues.push(issue(format!("correct[{i}]"), "must be unique"));
                }
            }
            Some(_) => issues.push(issue(
                format!("correct[{i}]"),
                "must reference an existing option",
            )),
            None => issues.push(issue(format!("correct[{i}]"), "must be an option index")),
        }
    }
    match kind.expected_selections() {
        Some(expected) if entries.len() != expected => {
            issues.push(issue(
                "correct",
                format!("must list exactly {expected} option indices"),
            ));
        }
        None if entries.is_empty() => {
            issues.push(issue("correct", "must not be empty"));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_type_tags_and_aliases() {
        assert_eq!(QuestionType::from_tag("mcq"), Some(QuestionType::McqSingle));
        assert_eq!(QuestionType::from_tag("tf"), Some(QuestionType::TrueFalse));
        assert_eq!(QuestionType::from_tag("matrix"), None);

        let kind: QuestionType = serde_json::from_value(json!("mcq")).unwrap();
        assert_eq!(kind, QuestionType::McqSingle);
        let kind: QuestionType = serde_json::from_value(json!("tf")).unwrap();
        assert_eq!(kind, QuestionType::TrueFalse);
        assert_eq!(serde_json::to_value(QuestionType::McqSingle).unwrap(), json!("mcq_single"));
    }

    #[test]
    fn decode_accepts_structured_and_encoded_data() {
        let structured = AnswerData::Structured(json!({"options": ["a", "b"], "correct": 1}));
        let encoded = AnswerData::Encoded(r#"{"options": ["a", "b"], "correct": 1}"#.to_string());

        let from_structured = AnswerSchema::decode(QuestionType::McqSingle, &structured).unwrap();
        let from_encoded = AnswerSchema::decode(QuestionType::McqSingle, &encoded).unwrap();
        assert_eq!(from_structured, from_encoded);
    }

    #[test]
    fn decode_reports_bad_json_and_bad_shape() {
        let garbage = AnswerData::Encoded("{not json".to_string());
        assert!(matches!(
            AnswerSchema::decode(QuestionType::McqSingle, &garbage),
            Err(SchemaError::Encoding(_))
        ));

        let wrong_shape = AnswerData::Structured(json!({"blanks": "nope"}));
        assert!(matches!(
            AnswerSchema::decode(QuestionType::FillBlank, &wrong_shape),
            Err(SchemaError::Shape { kind: QuestionType::FillBlank, .. })
        ));
    }

    #[test]
    fn user_answer_untagged_forms() {
        let answer: UserAnswer = serde_json::from_value(json!("B")).unwrap();
        assert_eq!(answer, UserAnswer::Text("B".into()));
        let answer: UserAnswer = serde_json::from_value(json!([0, "2"])).unwrap();
        assert!(matches!(answer, UserAnswer::Many(ref entries) if entries.len() == 2));
        let answer: UserAnswer = serde_json::from_value(json!({"Paris": "France"})).unwrap();
        assert!(matches!(answer, UserAnswer::Pairs(_)));
        assert!(UserAnswer::Text(String::new()).is_blank());
        assert!(!UserAnswer::Text(" ".into()).is_blank());
    }

    #[test]
    fn validate_choice_counts_and_ranges() {
        let two = AnswerData::Structured(json!({
            "options": ["a", "b", "c"],
            "correct": [0, 2]
        }));
        assert!(validate_answer_data(QuestionType::McqTwo, &two).is_ok());

        let bad = AnswerData::Structured(json!({
            "options": ["a", "b"],
            "correct": [0, 0, 5]
        }));
        let issues = validate_answer_data(QuestionType::McqTwo, &bad).unwrap_err();
        assert!(issues.iter().any(|i| i.issue.contains("unique")));
        assert!(issues.iter().any(|i| i.issue.contains("existing option")));
        assert!(issues.iter().any(|i| i.issue.contains("exactly 2")));
    }

    #[test]
    fn validate_rejects_undecodable_data() {
        let garbage = AnswerData::Encoded("][".to_string());
        let issues = validate_answer_data(QuestionType::Match, &garbage).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "answer_data");
    }

    #[test]
    fn validate_fill_blank_and_match_shapes() {
        let empty_blanks = AnswerData::Structured(json!({"blanks": []}));
        assert!(validate_answer_data(QuestionType::FillBlank, &empty_blanks).is_err());

        let ok = AnswerData::Structured(json!({"blanks": [["cat", "feline"], "dog"]}));
        assert!(validate_answer_data(QuestionType::FillBlank, &ok).is_ok());

        let blank_side = AnswerData::Structured(json!({
            "pairs": [{"left": "France", "right": " "}]
        }));
        let issues = validate_answer_data(QuestionType::Match, &blank_side).unwrap_err();
        assert_eq!(issues[0].field, "pairs[0].right");
    }
}
