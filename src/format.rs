use crate::models::{AnswerData, AnswerSchema, QuestionType, UserAnswer};
use crate::normalize::{to_boolean, to_number, user_answer_to_index};

/// Shown when the user submitted nothing (or an empty string).
pub const NO_ANSWER_PROVIDED: &str = "No answer provided";
/// Shown when the stored schema is missing or unusable. Distinct from
/// [`NO_ANSWER_PROVIDED`]; the two must not be conflated.
pub const ANSWER_NOT_AVAILABLE: &str = "Answer not available";
/// Shown when a submitted value cannot be rendered at all.
pub const INVALID_ANSWER: &str = "Invalid answer";

fn scalar_display(answer: &UserAnswer) -> Option<String> {
    match answer {
        UserAnswer::Text(text) => Some(text.clone()),
        UserAnswer::Number(n) if n.is_finite() && n.fract() == 0.0 => {
            Some(format!("{}", *n as i64))
        }
        UserAnswer::Number(n) => Some(n.to_string()),
        UserAnswer::Bool(flag) => Some(if *flag { "True" } else { "False" }.to_string()),
        UserAnswer::Many(_) | UserAnswer::Pairs(_) => None,
    }
}

fn option_text(options: &[String], index: Option<i64>) -> Option<&str> {
    let index = usize::try_from(index?).ok()?;
    options.get(index).map(String::as_str)
}

fn pairs_display(mapping: &std::collections::HashMap<String, String>) -> String {
    let mut lefts: Vec<&String> = mapping.keys().collect();
    lefts.sort();
    lefts
        .iter()
        .map(|left| format!("{} → {}", left, mapping[left.as_str()]))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders a submitted answer for result screens. Display only; grading
/// never goes through here.
pub fn format_user_answer(
    user_answer: Option<&UserAnswer>,
    kind: QuestionType,
    answer_data: Option<&AnswerData>,
) -> String {
    let Some(answer) = user_answer else {
        return NO_ANSWER_PROVIDED.to_string();
    };
    if answer.is_blank() {
        return NO_ANSWER_PROVIDED.to_string();
    }
    let schema = answer_data.and_then(|data| AnswerSchema::decode(kind, data).ok());

    match kind {
        QuestionType::McqSingle
        | QuestionType::McqTwo
        | QuestionType::McqThree
        | QuestionType::McqMultiple => {
            let options: &[String] = match &schema {
                Some(AnswerSchema::Choice(choice)) => choice.options.as_slice(),
                _ => &[],
            };
            if let UserAnswer::Many(entries) = answer {
                let labels: Vec<String> = entries
                    .iter()
                    .filter_map(|entry| {
                        option_text(options, user_answer_to_index(entry))
                            .map(str::to_string)
                            .or_else(|| scalar_display(entry))
                    })
                    .collect();
                if labels.is_empty() {
                    INVALID_ANSWER.to_string()
                } else {
                    labels.join(", ")
                }
            } else {
                option_text(options, user_answer_to_index(answer))
                    .map(str::to_string)
                    .or_else(|| scalar_display(answer))
                    .unwrap_or_else(|| INVALID_ANSWER.to_string())
            }
        }
        QuestionType::TrueFalse => match to_boolean(answer) {
            Some(true) => "True".to_string(),
            Some(false) => "False".to_string(),
            None => scalar_display(answer).unwrap_or_else(|| INVALID_ANSWER.to_string()),
        },
        QuestionType::FillBlank => match answer {
            UserAnswer::Many(entries) => {
                let parts: Vec<String> = entries.iter().filter_map(scalar_display).collect();
                if parts.is_empty() {
                    INVALID_ANSWER.to_string()
                } else {
                    parts.join(", ")
                }
            }
            scalar => scalar_display(scalar).unwrap_or_else(|| INVALID_ANSWER.to_string()),
        },
        QuestionType::Match => match answer {
            UserAnswer::Pairs(mapping) => pairs_display(mapping),
            scalar => scalar_display(scalar).unwrap_or_else(|| INVALID_ANSWER.to_string()),
        },
        QuestionType::ShortAnswer | QuestionType::LongAnswer | QuestionType::Programming => {
            scalar_display(answer).unwrap_or_else(|| INVALID_ANSWER.to_string())
        }
    }
}

/// Renders the canonical correct answer for result screens.
pub fn format_correct_answer(kind: QuestionType, answer_data: Option<&AnswerData>) -> String {
    let Some(schema) = answer_data.and_then(|data| AnswerSchema::decode(kind, data).ok()) else {
        return ANSWER_NOT_AVAILABLE.to_string();
    };

    match &schema {
        AnswerSchema::Choice(choice) => match &choice.correct {
            UserAnswer::Many(entries) => {
                let labels: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| option_text(&choice.options, to_number(entry)))
                    .collect();
                if labels.is_empty() {
                    ANSWER_NOT_AVAILABLE.to_string()
                } else {
                    labels.join(", ")
                }
            }
            scalar => option_text(&choice.options, to_number(scalar))
                .map(str::to_string)
                .unwrap_or_else(|| ANSWER_NOT_AVAILABLE.to_string()),
        },
        AnswerSchema::TrueFalse(tf) => match to_boolean(&tf.correct) {
            Some(true) => "True".to_string(),
            Some(false) => "False".to_string(),
            None => ANSWER_NOT_AVAILABLE.to_string(),
        },
        AnswerSchema::FillBlank(fill) => {
            if fill.blanks.is_empty() {
                return ANSWER_NOT_AVAILABLE.to_string();
            }
            fill.blanks
                .iter()
                .map(|blank| blank.alternatives().join(" / "))
                .collect::<Vec<_>>()
                .join(", ")
        }
        AnswerSchema::Match(schema) => {
            if schema.pairs.is_empty() {
                return ANSWER_NOT_AVAILABLE.to_string();
            }
            schema
                .pairs
                .iter()
                .map(|pair| format!("{} → {}", pair.left, pair.right))
                .collect::<Vec<_>>()
                .join(", ")
        }
        AnswerSchema::FreeText(free) => free
            .answer
            .as_deref()
            .or(free.sample_answer.as_deref())
            .filter(|reference| !reference.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| ANSWER_NOT_AVAILABLE.to_string()),
    }
}
