use crate::models::UserAnswer;

/// Option letters accepted in place of numeric indices. Different client
/// surfaces submit either form for the same question.
pub const OPTION_LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Reads a value as an integer: whole numbers as-is, strings parsed after
/// trimming. Fractional and non-finite numbers are `None`, not truncated;
/// an index either resolves exactly or not at all.
pub fn to_number(value: &UserAnswer) -> Option<i64> {
    match value {
        UserAnswer::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
        UserAnswer::Text(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads a value as a boolean, tolerating the string and numeric spellings
/// clients actually send. Unrecognized input is `None`, never an error.
pub fn to_boolean(value: &UserAnswer) -> Option<bool> {
    match value {
        UserAnswer::Bool(flag) => Some(*flag),
        UserAnswer::Text(text) => {
            let text = text.trim();
            if ["true", "1", "yes"].iter().any(|t| text.eq_ignore_ascii_case(t)) {
                Some(true)
            } else if ["false", "0", "no"].iter().any(|t| text.eq_ignore_ascii_case(t)) {
                Some(false)
            } else {
                None
            }
        }
        UserAnswer::Number(n) if *n == 1.0 => Some(true),
        UserAnswer::Number(n) if *n == 0.0 => Some(false),
        _ => None,
    }
}

/// Canonical form for case/whitespace-insensitive text comparison. Scalars
/// coerce to their text form; containers have no text form and become `""`.
pub fn normalize_string(value: &UserAnswer) -> String {
    match value {
        UserAnswer::Text(text) => text.trim().to_lowercase(),
        UserAnswer::Bool(flag) => flag.to_string(),
        UserAnswer::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", *n as i64),
        UserAnswer::Number(n) => n.to_string(),
        UserAnswer::Many(_) | UserAnswer::Pairs(_) => String::new(),
    }
}

/// Maps a single option letter `A..F` (either case) to its zero-based index.
pub fn label_to_index(value: &str) -> Option<i64> {
    let mut chars = value.trim().chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let letter = letter.to_ascii_uppercase();
    OPTION_LABELS
        .iter()
        .position(|&label| label == letter)
        .map(|index| index as i64)
}

/// Resolves a submitted option selection to a canonical index: numeric forms
/// first, option letters as the fallback.
pub fn user_answer_to_index(value: &UserAnswer) -> Option<i64> {
    to_number(value).or_else(|| value.as_text().and_then(label_to_index))
}

/// Whether the given option index is among the user's selections. Used by
/// the UI to highlight picked options independently of grading.
pub fn is_option_selected(user_answer: Option<&UserAnswer>, index: usize) -> bool {
    let Some(answer) = user_answer else {
        return false;
    };
    let index = index as i64;
    match answer {
        UserAnswer::Many(entries) => entries
            .iter()
            .any(|entry| user_answer_to_index(entry) == Some(index)),
        other => user_answer_to_index(other) == Some(index),
    }
}

/// Whether the user's answer resolves to the given boolean value.
pub fn is_boolean_selected(user_answer: Option<&UserAnswer>, value: bool) -> bool {
    user_answer.and_then(to_boolean) == Some(value)
}
