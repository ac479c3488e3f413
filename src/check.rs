use crate::models::{AnswerSchema, BlankAnswers, MatchPair, QuestionRecord, QuestionType, UserAnswer};
use crate::normalize::{normalize_string, to_boolean, to_number, user_answer_to_index};
use std::collections::BTreeSet;

/// Whether this question type can only be graded by a human. Callers must
/// consult this before reading a `false` from `check_answer` as "wrong"
/// rather than "not graded".
pub fn requires_manual_grading(kind: QuestionType) -> bool {
    matches!(
        kind,
        QuestionType::ShortAnswer | QuestionType::LongAnswer | QuestionType::Programming
    )
}

/// Single-choice: both sides must resolve to an index (number, numeric
/// string or option letter on the user side) and compare equal.
pub fn check_mcq_single(user_answer: &UserAnswer, correct: &UserAnswer) -> bool {
    match (user_answer_to_index(user_answer), to_number(correct)) {
        (Some(picked), Some(expected)) => picked == expected,
        _ => false,
    }
}

/// Multi-choice: both sides must be lists. Unresolvable and duplicate
/// entries are dropped, and the remaining sets must be identical, so a
/// submission missing any correct index fails outright. No partial credit.
pub fn check_mcq_multiple(user_answer: &UserAnswer, correct: &UserAnswer) -> bool {
    let (UserAnswer::Many(picked), UserAnswer::Many(expected)) = (user_answer, correct) else {
        return false;
    };
    let picked: BTreeSet<i64> = picked.iter().filter_map(user_answer_to_index).collect();
    let expected: BTreeSet<i64> = expected.iter().filter_map(to_number).collect();
    picked == expected
}

pub fn check_true_false(user_answer: &UserAnswer, correct: &UserAnswer) -> bool {
    match (to_boolean(user_answer), to_boolean(correct)) {
        (Some(picked), Some(expected)) => picked == expected,
        _ => false,
    }
}

fn matches_blank(entry: &UserAnswer, blank: &BlankAnswers) -> bool {
    let given = normalize_string(entry);
    !given.is_empty()
        && blank
            .alternatives()
            .iter()
            .any(|alternative| alternative.trim().to_lowercase() == given)
}

/// Fill-in-the-blank, case- and whitespace-insensitive. A single text answer
/// matches against every alternative of every blank as one flat OR-list
/// (how the platform has always treated one-blank questions); a list answer
/// must match per position, each entry against the alternatives of the
/// corresponding blank.
pub fn check_fill_blank(user_answer: &UserAnswer, blanks: &[BlankAnswers]) -> bool {
    match user_answer {
        UserAnswer::Many(entries) => {
            !blanks.is_empty()
                && blanks.iter().enumerate().all(|(position, blank)| {
                    entries
                        .get(position)
                        .is_some_and(|entry| matches_blank(entry, blank))
                })
        }
        UserAnswer::Pairs(_) => false,
        scalar => blanks.iter().any(|blank| matches_blank(scalar, blank)),
    }
}

/// Matching: the submission must map every `left` (or `left_en`) to that
/// pair's `right` or `right_en`. One miss fails the whole question.
pub fn check_match(user_answer: &UserAnswer, pairs: &[MatchPair]) -> bool {
    let UserAnswer::Pairs(mapping) = user_answer else {
        return false;
    };
    pairs.iter().all(|pair| {
        let picked = mapping
            .get(&pair.left)
            .or_else(|| pair.left_en.as_ref().and_then(|left| mapping.get(left)));
        match picked {
            Some(value) => value == &pair.right || pair.right_en.as_deref() == Some(value.as_str()),
            None => false,
        }
    })
}

/// Entry point for auto-grading one question. Fails closed: a missing or
/// empty answer, missing or undecodable schema, or any shape mismatch is
/// "not correct", never a panic. Decode failures are logged.
pub fn check_answer(question: &QuestionRecord, user_answer: Option<&UserAnswer>) -> bool {
    let Some(user_answer) = user_answer else {
        return false;
    };
    if user_answer.is_blank() {
        return false;
    }
    let Some(data) = question.answer_data.as_ref() else {
        return false;
    };
    let schema = match AnswerSchema::decode(question.question_type, data) {
        Ok(schema) => schema,
        Err(err) => {
            tracing::warn!(question_id = question.id, "cannot decode answer data: {err}");
            return false;
        }
    };
    match &schema {
        AnswerSchema::Choice(choice) => {
            if question.question_type == QuestionType::McqSingle {
                check_mcq_single(user_answer, &choice.correct)
            } else {
                check_mcq_multiple(user_answer, &choice.correct)
            }
        }
        AnswerSchema::TrueFalse(tf) => check_true_false(user_answer, &tf.correct),
        AnswerSchema::FillBlank(fill) => check_fill_blank(user_answer, &fill.blanks),
        AnswerSchema::Match(schema) => check_match(user_answer, &schema.pairs),
        // Manual grading only; the automatic path never marks these.
        AnswerSchema::FreeText(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerData;
    use serde_json::json;

    fn text(value: &str) -> UserAnswer {
        UserAnswer::Text(value.to_string())
    }

    fn numbers(values: &[i64]) -> UserAnswer {
        UserAnswer::Many(values.iter().map(|&n| UserAnswer::Number(n as f64)).collect())
    }

    fn question(kind: QuestionType, data: serde_json::Value) -> QuestionRecord {
        QuestionRecord {
            id: 1,
            question_type: kind,
            answer_data: Some(AnswerData::Structured(data)),
            marks: 1.0,
        }
    }

    #[test]
    fn mcq_single_accepts_index_and_letter_forms() {
        let correct = UserAnswer::Number(1.0);
        assert!(check_mcq_single(&UserAnswer::Number(1.0), &correct));
        assert!(check_mcq_single(&text("1"), &correct));
        assert!(check_mcq_single(&text("B"), &correct));
        assert!(!check_mcq_single(&text("A"), &correct));
        assert!(!check_mcq_single(&text("banana"), &correct));
    }

    #[test]
    fn fractional_selections_never_grade_correct() {
        let q = question(QuestionType::McqSingle, json!({"options": ["a", "b"], "correct": 1}));
        assert!(!check_answer(&q, Some(&UserAnswer::Number(1.5))));
        assert!(!check_mcq_single(&UserAnswer::Number(0.5), &UserAnswer::Number(0.0)));
        assert!(!check_mcq_multiple(
            &UserAnswer::Many(vec![UserAnswer::Number(0.5), UserAnswer::Number(1.0)]),
            &numbers(&[0, 1])
        ));
    }

    #[test]
    fn mcq_multiple_is_order_independent_and_length_strict() {
        let correct = numbers(&[0, 1]);
        assert!(check_mcq_multiple(&numbers(&[1, 0]), &correct));
        assert!(check_mcq_multiple(
            &UserAnswer::Many(vec![text("B"), text("0")]),
            &correct
        ));
        assert!(!check_mcq_multiple(&numbers(&[0, 1]), &numbers(&[0, 1, 2])));
        assert!(!check_mcq_multiple(&numbers(&[0]), &correct));
        assert!(!check_mcq_multiple(&UserAnswer::Number(0.0), &correct));
        assert!(!check_mcq_multiple(&numbers(&[0, 1]), &UserAnswer::Number(0.0)));
    }

    #[test]
    fn mcq_multiple_drops_malformed_and_duplicate_entries() {
        let correct = numbers(&[0, 2]);
        let noisy = UserAnswer::Many(vec![
            text("C"),
            UserAnswer::Number(0.0),
            text("not-an-index"),
            UserAnswer::Number(2.0),
        ]);
        assert!(check_mcq_multiple(&noisy, &correct));

        // A malformed entry leaves too few resolved indices behind.
        let short = UserAnswer::Many(vec![text("junk"), UserAnswer::Number(0.0)]);
        assert!(!check_mcq_multiple(&short, &correct));
    }

    #[test]
    fn true_false_tolerates_string_spellings() {
        let yes = UserAnswer::Bool(true);
        let no = UserAnswer::Bool(false);
        assert!(check_true_false(&text("YES"), &yes));
        assert!(check_true_false(&text("no"), &no));
        assert!(check_true_false(&text("0"), &no));
        assert!(!check_true_false(&text("maybe"), &yes));
        assert!(!check_true_false(&text("true"), &no));
    }

    #[test]
    fn fill_blank_single_string_matches_any_alternative() {
        let blanks = vec![BlankAnswers::One("Paris".into())];
        assert!(check_fill_blank(&text(" paris "), &blanks));
        assert!(!check_fill_blank(&text("London"), &blanks));

        let alternatives = vec![BlankAnswers::Any(vec!["colour".into(), "color".into()])];
        assert!(check_fill_blank(&text("Color"), &alternatives));
    }

    #[test]
    fn fill_blank_positional_and_of_or() {
        let blanks = vec![
            BlankAnswers::Any(vec!["cat".into(), "feline".into()]),
            BlankAnswers::One("dog".into()),
        ];
        assert!(check_fill_blank(
            &UserAnswer::Many(vec![text("Feline"), text("Dog")]),
            &blanks
        ));
        assert!(!check_fill_blank(
            &UserAnswer::Many(vec![text("bird"), text("dog")]),
            &blanks
        ));
        // Missing positions fail the AND.
        assert!(!check_fill_blank(&UserAnswer::Many(vec![text("cat")]), &blanks));
    }

    #[test]
    fn fill_blank_rejects_empty_and_wrong_shapes() {
        let blanks = vec![BlankAnswers::One("42".into())];
        assert!(!check_fill_blank(&text(""), &blanks));
        assert!(!check_fill_blank(&UserAnswer::Pairs(Default::default()), &blanks));
        assert!(!check_fill_blank(&UserAnswer::Many(vec![text("42")]), &[]));
    }

    #[test]
    fn match_requires_every_pair() {
        let pairs = vec![
            MatchPair {
                left: "France".into(),
                right: "Paris".into(),
                left_en: None,
                right_en: None,
            },
            MatchPair {
                left: "Italie".into(),
                right: "Rome".into(),
                left_en: Some("Italy".into()),
                right_en: Some("Roma".into()),
            },
        ];

        let mut mapping = std::collections::HashMap::new();
        mapping.insert("France".to_string(), "Paris".to_string());
        mapping.insert("Italy".to_string(), "Roma".to_string());
        assert!(check_match(&UserAnswer::Pairs(mapping.clone()), &pairs));

        mapping.insert("Italy".to_string(), "Milan".to_string());
        assert!(!check_match(&UserAnswer::Pairs(mapping), &pairs));

        let mut missing = std::collections::HashMap::new();
        missing.insert("France".to_string(), "Paris".to_string());
        assert!(!check_match(&UserAnswer::Pairs(missing), &pairs));
        assert!(!check_match(&text("France=Paris"), &pairs));
    }

    #[test]
    fn manual_grading_types_never_auto_pass() {
        for kind in [
            QuestionType::ShortAnswer,
            QuestionType::LongAnswer,
            QuestionType::Programming,
        ] {
            assert!(requires_manual_grading(kind));
            let q = question(kind, json!({"sampleAnswer": "anything"}));
            assert!(!check_answer(&q, Some(&text("anything"))));
        }
        assert!(!requires_manual_grading(QuestionType::McqSingle));
        assert!(!requires_manual_grading(QuestionType::Match));
    }

    #[test]
    fn check_answer_dispatch_and_legacy_aliases() {
        let q = question(QuestionType::McqSingle, json!({"options": ["a", "b"], "correct": 1}));
        assert!(check_answer(&q, Some(&text("B"))));
        assert!(!check_answer(&q, Some(&text("A"))));

        // Legacy rows carry the alias tags and JSON-encoded answer data.
        let legacy: QuestionRecord = serde_json::from_value(json!({
            "id": 7,
            "question_type": "tf",
            "answer_data": "{\"correct\": false}",
            "marks": 2.0
        }))
        .unwrap();
        assert_eq!(legacy.question_type, QuestionType::TrueFalse);
        assert!(check_answer(&legacy, Some(&text("0"))));
    }

    #[test]
    fn check_answer_fails_closed() {
        let q = question(QuestionType::McqSingle, json!({"options": ["a", "b"], "correct": 1}));
        assert!(!check_answer(&q, None));
        assert!(!check_answer(&q, Some(&text(""))));

        let no_data = QuestionRecord {
            id: 2,
            question_type: QuestionType::McqSingle,
            answer_data: None,
            marks: 1.0,
        };
        assert!(!check_answer(&no_data, Some(&text("B"))));

        let broken = QuestionRecord {
            id: 3,
            question_type: QuestionType::McqSingle,
            answer_data: Some(AnswerData::Encoded("{broken".to_string())),
            marks: 1.0,
        };
        assert!(!check_answer(&broken, Some(&text("B"))));

        let wrong_shape = question(QuestionType::Match, json!({"options": ["a"]}));
        assert!(!check_answer(&wrong_shape, Some(&text("a"))));
    }
}
