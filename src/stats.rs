use crate::models::AttemptAnswer;
use serde::Serialize;

/// Threshold applied when the exam does not configure its own.
pub const DEFAULT_PASSING_PERCENTAGE: f64 = 35.0;

/// Attempt-level figures, computed fresh per call and never persisted here.
/// `unanswered` comes from answer presence while `correct`/`wrong` come from
/// the grading tri-state, so the two can diverge for manually graded rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResultStats {
    pub total_questions: usize,
    pub attempted_questions: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    pub unanswered: usize,
    pub total_marks: f64,
    pub obtained_marks: f64,
    pub percentage: f64,
    pub is_passing: bool,
}

/// Aggregates one attempt in a single pass. The percentage is rounded to a
/// whole number and guarded against `total_marks <= 0`.
pub fn calculate_exam_stats(
    answers: &[AttemptAnswer],
    total_marks: f64,
    passing_percentage: f64,
) -> ExamResultStats {
    let total_questions = answers.len();
    let mut attempted_questions = 0;
    let mut correct_answers = 0;
    let mut wrong_answers = 0;
    let mut obtained_marks = 0.0;

    for answer in answers {
        if answer
            .user_answer
            .as_ref()
            .is_some_and(|given| !given.is_blank())
        {
            attempted_questions += 1;
        }
        match answer.is_correct {
            Some(true) => correct_answers += 1,
            Some(false) => wrong_answers += 1,
            None => {}
        }
        obtained_marks += answer.marks_obtained;
    }

    let percentage = if total_marks > 0.0 {
        (obtained_marks / total_marks * 100.0).round()
    } else {
        0.0
    };

    ExamResultStats {
        total_questions,
        attempted_questions,
        correct_answers,
        wrong_answers,
        unanswered: total_questions - attempted_questions,
        total_marks,
        obtained_marks,
        percentage,
        is_passing: percentage >= passing_percentage,
    }
}

/// Runs of consecutive auto-graded-correct answers, in attempt order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorrectStreaks {
    pub current: u32,
    pub longest: u32,
}

/// A wrong, ungraded or unanswered row resets the run; pending manual grades
/// never extend a streak.
pub fn calculate_streaks(answers: &[AttemptAnswer]) -> CorrectStreaks {
    let mut current = 0u32;
    let mut longest = 0u32;
    for answer in answers {
        if answer.is_correct == Some(true) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    CorrectStreaks { current, longest }
}
