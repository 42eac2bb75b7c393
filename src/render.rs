use crate::models::{QuestionId, QuestionResult, SlideId, SubmissionResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub percent: u32,
    pub graded_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub tone: BannerTone,
    pub icon: &'static str,
    pub headline: String,
    pub score: Option<ScoreLine>,
    pub pending_note: Option<String>,
    pub attempts_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionCard {
    AwaitingGrading,
    Unanswered,
    Graded {
        is_correct: bool,
        score: Option<u8>,
        feedback: Option<String>,
    },
}

impl QuestionCard {
    pub fn title(&self) -> &'static str {
        match self {
            QuestionCard::AwaitingGrading => "Awaiting manual grading",
            QuestionCard::Unanswered => "Unanswered",
            QuestionCard::Graded { is_correct: true, .. } => "Correct answer!",
            QuestionCard::Graded { is_correct: false, .. } => "Incorrect answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
    pub banner: Banner,
    pub questions: BTreeMap<QuestionId, QuestionCard>,
    pub continue_label: &'static str,
}

fn plural(count: u32) -> &'static str {
    if count > 1 { "s" } else { "" }
}

/// Rounded and clamped to the 0..=100 scale.
pub fn round_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u8
}

fn banner_tone(result: &SubmissionResult) -> BannerTone {
    if result.pending_count > 0 {
        BannerTone::Info
    } else if result.passed {
        BannerTone::Success
    } else if result.percentage >= 50.0 {
        BannerTone::Warning
    } else {
        BannerTone::Danger
    }
}

fn banner(result: &SubmissionResult) -> Banner {
    let tone = banner_tone(result);
    let pending = result.pending_count;

    let (icon, headline) = match tone {
        BannerTone::Info => (
            "⏳",
            format!(
                "Some answers are awaiting review by your teacher ({} question{})",
                pending,
                plural(pending)
            ),
        ),
        BannerTone::Success => ("🎉", "Congratulations! You passed this quiz!".to_string()),
        BannerTone::Warning | BannerTone::Danger => {
            ("📚", "Keep going! Review the lesson and try again.".to_string())
        }
    };

    let score = (result.graded_count > 0).then(|| ScoreLine {
        percent: u32::from(round_score(result.percentage)),
        graded_count: result.graded_count,
    });

    let pending_note = (pending > 0).then(|| {
        format!(
            "{} answer{} awaiting review",
            pending,
            plural(pending)
        )
    });

    let attempts_note = match (result.attempts, result.max_attempts) {
        (Some(attempts), Some(max)) if max > 0 => Some(format!("Attempt {} of {}", attempts, max)),
        _ => None,
    };

    Banner {
        tone,
        icon,
        headline,
        score,
        pending_note,
        attempts_note,
    }
}

fn card(result: &QuestionResult) -> QuestionCard {
    match result {
        QuestionResult::Pending => QuestionCard::AwaitingGrading,
        QuestionResult::Skipped => QuestionCard::Unanswered,
        QuestionResult::Graded {
            is_correct,
            score,
            feedback,
        } => QuestionCard::Graded {
            is_correct: *is_correct,
            score: score.map(round_score),
            feedback: feedback.clone(),
        },
    }
}

/// Maps a submission result to what the results view shows. Pure.
pub fn render(result: &SubmissionResult) -> DisplayModel {
    let questions = result
        .results
        .iter()
        .map(|(id, question)| (*id, card(question)))
        .collect();

    let continue_label = if result.pending_count > 0 {
        "Continue"
    } else {
        "Continue course"
    };

    DisplayModel {
        banner: banner(result),
        questions,
        continue_label,
    }
}

/// Tooltip for the pending-answers badge.
pub fn pending_badge_title(count: u32, slide_id: Option<SlideId>) -> String {
    match slide_id {
        Some(_) => format!("{} answer(s) awaiting review for this quiz", count),
        None => format!("{} answer(s) awaiting grading", count),
    }
}
