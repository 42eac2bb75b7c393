use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub u64);

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[serde(alias = "simple_choice", alias = "true_false")]
    SingleChoice,
    #[serde(alias = "multiple_choice")]
    MultiChoice,
    #[serde(alias = "text_box")]
    OpenText,
}

impl QuestionKind {
    pub fn is_choice(self) -> bool {
        !matches!(self, QuestionKind::OpenText)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: u64,
    pub label: String,
}

/// A question as declared by the slide page, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub kind: QuestionKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub ai_feedback: bool,
}

impl Question {
    /// Live AI feedback only applies to open-text questions flagged for it.
    pub fn wants_ai_feedback(&self) -> bool {
        self.ai_feedback && self.kind == QuestionKind::OpenText
    }
}

#[cfg(test)]
impl Question {
    pub fn sample(id: u64, kind: QuestionKind) -> Self {
        let options = if kind.is_choice() {
            (1..=3)
                .map(|n| ChoiceOption {
                    id: id * 10 + n,
                    label: format!("Option {}", n),
                })
                .collect()
        } else {
            vec![]
        };
        Question {
            id: QuestionId(id),
            kind,
            title: format!("Question {}", id),
            options,
            ai_feedback: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    Single(u64),
    Multiple(BTreeSet<u64>),
}

impl Choice {
    pub fn is_empty(&self) -> bool {
        match self {
            Choice::Single(_) => false,
            Choice::Multiple(ids) => ids.is_empty(),
        }
    }

    pub fn contains(&self, option_id: u64) -> bool {
        match self {
            Choice::Single(id) => *id == option_id,
            Choice::Multiple(ids) => ids.contains(&option_id),
        }
    }
}

/// Draft format: `{"type": "choice", "value": 12}` or `{"type": "text", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Answer {
    Choice(Choice),
    Text(String),
}

impl Answer {
    pub fn single(option_id: u64) -> Self {
        Answer::Choice(Choice::Single(option_id))
    }

    pub fn multiple(option_ids: impl IntoIterator<Item = u64>) -> Self {
        Answer::Choice(Choice::Multiple(option_ids.into_iter().collect()))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(value.into())
    }

    /// A choice with a selection, or text with non-whitespace content.
    pub fn is_filled(&self) -> bool {
        match self {
            Answer::Choice(choice) => !choice.is_empty(),
            Answer::Text(text) => !text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionResultRaw {
    #[serde(default)]
    pending: bool,
    #[serde(default)]
    skipped: bool,
    #[serde(default)]
    is_correct: Option<bool>,
    #[serde(default)]
    score_100: Option<f64>,
    #[serde(default)]
    feedback: Option<String>,
}

/// Outcome for one question. `pending` wins over `skipped`, which wins over
/// the automatic correction fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "QuestionResultRaw")]
pub enum QuestionResult {
    Pending,
    Skipped,
    Graded {
        is_correct: bool,
        score: Option<f64>,
        feedback: Option<String>,
    },
}

impl From<QuestionResultRaw> for QuestionResult {
    fn from(raw: QuestionResultRaw) -> Self {
        if raw.pending {
            QuestionResult::Pending
        } else if raw.skipped {
            QuestionResult::Skipped
        } else {
            QuestionResult::Graded {
                is_correct: raw.is_correct.unwrap_or(false),
                score: raw.score_100,
                feedback: raw.feedback.filter(|f| !f.trim().is_empty()),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub pending_count: u32,
    #[serde(default, rename = "graded_questions_count")]
    pub graded_count: u32,
    #[serde(default)]
    pub results: BTreeMap<QuestionId, QuestionResult>,
    #[serde(default)]
    pub attempts: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    TooShort,
    Weak,
    Medium,
    #[serde(alias = "good")]
    Strong,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftFeedbackRaw {
    #[serde(default)]
    progress: i64,
    status: Option<FeedbackStatus>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    found_keywords: Vec<String>,
    #[serde(default)]
    missing_keywords: Vec<String>,
}

/// Live feedback on an unsubmitted open-text answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "DraftFeedbackRaw")]
pub struct DraftFeedback {
    pub progress: u8,
    pub status: FeedbackStatus,
    pub message: String,
    pub found_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

impl From<DraftFeedbackRaw> for DraftFeedback {
    fn from(raw: DraftFeedbackRaw) -> Self {
        DraftFeedback {
            progress: raw.progress.clamp(0, 100) as u8,
            status: raw.status.unwrap_or(FeedbackStatus::Weak),
            message: raw.message,
            found_keywords: raw.found_keywords,
            missing_keywords: raw.missing_keywords,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Quiz,
    SubmitConfirm,
    QuitConfirm,
    Results,
}
