use crate::models::QuestionId;
use thiserror::Error;

/// Errors surfaced by the quiz flow. None of them is fatal: every variant
/// leaves the session in a state where the user can fix and retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("please answer every question before submitting ({} missing)", missing.len())]
    Validation { missing: Vec<QuestionId> },
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("no submission is in progress")]
    NoSubmissionInFlight,
    #[error("this quiz has already been submitted")]
    AlreadySubmitted,
    #[error("no hint available for question {0}")]
    HintUnavailable(QuestionId),
    #[error("unable to reach the server: {0}")]
    Network(String),
    #[error("{message}")]
    Server { code: String, message: String },
}

impl QuizError {
    /// Failures the user can retry as-is (the form is left untouched).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuizError::Network(_) | QuizError::Server { .. } | QuizError::Validation { .. }
        )
    }
}

impl From<reqwest::Error> for QuizError {
    fn from(e: reqwest::Error) -> Self {
        QuizError::Network(e.to_string())
    }
}

/// Draft persistence failures. These are logged by the store and never
/// reach the user.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("draft storage is unavailable")]
    Unavailable,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt draft: {0}")]
    Corrupt(#[from] serde_json::Error),
}
