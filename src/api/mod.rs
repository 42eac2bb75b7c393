pub mod client;
pub mod envelope;

use crate::error::QuizError;
use crate::models::{DraftFeedback, QuestionId, SlideId, SubmissionResult};
use crate::payload::SubmissionPayload;
use async_trait::async_trait;

pub use client::HttpQuizClient;

/// The platform routes the quiz talks to.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn submit_quiz(
        &self,
        slide_id: SlideId,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionResult, QuizError>;

    async fn ai_feedback(
        &self,
        question_id: QuestionId,
        draft_answer: &str,
    ) -> Result<DraftFeedback, QuizError>;

    async fn hint(&self, question_id: QuestionId) -> Result<String, QuizError>;

    async fn pending_count(&self, slide_id: Option<SlideId>) -> Result<u32, QuizError>;
}
