use super::envelope::{decode_result, RpcRequest, RpcResponse};
use super::QuizBackend;
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::models::{DraftFeedback, QuestionId, SlideId, SubmissionResult};
use crate::payload::SubmissionPayload;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

pub const SUBMIT_FAILED_MESSAGE: &str = "An error occurred while submitting the quiz.";
pub const FEEDBACK_FAILED_MESSAGE: &str = "AI feedback is not available for this question.";
pub const HINT_FAILED_MESSAGE: &str = "No hint is available for this question.";

#[derive(Debug, Deserialize)]
struct HintResponse {
    hint: String,
}

#[derive(Debug, Deserialize)]
struct PendingCountResponse {
    #[serde(default)]
    pending_count: u32,
}

/// JSON-RPC client for the platform's quiz routes.
#[derive(Debug)]
pub struct HttpQuizClient {
    http: reqwest::Client,
    base_url: String,
    next_id: AtomicU64,
}

impl HttpQuizClient {
    pub fn new(config: &QuizConfig) -> Result<Self, QuizError> {
        let mut headers = HeaderMap::new();
        if let Some(session_id) = &config.session_id {
            let cookie = HeaderValue::from_str(&format!("session_id={}", session_id))
                .map_err(|e| QuizError::Network(format!("invalid session id: {}", e)))?;
            headers.insert(COOKIE, cookie);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call<P, T>(&self, path: &str, params: &P, fallback_message: &str) -> Result<T, QuizError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = self.url(path);
        log::debug!("POST {} (rpc id {})", url, id);

        let response: RpcResponse = self
            .http
            .post(&url)
            .json(&RpcRequest::call(params, id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_result(response, fallback_message)
    }
}

pub fn submit_path(slide_id: SlideId) -> String {
    format!("/slides/slide/{}/quiz/submit", slide_id)
}

pub fn ai_feedback_path(question_id: QuestionId) -> String {
    format!("/slides/question/{}/ai_feedback", question_id)
}

pub fn hint_path(question_id: QuestionId) -> String {
    format!("/slides/question/{}/hint", question_id)
}

pub const PENDING_COUNT_PATH: &str = "/slides/my_results/pending_count";

#[async_trait]
impl QuizBackend for HttpQuizClient {
    async fn submit_quiz(
        &self,
        slide_id: SlideId,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionResult, QuizError> {
        log::info!("Submitting {} answer fields for slide {}", payload.len(), slide_id);
        let result: SubmissionResult = self
            .call(&submit_path(slide_id), payload, SUBMIT_FAILED_MESSAGE)
            .await?;
        log::info!(
            "Slide {} graded: {:.2}% passed={} pending={}",
            slide_id,
            result.percentage,
            result.passed,
            result.pending_count
        );
        Ok(result)
    }

    async fn ai_feedback(
        &self,
        question_id: QuestionId,
        draft_answer: &str,
    ) -> Result<DraftFeedback, QuizError> {
        let params = json!({ "draft_answer": draft_answer });
        self.call(&ai_feedback_path(question_id), &params, FEEDBACK_FAILED_MESSAGE)
            .await
    }

    async fn hint(&self, question_id: QuestionId) -> Result<String, QuizError> {
        let params = json!({});
        let response: HintResponse = self
            .call(&hint_path(question_id), &params, HINT_FAILED_MESSAGE)
            .await?;
        Ok(response.hint)
    }

    async fn pending_count(&self, slide_id: Option<SlideId>) -> Result<u32, QuizError> {
        let params = match slide_id {
            Some(id) => json!({ "slide_id": id }),
            None => json!({ "slide_id": false }),
        };
        let response: PendingCountResponse = self
            .call(PENDING_COUNT_PATH, &params, "Unable to load pending count.")
            .await?;
        Ok(response.pending_count)
    }
}
