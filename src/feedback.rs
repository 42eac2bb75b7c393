use crate::api::QuizBackend;
use crate::models::{DraftFeedback, QuestionId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum FeedbackResponse {
    Ready {
        question_id: QuestionId,
        generation: u64,
        feedback: DraftFeedback,
    },
    Error {
        question_id: QuestionId,
        generation: u64,
        error: String,
    },
}

impl FeedbackResponse {
    fn key(&self) -> (QuestionId, u64) {
        match self {
            FeedbackResponse::Ready {
                question_id,
                generation,
                ..
            }
            | FeedbackResponse::Error {
                question_id,
                generation,
                ..
            } => (*question_id, *generation),
        }
    }
}

/// What the UI should do with the feedback panel right after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftInput {
    /// Draft too short; hide the panel, nothing was scheduled.
    Hidden,
    /// A request is scheduled after the debounce delay.
    Scheduled { generation: u64 },
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Debounced live feedback on open-text drafts.
///
/// Each keystroke cancels the question's pending request and schedules a
/// new one after `delay`. Responses travel over an mpsc channel tagged with
/// the generation they were issued for; `accept` drops any that a newer
/// keystroke has superseded.
pub struct FeedbackDebouncer {
    backend: Arc<dyn QuizBackend>,
    delay: Duration,
    min_chars: usize,
    tx: mpsc::UnboundedSender<FeedbackResponse>,
    latest: HashMap<QuestionId, InFlight>,
    next_generation: u64,
}

impl FeedbackDebouncer {
    pub fn new(
        backend: Arc<dyn QuizBackend>,
        delay: Duration,
        min_chars: usize,
        tx: mpsc::UnboundedSender<FeedbackResponse>,
    ) -> Self {
        Self {
            backend,
            delay,
            min_chars,
            tx,
            latest: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn on_input(&mut self, question_id: QuestionId, draft: &str) -> DraftInput {
        self.cancel(question_id);

        self.next_generation += 1;
        let generation = self.next_generation;
        let token = CancellationToken::new();
        self.latest.insert(
            question_id,
            InFlight {
                generation,
                token: token.clone(),
            },
        );

        if draft.chars().count() < self.min_chars {
            return DraftInput::Hidden;
        }

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let delay = self.delay;
        let draft = draft.to_string();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            log::debug!("Requesting AI feedback for question {}", question_id);
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = backend.ai_feedback(question_id, &draft) => result,
            };

            let response = match result {
                Ok(feedback) => FeedbackResponse::Ready {
                    question_id,
                    generation,
                    feedback,
                },
                Err(e) => {
                    log::warn!("AI feedback error for question {}: {}", question_id, e);
                    FeedbackResponse::Error {
                        question_id,
                        generation,
                        error: e.to_string(),
                    }
                }
            };
            // Receiver gone means the UI shut down.
            let _ = tx.send(response);
        });

        DraftInput::Scheduled { generation }
    }

    /// Stops the pending request for `question_id`, if any.
    pub fn cancel(&mut self, question_id: QuestionId) {
        if let Some(previous) = self.latest.remove(&question_id) {
            previous.token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, in_flight) in self.latest.drain() {
            in_flight.token.cancel();
        }
    }

    /// Returns the response if it answers the latest keystroke of its
    /// question, `None` if it is stale.
    pub fn accept(&self, response: FeedbackResponse) -> Option<FeedbackResponse> {
        let (question_id, generation) = response.key();
        match self.latest.get(&question_id) {
            Some(current) if current.generation == generation => Some(response),
            _ => {
                log::debug!(
                    "Discarding stale feedback for question {} (generation {})",
                    question_id,
                    generation
                );
                None
            }
        }
    }
}
