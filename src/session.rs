use crate::api::QuizBackend;
use crate::draft::DraftStorage;
use crate::error::QuizError;
use crate::models::{Answer, Question, QuestionId, SlideId, SubmissionResult};
use crate::page::QuizPage;
use crate::payload::{build_payload, SubmissionPayload};
use crate::render::{render, DisplayModel};
use crate::store::AnswerStore;
use crate::validator::missing_questions;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything needed to perform one submission outside the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTicket {
    pub slide_id: SlideId,
    pub payload: SubmissionPayload,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Answering,
    Submitting,
    Completed(DisplayModel),
}

/// Quiz state for one page view.
pub struct QuizSession {
    page: QuizPage,
    store: AnswerStore,
    backend: Arc<dyn QuizBackend>,
    phase: Phase,
    started: bool,
    highlighted: Vec<QuestionId>,
    hints: HashMap<QuestionId, String>,
}

impl QuizSession {
    pub fn new(
        page: QuizPage,
        backend: Arc<dyn QuizBackend>,
        storage: Option<Arc<dyn DraftStorage>>,
    ) -> Self {
        let store = AnswerStore::new(&page.questions, storage);
        Self {
            page,
            store,
            backend,
            phase: Phase::Answering,
            started: false,
            highlighted: Vec::new(),
            hints: HashMap::new(),
        }
    }

    /// Hydrates answers from the saved draft. Only the first call per
    /// session does anything; returns the number of restored answers.
    pub fn start(&mut self) -> usize {
        if self.started {
            return 0;
        }
        self.started = true;
        self.store.restore(self.page.slide_id)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn page(&self) -> &QuizPage {
        &self.page
    }

    pub fn slide_id(&self) -> SlideId {
        self.page.slide_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.page.questions
    }

    pub fn answer(&self, question_id: QuestionId) -> Option<&Answer> {
        self.store.get(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.store
            .all_entries()
            .iter()
            .filter(|(_, answer)| answer.is_filled())
            .count()
    }

    pub fn store(&self) -> &AnswerStore {
        &self.store
    }

    pub fn backend(&self) -> Arc<dyn QuizBackend> {
        Arc::clone(&self.backend)
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn result(&self) -> Option<&DisplayModel> {
        match &self.phase {
            Phase::Completed(model) => Some(model),
            _ => None,
        }
    }

    /// Questions flagged by the last failed validation and not edited since.
    pub fn highlighted(&self) -> &[QuestionId] {
        &self.highlighted
    }

    pub fn is_highlighted(&self, question_id: QuestionId) -> bool {
        self.highlighted.contains(&question_id)
    }

    fn ensure_editable(&self) -> Result<(), QuizError> {
        match self.phase {
            Phase::Answering => Ok(()),
            Phase::Submitting => Err(QuizError::SubmissionInFlight),
            Phase::Completed(_) => Err(QuizError::AlreadySubmitted),
        }
    }

    /// Records an answer and saves the draft.
    pub fn set_answer(&mut self, question_id: QuestionId, answer: Answer) -> Result<(), QuizError> {
        self.ensure_editable()?;
        self.store.set(question_id, answer)?;
        self.highlighted.retain(|id| *id != question_id);
        self.store.persist(self.page.slide_id);
        Ok(())
    }

    pub fn clear_answer(&mut self, question_id: QuestionId) -> Result<(), QuizError> {
        self.ensure_editable()?;
        if !self.store.contains_question(question_id) {
            return Err(QuizError::UnknownQuestion(question_id));
        }
        self.store.remove(question_id);
        self.store.persist(self.page.slide_id);
        Ok(())
    }

    /// Checks completeness and flags the unanswered questions.
    pub fn validate(&mut self) -> Result<(), QuizError> {
        let missing = missing_questions(&self.page.questions, &self.store);
        if missing.is_empty() {
            self.highlighted.clear();
            Ok(())
        } else {
            self.highlighted = missing.clone();
            Err(QuizError::Validation { missing })
        }
    }

    /// Validates, encodes and locks the session for one submission. The
    /// lock is released by `finish_submission`.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, QuizError> {
        self.ensure_editable()?;
        self.validate()?;

        let payload = build_payload(&self.store);
        self.phase = Phase::Submitting;
        log::info!(
            "Submitting quiz for slide {} ({} fields)",
            self.page.slide_id,
            payload.len()
        );

        Ok(SubmissionTicket {
            slide_id: self.page.slide_id,
            payload,
        })
    }

    /// Applies the outcome of the call started by `begin_submission`. On
    /// success the answers and the draft are cleared; on failure the form
    /// is left as it was so the user can retry.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionResult, QuizError>,
    ) -> Result<DisplayModel, QuizError> {
        if self.phase != Phase::Submitting {
            log::warn!("Ignoring submission outcome with no submission in flight");
            return Err(match self.phase {
                Phase::Completed(_) => QuizError::AlreadySubmitted,
                _ => QuizError::NoSubmissionInFlight,
            });
        }

        match outcome {
            Ok(result) => {
                self.store.clear(self.page.slide_id);
                let model = render(&result);
                self.phase = Phase::Completed(model.clone());
                Ok(model)
            }
            Err(e) => {
                log::error!("Quiz submission failed for slide {}: {}", self.page.slide_id, e);
                self.phase = Phase::Answering;
                Err(e)
            }
        }
    }

    pub fn hint(&self, question_id: QuestionId) -> Option<&str> {
        self.hints.get(&question_id).map(String::as_str)
    }

    /// Applies the outcome of a hint fetch. The first hint received for a
    /// question is kept; fetch failures become `HintUnavailable`.
    pub fn finish_hint(
        &mut self,
        question_id: QuestionId,
        outcome: Result<String, QuizError>,
    ) -> Result<&str, QuizError> {
        if self.page.question(question_id).is_none() {
            return Err(QuizError::UnknownQuestion(question_id));
        }
        match outcome {
            Ok(hint) => Ok(self.hints.entry(question_id).or_insert(hint).as_str()),
            Err(e) => {
                log::warn!("Error getting hint for question {}: {}", question_id, e);
                Err(QuizError::HintUnavailable(question_id))
            }
        }
    }
}
