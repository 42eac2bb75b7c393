use crate::api::QuizBackend;
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::feedback::{DraftInput, FeedbackDebouncer, FeedbackResponse};
use crate::input::{go_to_question, handle_key, InputAction};
use crate::models::{AppState, QuestionId, SubmissionResult};
use crate::render::BannerTone;
use crate::session::QuizSession;
use crate::ui::{draw_quit_confirmation, draw_quiz, draw_results, draw_submit_confirmation};
use crate::view::{FeedbackPanel, QuizView};
use crossterm::event::KeyEvent;
use ratatui::Frame;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

pub const SUBMIT_NETWORK_MESSAGE: &str =
    "Unable to submit the quiz. Please check your connection and try again.";

/// Results of background calls, delivered back to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    Submitted(Result<SubmissionResult, QuizError>),
    Hint {
        question_id: QuestionId,
        result: Result<String, QuizError>,
    },
    PendingCount(Result<u32, QuizError>),
}

/// Ties the session, the view and the background work together. Network
/// calls run on spawned tasks and report back through `AppEvent`s, so the
/// session is only ever touched from the event loop.
pub struct App {
    pub session: QuizSession,
    pub view: QuizView,
    pub state: AppState,
    backend: Arc<dyn QuizBackend>,
    debouncer: FeedbackDebouncer,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        session: QuizSession,
        config: &QuizConfig,
        feedback_tx: mpsc::UnboundedSender<FeedbackResponse>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let backend = session.backend();
        let debouncer = FeedbackDebouncer::new(
            Arc::clone(&backend),
            config.feedback_delay,
            config.feedback_min_chars,
            feedback_tx,
        );
        let mut view = QuizView::new();
        go_to_question(&session, &mut view, 0);

        let state = if session.result().is_some() {
            AppState::Results
        } else {
            AppState::Quiz
        };

        Self {
            session,
            view,
            state,
            backend,
            debouncer,
            events,
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match handle_key(&mut self.session, &mut self.view, key, &mut self.state) {
            InputAction::None => {}
            InputAction::DraftChanged(question_id, draft) => {
                self.on_draft_changed(question_id, &draft)
            }
            InputAction::RequestHint(question_id) => self.request_hint(question_id),
            InputAction::Submit => self.start_submission(),
            InputAction::Exit => {
                self.debouncer.cancel_all();
                return true;
            }
        }
        false
    }

    fn on_draft_changed(&mut self, question_id: QuestionId, draft: &str) {
        let wants_feedback = self
            .session
            .page()
            .question(question_id)
            .is_some_and(|q| q.wants_ai_feedback());
        if !wants_feedback {
            return;
        }

        match self.debouncer.on_input(question_id, draft) {
            DraftInput::Hidden => {
                self.view.feedback.remove(&question_id);
            }
            DraftInput::Scheduled { .. } => {
                self.view
                    .feedback
                    .entry(question_id)
                    .or_insert(FeedbackPanel::Waiting);
            }
        }
    }

    pub fn on_feedback(&mut self, response: FeedbackResponse) {
        match self.debouncer.accept(response) {
            Some(FeedbackResponse::Ready {
                question_id,
                feedback,
                ..
            }) => {
                self.view
                    .feedback
                    .insert(question_id, FeedbackPanel::Ready(feedback));
            }
            Some(FeedbackResponse::Error { question_id, .. }) => {
                self.view.feedback.remove(&question_id);
            }
            None => {}
        }
    }

    fn request_hint(&mut self, question_id: QuestionId) {
        self.view.hints_loading.insert(question_id);
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.hint(question_id).await;
            let _ = events.send(AppEvent::Hint {
                question_id,
                result,
            });
        });
    }

    fn start_submission(&mut self) {
        let ticket = match self.session.begin_submission() {
            Ok(ticket) => ticket,
            Err(QuizError::Validation { .. }) => {
                self.view.notify(
                    BannerTone::Warning,
                    "Attention",
                    "Please answer every question before submitting.",
                );
                return;
            }
            Err(e) => {
                self.view.notify(BannerTone::Danger, "Error", e.to_string());
                return;
            }
        };

        self.debouncer.cancel_all();
        self.view.notification = None;

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend.submit_quiz(ticket.slide_id, &ticket.payload).await;
            let _ = events.send(AppEvent::Submitted(outcome));
        });
    }

    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Submitted(outcome) => self.on_submitted(outcome),
            AppEvent::Hint {
                question_id,
                result,
            } => {
                self.view.hints_loading.remove(&question_id);
                if let Err(e) = self.session.finish_hint(question_id, result) {
                    self.view.notify(BannerTone::Info, "Hint", e.to_string());
                }
            }
            AppEvent::PendingCount(Ok(count)) => {
                self.view.pending_badge = Some(count);
            }
            AppEvent::PendingCount(Err(e)) => {
                log::warn!("Error getting pending count: {}", e);
            }
        }
    }

    fn on_submitted(&mut self, outcome: Result<SubmissionResult, QuizError>) {
        match self.session.finish_submission(outcome) {
            Ok(_) => {
                self.state = AppState::Results;
                self.view.results_scroll_y = 0;
                self.view.feedback.clear();
                self.refresh_pending_badge();
            }
            Err(QuizError::Network(_)) => {
                self.view
                    .notify(BannerTone::Danger, "Error", SUBMIT_NETWORK_MESSAGE);
            }
            Err(e) => {
                let tone = if e.is_retryable() {
                    BannerTone::Danger
                } else {
                    BannerTone::Warning
                };
                self.view.notify(tone, "Error", e.to_string());
            }
        }
    }

    fn refresh_pending_badge(&self) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let slide_id = self.session.slide_id();
        tokio::spawn(async move {
            let result = backend.pending_count(Some(slide_id)).await;
            let _ = events.send(AppEvent::PendingCount(result));
        });
    }

    /// Periodic housekeeping; returns true when a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.view.expire_notification(now)
    }

    pub fn draw(&mut self, f: &mut Frame) {
        match self.state {
            AppState::Quiz => draw_quiz(f, &self.session, &mut self.view),
            AppState::SubmitConfirm => draw_submit_confirmation(f),
            AppState::QuitConfirm => {
                draw_quit_confirmation(f, !self.session.store().is_empty())
            }
            AppState::Results => draw_results(f, &self.session, &mut self.view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;
    use crate::models::{Answer, Question, QuestionKind, QuestionResult, SlideId};
    use crate::page::QuizPage;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::collections::BTreeMap;
    use std::time::Duration;

    struct Harness {
        app: App,
        backend: Arc<MockBackend>,
        feedback_rx: mpsc::UnboundedReceiver<FeedbackResponse>,
        events_rx: mpsc::UnboundedReceiver<AppEvent>,
    }

    fn harness(backend: MockBackend) -> Harness {
        let mut essay = Question::sample(2, QuestionKind::OpenText);
        essay.ai_feedback = true;
        let page = QuizPage {
            slide_id: SlideId(30),
            title: "Iterators".to_string(),
            questions: vec![Question::sample(1, QuestionKind::SingleChoice), essay],
        };
        let backend = Arc::new(backend);
        let mut session = QuizSession::new(page, backend.clone(), None);
        session.start();

        let config = QuizConfig {
            feedback_delay: Duration::from_millis(100),
            feedback_min_chars: 5,
            ..QuizConfig::default()
        };
        let (feedback_tx, feedback_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Harness {
            app: App::new(session, &config, feedback_tx, events_tx),
            backend,
            feedback_rx,
            events_rx,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn fill_in(app: &mut App) {
        app.session
            .set_answer(QuestionId(1), Answer::single(12))
            .unwrap();
        app.session
            .set_answer(QuestionId(2), Answer::text("lazy adapters"))
            .unwrap();
    }

    fn graded(percentage: f64, passed: bool) -> SubmissionResult {
        SubmissionResult {
            percentage,
            passed,
            graded_count: 2,
            results: BTreeMap::from([
                (
                    QuestionId(1),
                    QuestionResult::Graded {
                        is_correct: true,
                        score: Some(100.0),
                        feedback: None,
                    },
                ),
                (
                    QuestionId(2),
                    QuestionResult::Graded {
                        is_correct: false,
                        score: Some(40.0),
                        feedback: Some("Mention laziness.".to_string()),
                    },
                ),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_flow_reaches_results() {
        let backend = MockBackend {
            pending: 2,
            ..MockBackend::new()
        };
        backend.queue_submit(Ok(graded(70.0, true)));
        let mut h = harness(backend);
        fill_in(&mut h.app);

        assert!(!h.app.handle_key(ctrl('s')));
        assert_eq!(h.app.state, AppState::SubmitConfirm);
        assert!(!h.app.handle_key(key(KeyCode::Char('y'))));
        assert!(h.app.session.is_submitting());

        let event = h.events_rx.recv().await.unwrap();
        h.app.on_event(event);
        assert_eq!(h.app.state, AppState::Results);
        assert!(h.app.session.store().is_empty());
        assert_eq!(h.backend.submit_count(), 1);

        let event = h.events_rx.recv().await.unwrap();
        h.app.on_event(event);
        assert_eq!(h.app.view.pending_badge, Some(2));
    }

    #[tokio::test]
    async fn test_network_failure_keeps_answers() {
        let backend = MockBackend::new();
        backend.queue_submit(Err(QuizError::Network("connection refused".to_string())));
        let mut h = harness(backend);
        fill_in(&mut h.app);

        h.app.handle_key(ctrl('s'));
        h.app.handle_key(key(KeyCode::Char('y')));
        let event = h.events_rx.recv().await.unwrap();
        h.app.on_event(event);

        assert_eq!(h.app.state, AppState::Quiz);
        assert!(!h.app.session.is_submitting());
        assert_eq!(h.app.session.answered_count(), 2);
        let notification = h.app.view.notification.as_ref().unwrap();
        assert_eq!(notification.message, SUBMIT_NETWORK_MESSAGE);
    }

    #[tokio::test]
    async fn test_server_error_message_shown_verbatim() {
        let backend = MockBackend::new();
        backend.queue_submit(Err(QuizError::Server {
            code: "max_attempts_reached".to_string(),
            message: "You have used all 3 attempts.".to_string(),
        }));
        let mut h = harness(backend);
        fill_in(&mut h.app);

        h.app.handle_key(ctrl('s'));
        h.app.handle_key(key(KeyCode::Char('y')));
        let event = h.events_rx.recv().await.unwrap();
        h.app.on_event(event);

        let notification = h.app.view.notification.as_ref().unwrap();
        assert_eq!(notification.message, "You have used all 3 attempts.");
        assert_eq!(notification.tone, BannerTone::Danger);
    }

    #[tokio::test]
    async fn test_hint_is_recorded() {
        let mut h = harness(MockBackend::new());

        h.app.handle_key(ctrl('h'));
        assert!(h.app.view.hints_loading.contains(&QuestionId(1)));

        let event = h.events_rx.recv().await.unwrap();
        h.app.on_event(event);
        assert!(h.app.view.hints_loading.is_empty());
        assert_eq!(
            h.app.session.hint(QuestionId(1)),
            Some("Re-read the chapter on ownership.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_schedules_feedback() {
        let mut h = harness(MockBackend::new());
        go_to_question(&h.app.session, &mut h.app.view, 1);

        for c in "iter".chars() {
            h.app.handle_key(key(KeyCode::Char(c)));
        }
        assert!(h.app.view.feedback.is_empty());

        for c in " is lazy".chars() {
            h.app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(
            h.app.view.feedback.get(&QuestionId(2)),
            Some(&FeedbackPanel::Waiting)
        );

        let response = h.feedback_rx.recv().await.unwrap();
        h.app.on_feedback(response);
        match h.app.view.feedback.get(&QuestionId(2)) {
            Some(FeedbackPanel::Ready(feedback)) => assert_eq!(feedback.progress, 30),
            other => panic!("unexpected panel: {:?}", other),
        }
        assert_eq!(h.backend.feedback_drafts(), vec!["iter is lazy".to_string()]);
    }

    #[tokio::test]
    async fn test_exit_from_quit_confirmation() {
        let mut h = harness(MockBackend::new());
        assert!(!h.app.handle_key(key(KeyCode::Esc)));
        assert_eq!(h.app.state, AppState::QuitConfirm);
        assert!(h.app.handle_key(key(KeyCode::Char('y'))));
    }

    #[tokio::test]
    async fn test_hint_failure_notifies_unavailable() {
        let mut h = harness(MockBackend {
            hint_text: None,
            ..MockBackend::new()
        });

        h.app.handle_key(ctrl('h'));
        let event = h.events_rx.recv().await.unwrap();
        h.app.on_event(event);

        assert!(h.app.view.hints_loading.is_empty());
        assert!(h.app.session.hint(QuestionId(1)).is_none());
        let notification = h.app.view.notification.as_ref().unwrap();
        assert_eq!(
            notification.message,
            QuizError::HintUnavailable(QuestionId(1)).to_string()
        );
    }
}
