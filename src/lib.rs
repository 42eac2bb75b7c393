pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod feedback;
pub mod input;
pub mod logger;
pub mod models;
pub mod page;
pub mod payload;
pub mod render;
pub mod session;
pub mod store;
pub mod ui;
pub mod utils;
pub mod validator;
pub mod view;

// Re-exports for convenience
pub use api::{HttpQuizClient, QuizBackend};
pub use app::{App, AppEvent};
pub use config::QuizConfig;
pub use db::SqliteDraftStorage;
pub use draft::{draft_key, DraftStorage, MemoryDraftStorage};
pub use error::{QuizError, StorageError};
pub use feedback::{FeedbackDebouncer, FeedbackResponse};
pub use models::{
    Answer, AppState, Choice, DraftFeedback, FeedbackStatus, Question, QuestionId, QuestionKind,
    QuestionResult, SlideId, SubmissionResult,
};
pub use page::{load_page, parse_page, slide_id_from_path, QuizPage};
pub use payload::{build_payload, SubmissionPayload};
pub use render::{pending_badge_title, render, BannerTone, DisplayModel, QuestionCard};
pub use session::QuizSession;
pub use store::AnswerStore;
pub use validator::is_complete;
pub use view::QuizView;
