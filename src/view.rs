use crate::models::{DraftFeedback, QuestionId};
use crate::render::BannerTone;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Notification {
    pub tone: BannerTone,
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTIFICATION_TTL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackPanel {
    Waiting,
    Ready(DraftFeedback),
}

/// Cursor and presentation state of the terminal page; answers themselves
/// live in the session.
#[derive(Debug, Default)]
pub struct QuizView {
    pub current_index: usize,
    pub option_cursor: usize,
    pub cursor_position: usize,
    pub input_scroll_y: u16,
    pub results_scroll_y: u16,
    pub notification: Option<Notification>,
    pub feedback: HashMap<QuestionId, FeedbackPanel>,
    pub hints_loading: HashSet<QuestionId>,
    pub pending_badge: Option<u32>,
}

impl QuizView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, tone: BannerTone, title: &str, message: impl Into<String>) {
        self.notification = Some(Notification {
            tone,
            title: title.to_string(),
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Drops the notification once it has been shown long enough.
    /// Returns true when something changed.
    pub fn expire_notification(&mut self, now: Instant) -> bool {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
            return true;
        }
        false
    }
}
