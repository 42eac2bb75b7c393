use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct QuizLayout {
    pub header_area: Rect,
    pub question_area: Rect,
    pub answer_area: Rect,
    pub feedback_area: Rect,
    pub notice_area: Rect,
    pub help_area: Rect,
}

pub struct ResultsLayout {
    pub header_area: Rect,
    pub banner_area: Rect,
    pub content_area: Rect,
    pub footer_area: Rect,
}

/// Height of the live feedback panel when it is shown.
pub const FEEDBACK_HEIGHT: u16 = 6;
/// Height of the notification line when it is shown.
pub const NOTICE_HEIGHT: u16 = 3;

pub fn calculate_quiz_chunks(area: Rect, show_feedback: bool, show_notice: bool) -> QuizLayout {
    let feedback_height = if show_feedback { FEEDBACK_HEIGHT } else { 0 };
    let notice_height = if show_notice { NOTICE_HEIGHT } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(5),
            Constraint::Length(feedback_height),
            Constraint::Length(notice_height),
            Constraint::Length(4),
        ])
        .split(area);

    QuizLayout {
        header_area: chunks[0],
        question_area: chunks[1],
        answer_area: chunks[2],
        feedback_area: chunks[3],
        notice_area: chunks[4],
        help_area: chunks[5],
    }
}

pub fn calculate_results_chunks(area: Rect) -> ResultsLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    ResultsLayout {
        header_area: chunks[0],
        banner_area: chunks[1],
        content_area: chunks[2],
        footer_area: chunks[3],
    }
}
