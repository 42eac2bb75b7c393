use crate::models::{Answer, FeedbackStatus, Question, QuestionKind};
use crate::session::QuizSession;
use crate::ui::layout::calculate_quiz_chunks;
use crate::ui::{key_span, tone_color};
use crate::utils::{follow_cursor, word_count_label, wrapped_cursor_position};
use crate::view::{FeedbackPanel, QuizView};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

pub fn status_color(status: FeedbackStatus) -> Color {
    match status {
        FeedbackStatus::TooShort | FeedbackStatus::Weak => Color::Red,
        FeedbackStatus::Medium => Color::Yellow,
        FeedbackStatus::Strong => Color::Green,
    }
}

pub fn draw_quiz(f: &mut Frame, session: &QuizSession, view: &mut QuizView) {
    let Some(question) = session.questions().get(view.current_index) else {
        return;
    };
    let panel = view.feedback.get(&question.id).cloned();
    let show_feedback = question.wants_ai_feedback() && panel.is_some();
    let show_notice = session.is_submitting() || view.notification.is_some();
    let layout = calculate_quiz_chunks(f.area(), show_feedback, show_notice);

    let progress = format!(
        "Question {} / {} - {}  ({} answered)",
        view.current_index + 1,
        session.questions().len(),
        session.page().title,
        session.answered_count()
    );
    let header = Paragraph::new(progress)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let mut question_text = Text::from(question.title.as_str());
    if let Some(hint) = session.hint(question.id) {
        question_text.push_line(Line::from(Span::styled(
            format!("Hint: {}", hint),
            Style::default().fg(Color::Yellow),
        )));
    } else if view.hints_loading.contains(&question.id) {
        question_text.push_line(Line::from(Span::styled(
            "Loading hint...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let question_widget = Paragraph::new(question_text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Question"));
    f.render_widget(question_widget, layout.question_area);

    let border_style = if session.is_highlighted(question.id) {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    if question.kind.is_choice() {
        draw_options(f, session, view, question, layout.answer_area, border_style);
    } else {
        draw_text_input(f, session, view, question, layout.answer_area, border_style);
    }

    if show_feedback && let Some(panel) = panel {
        draw_feedback(f, &panel, layout.feedback_area);
    }

    if session.is_submitting() {
        let notice = Paragraph::new("Grading in progress, please wait...")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(notice, layout.notice_area);
    } else if let Some(notification) = &view.notification {
        let color = tone_color(notification.tone);
        let notice = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}: ", notification.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::from(notification.message.as_str()),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(notice, layout.notice_area);
    }

    let first_line = if question.kind.is_choice() {
        vec![
            key_span("↑/↓"),
            Span::from(" Question  "),
            key_span("←/→"),
            Span::from(" Option  "),
            key_span("Space"),
            Span::from(" Select  "),
            key_span("Esc"),
            Span::from(" Quit"),
        ]
    } else {
        vec![
            key_span("↑/↓"),
            Span::from(" Question  "),
            key_span("Enter"),
            Span::from(" New line  "),
            key_span("Esc"),
            Span::from(" Quit"),
        ]
    };
    let help_text = vec![
        Line::from(first_line),
        Line::from(vec![
            key_span("Ctrl+S"),
            Span::from(" Submit quiz  "),
            key_span("Ctrl+H"),
            Span::from(" Hint  "),
            key_span("Ctrl+C"),
            Span::from(" Exit App"),
        ]),
    ];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

fn draw_options(
    f: &mut Frame,
    session: &QuizSession,
    view: &QuizView,
    question: &Question,
    area: Rect,
    border_style: Style,
) {
    let answer = session.answer(question.id);
    let multi = question.kind == QuestionKind::MultiChoice;

    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let selected = matches!(answer, Some(Answer::Choice(choice)) if choice.contains(option.id));
            let marker = match (multi, selected) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(•)",
                (false, false) => "( )",
            };
            let style = if i == view.option_cursor {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{} {}", marker, option.label), style))
        })
        .collect();

    let title = if multi {
        "Choose one or more"
    } else {
        "Choose one"
    };
    let options = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(options, area);
}

fn draw_text_input(
    f: &mut Frame,
    session: &QuizSession,
    view: &mut QuizView,
    question: &Question,
    area: Rect,
    border_style: Style,
) {
    let text = match session.answer(question.id) {
        Some(Answer::Text(text)) => text.as_str(),
        _ => "",
    };

    let visible_height = area.height.saturating_sub(2) as usize;
    let text_width = area.width.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) =
        wrapped_cursor_position(text, view.cursor_position.min(text.len()), text_width);
    let scroll_y = follow_cursor(view.input_scroll_y as usize, cursor_line, visible_height) as u16;
    view.input_scroll_y = scroll_y;

    let content = if text.is_empty() {
        Text::from(Span::styled(
            "[Type your answer here...]",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(text)
    };

    let title = format!("Your Answer ({})", word_count_label(text));
    let input = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((scroll_y, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );
    f.render_widget(input, area);

    if !session.is_submitting() {
        let cursor_x = area.x + 1 + cursor_col as u16;
        let cursor_y = area.y + 1 + (cursor_line as u16).saturating_sub(scroll_y);
        f.set_cursor_position((cursor_x, cursor_y));
    }
}

fn draw_feedback(f: &mut Frame, panel: &FeedbackPanel, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("AI Feedback");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let feedback = match panel {
        FeedbackPanel::Waiting => {
            let waiting = Paragraph::new("Analyzing your answer...")
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(waiting, inner);
            return;
        }
        FeedbackPanel::Ready(feedback) => feedback,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(status_color(feedback.status)))
        .percent(u16::from(feedback.progress))
        .label(format!("{}%", feedback.progress));
    f.render_widget(gauge, chunks[0]);

    let mut text = Text::from(feedback.message.as_str());
    if !feedback.found_keywords.is_empty() {
        text.push_line(Line::from(vec![
            Span::styled("Covered: ", Style::default().fg(Color::Green)),
            Span::from(feedback.found_keywords.join(", ")),
        ]));
    }
    if !feedback.missing_keywords.is_empty() {
        text.push_line(Line::from(vec![
            Span::styled("Consider: ", Style::default().fg(Color::Yellow)),
            Span::from(feedback.missing_keywords.join(", ")),
        ]));
    }
    let details = Paragraph::new(text).wrap(Wrap { trim: true });
    f.render_widget(details, chunks[1]);
}

fn draw_confirmation(f: &mut Frame, title: &str, message: &str, yes: &str, no: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(format!(" {}  ", yes)),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(format!(" {}  ", no)),
        key_span("Ctrl+C"),
        Span::from(" Exit App"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn draw_submit_confirmation(f: &mut Frame) {
    draw_confirmation(
        f,
        "Submit Quiz",
        "Are you sure you want to submit your answers? You will not be able to change them afterwards.",
        "Yes (Submit)",
        "No (Keep editing)",
    );
}

pub fn draw_quit_confirmation(f: &mut Frame, has_answers: bool) {
    let message = if has_answers {
        "Leave the quiz? Your answers are saved as a draft."
    } else {
        "Leave the quiz?"
    };
    draw_confirmation(f, "Quit Quiz", message, "Yes (Quit)", "No (Continue Quiz)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;
    use crate::models::{DraftFeedback, QuestionId, SlideId};
    use crate::page::QuizPage;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn session() -> QuizSession {
        let mut essay = Question::sample(2, QuestionKind::OpenText);
        essay.ai_feedback = true;
        let page = QuizPage {
            slide_id: SlideId(4),
            title: "Lifetimes".to_string(),
            questions: vec![Question::sample(1, QuestionKind::MultiChoice), essay],
        };
        QuizSession::new(page, Arc::new(MockBackend::new()), None)
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(FeedbackStatus::TooShort), Color::Red);
        assert_eq!(status_color(FeedbackStatus::Weak), Color::Red);
        assert_eq!(status_color(FeedbackStatus::Medium), Color::Yellow);
        assert_eq!(status_color(FeedbackStatus::Strong), Color::Green);
    }

    #[test]
    fn test_draw_choice_question() {
        let mut session = session();
        session
            .set_answer(QuestionId(1), Answer::multiple([12]))
            .unwrap();
        let mut view = QuizView::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal.draw(|f| draw_quiz(f, &session, &mut view)).unwrap();
        let screen = screen(&terminal);
        assert!(screen.contains("Question 1 / 2"));
        assert!(screen.contains("[ ] Option 1"));
        assert!(screen.contains("[x] Option 2"));
    }

    #[test]
    fn test_draw_text_question_with_feedback() {
        let mut session = session();
        session
            .set_answer(QuestionId(2), Answer::text("borrow checker"))
            .unwrap();
        let mut view = QuizView::new();
        view.current_index = 1;
        view.feedback.insert(
            QuestionId(2),
            FeedbackPanel::Ready(DraftFeedback {
                progress: 40,
                status: FeedbackStatus::Medium,
                message: "Mention lifetimes.".to_string(),
                found_keywords: vec!["borrow".to_string()],
                missing_keywords: vec![],
            }),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal.draw(|f| draw_quiz(f, &session, &mut view)).unwrap();
        let screen = screen(&terminal);
        assert!(screen.contains("Your Answer (2 words)"));
        assert!(screen.contains("AI Feedback"));
        assert!(screen.contains("40%"));
        assert!(screen.contains("Mention lifetimes."));
    }

    #[test]
    fn test_draw_submitting_notice() {
        let mut session = session();
        session
            .set_answer(QuestionId(1), Answer::multiple([11]))
            .unwrap();
        session
            .set_answer(QuestionId(2), Answer::text("answer"))
            .unwrap();
        session.begin_submission().unwrap();
        let mut view = QuizView::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal.draw(|f| draw_quiz(f, &session, &mut view)).unwrap();
        assert!(screen(&terminal).contains("Grading in progress, please wait..."));
    }

    #[test]
    fn test_text_cursor_follows_word_wrap() {
        let mut session = session();
        let text = "aaaa bbbbbbbb";
        session
            .set_answer(QuestionId(2), Answer::text(text))
            .unwrap();
        let mut view = QuizView::new();
        view.current_index = 1;
        view.cursor_position = text.len();
        // 14 columns leave a 10 column text box inside margins and borders.
        let mut terminal = Terminal::new(TestBackend::new(14, 30)).unwrap();

        terminal.draw(|f| draw_quiz(f, &session, &mut view)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        let buffer = terminal.backend().buffer();
        let row: String = (cursor.x - 8..cursor.x)
            .map(|x| buffer[(x, cursor.y)].symbol())
            .collect();
        assert_eq!(row, "bbbbbbbb");
        let above: String = (cursor.x - 8..cursor.x - 4)
            .map(|x| buffer[(x, cursor.y - 1)].symbol())
            .collect();
        assert_eq!(above, "aaaa");
        assert_eq!(buffer[(cursor.x - 9, cursor.y)].symbol(), "│");
    }
}
