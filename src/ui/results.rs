use crate::render::{pending_badge_title, DisplayModel, QuestionCard};
use crate::session::QuizSession;
use crate::ui::layout::calculate_results_chunks;
use crate::ui::{key_span, tone_color};
use crate::utils::truncate_string;
use crate::view::QuizView;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn card_lines(index: usize, title: &str, card: &QuestionCard) -> Vec<Line<'static>> {
    let (color, status) = match card {
        QuestionCard::AwaitingGrading => (Color::Cyan, "[…]"),
        QuestionCard::Unanswered => (Color::DarkGray, "[-]"),
        QuestionCard::Graded { is_correct: true, .. } => (Color::Green, "[✓]"),
        QuestionCard::Graded { is_correct: false, .. } => (Color::Red, "[✗]"),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{} {}. ", status, index + 1),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::from(truncate_string(title, 70)),
    ])];

    let mut detail = vec![Span::styled(
        format!("   {}", card.title()),
        Style::default().fg(color),
    )];
    if let QuestionCard::Graded {
        score: Some(score), ..
    } = card
    {
        detail.push(Span::from(format!("  ({}/100)", score)));
    }
    lines.push(Line::from(detail));

    if let QuestionCard::Graded {
        feedback: Some(feedback),
        ..
    } = card
    {
        lines.push(Line::from(format!("   {}", feedback)));
    }
    lines.push(Line::from(""));
    lines
}

fn banner_text(model: &DisplayModel) -> Text<'static> {
    let banner = &model.banner;
    let color = tone_color(banner.tone);

    let mut text = Text::default();
    text.push_line(Line::from(Span::styled(
        format!("{} {}", banner.icon, banner.headline),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    if let Some(score) = &banner.score {
        text.push_line(Line::from(format!(
            "Score: {}% on {} graded question{}",
            score.percent,
            score.graded_count,
            if score.graded_count == 1 { "" } else { "s" }
        )));
    }
    if let Some(note) = &banner.pending_note {
        text.push_line(Line::from(Span::styled(
            note.clone(),
            Style::default().fg(Color::Cyan),
        )));
    }
    if let Some(note) = &banner.attempts_note {
        text.push_line(Line::from(note.clone()));
    }
    text
}

pub fn draw_results(f: &mut Frame, session: &QuizSession, view: &mut QuizView) {
    let Some(model) = session.result() else {
        return;
    };
    let layout = calculate_results_chunks(f.area());

    let mut header_spans = vec![Span::styled(
        format!("Results - {}", session.page().title),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(count) = view.pending_badge.filter(|count| *count > 0) {
        header_spans.push(Span::from("  "));
        header_spans.push(Span::styled(
            format!(" {} ", pending_badge_title(count, Some(session.slide_id()))),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
    }
    let header = Paragraph::new(Line::from(header_spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let banner = Paragraph::new(banner_text(model))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(tone_color(model.banner.tone))),
        );
    f.render_widget(banner, layout.banner_area);

    // Cards follow page order; results for questions not on the page are
    // not shown.
    let mut content = Text::default();
    for (index, question) in session.questions().iter().enumerate() {
        if let Some(card) = model.questions.get(&question.id) {
            for line in card_lines(index, &question.title, card) {
                content.push_line(line);
            }
        }
    }

    let line_count = content.lines.len() as u16;
    let visible = layout.content_area.height.saturating_sub(2);
    view.results_scroll_y = view
        .results_scroll_y
        .min(line_count.saturating_sub(visible));

    let cards = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .scroll((view.results_scroll_y, 0))
        .block(Block::default().borders(Borders::ALL).title("Questions"));
    f.render_widget(cards, layout.content_area);

    let footer = Paragraph::new(Line::from(vec![
        key_span("↑/↓"),
        Span::from(" Scroll  "),
        key_span("Enter"),
        Span::from(format!(" {}  ", model.continue_label)),
        key_span("Esc"),
        Span::from(" Quit"),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, layout.footer_area);
}
