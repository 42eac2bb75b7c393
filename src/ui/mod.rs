pub mod layout;
mod quiz;
mod results;

use crate::render::BannerTone;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

pub use layout::{calculate_quiz_chunks, calculate_results_chunks};
pub use quiz::{draw_quit_confirmation, draw_quiz, draw_submit_confirmation, status_color};
pub use results::draw_results;

pub fn tone_color(tone: BannerTone) -> Color {
    match tone {
        BannerTone::Info => Color::Cyan,
        BannerTone::Success => Color::Green,
        BannerTone::Warning => Color::Yellow,
        BannerTone::Danger => Color::Red,
    }
}

/// Highlighted key name for the help lines.
fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}
