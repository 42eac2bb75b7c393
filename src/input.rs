use crate::error::QuizError;
use crate::models::{Answer, AppState, Choice, Question, QuestionId, QuestionKind};
use crate::render::BannerTone;
use crate::session::QuizSession;
use crate::utils::{next_boundary, prev_boundary};
use crate::view::QuizView;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeSet;

/// Work the event loop has to start after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    DraftChanged(QuestionId, String),
    RequestHint(QuestionId),
    Submit,
    Exit,
}

pub fn handle_key(
    session: &mut QuizSession,
    view: &mut QuizView,
    key: KeyEvent,
    app_state: &mut AppState,
) -> InputAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputAction::Exit;
    }

    match *app_state {
        AppState::Quiz => handle_quiz_key(session, view, key, app_state),
        AppState::SubmitConfirm => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                *app_state = AppState::Quiz;
                InputAction::Submit
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                *app_state = AppState::Quiz;
                InputAction::None
            }
            _ => InputAction::None,
        },
        AppState::QuitConfirm => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => InputAction::Exit,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                *app_state = AppState::Quiz;
                InputAction::None
            }
            _ => InputAction::None,
        },
        AppState::Results => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => InputAction::Exit,
            KeyCode::Down => {
                view.results_scroll_y = view.results_scroll_y.saturating_add(1);
                InputAction::None
            }
            KeyCode::Up => {
                view.results_scroll_y = view.results_scroll_y.saturating_sub(1);
                InputAction::None
            }
            _ => InputAction::None,
        },
    }
}

fn handle_quiz_key(
    session: &mut QuizSession,
    view: &mut QuizView,
    key: KeyEvent,
    app_state: &mut AppState,
) -> InputAction {
    // The form is disabled while grading is in progress.
    if session.is_submitting() {
        return InputAction::None;
    }
    let Some(question) = session.questions().get(view.current_index).cloned() else {
        return InputAction::None;
    };

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') => {
                request_submit(session, view, app_state);
                InputAction::None
            }
            KeyCode::Char('h') => {
                if session.hint(question.id).is_some() || view.hints_loading.contains(&question.id) {
                    InputAction::None
                } else {
                    InputAction::RequestHint(question.id)
                }
            }
            _ => InputAction::None,
        };
    }

    match key.code {
        KeyCode::Esc => {
            *app_state = AppState::QuitConfirm;
            InputAction::None
        }
        KeyCode::Down | KeyCode::Tab => {
            go_to_question(session, view, view.current_index + 1);
            InputAction::None
        }
        KeyCode::Up | KeyCode::BackTab => {
            go_to_question(session, view, view.current_index.saturating_sub(1));
            InputAction::None
        }
        _ if question.kind.is_choice() => handle_choice_key(session, view, &question, key),
        _ => handle_text_key(session, view, &question, key),
    }
}

fn request_submit(session: &mut QuizSession, view: &mut QuizView, app_state: &mut AppState) {
    match session.validate() {
        Ok(()) => *app_state = AppState::SubmitConfirm,
        Err(QuizError::Validation { missing }) => {
            view.notify(
                BannerTone::Warning,
                "Attention",
                "Please answer every question before submitting.",
            );
            if let Some(index) = missing
                .first()
                .and_then(|id| session.page().position(*id))
            {
                go_to_question(session, view, index);
            }
        }
        Err(e) => view.notify(BannerTone::Danger, "Error", e.to_string()),
    }
}

/// Moves to question `index` (clamped) and places the cursors on its
/// current answer.
pub fn go_to_question(session: &QuizSession, view: &mut QuizView, index: usize) {
    let last = session.questions().len().saturating_sub(1);
    view.current_index = index.min(last);
    view.input_scroll_y = 0;

    let Some(question) = session.questions().get(view.current_index) else {
        return;
    };
    match session.answer(question.id) {
        Some(Answer::Text(text)) => {
            view.cursor_position = text.len();
            view.option_cursor = 0;
        }
        Some(Answer::Choice(choice)) => {
            view.cursor_position = 0;
            view.option_cursor = question
                .options
                .iter()
                .position(|o| choice.contains(o.id))
                .unwrap_or(0);
        }
        None => {
            view.cursor_position = 0;
            view.option_cursor = 0;
        }
    }
}

fn handle_choice_key(
    session: &mut QuizSession,
    view: &mut QuizView,
    question: &Question,
    key: KeyEvent,
) -> InputAction {
    let option_count = question.options.len();
    match key.code {
        KeyCode::Left => {
            view.option_cursor = view.option_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            if view.option_cursor + 1 < option_count {
                view.option_cursor += 1;
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let Some(option) = question.options.get(view.option_cursor) else {
                return InputAction::None;
            };
            let result = match question.kind {
                QuestionKind::MultiChoice => {
                    let mut selected: BTreeSet<u64> = match session.answer(question.id) {
                        Some(Answer::Choice(Choice::Multiple(ids))) => ids.clone(),
                        Some(Answer::Choice(Choice::Single(id))) => BTreeSet::from([*id]),
                        _ => BTreeSet::new(),
                    };
                    if !selected.remove(&option.id) {
                        selected.insert(option.id);
                    }
                    if selected.is_empty() {
                        session.clear_answer(question.id)
                    } else {
                        session.set_answer(question.id, Answer::Choice(Choice::Multiple(selected)))
                    }
                }
                _ => session.set_answer(question.id, Answer::single(option.id)),
            };
            if let Err(e) = result {
                view.notify(BannerTone::Danger, "Error", e.to_string());
            }
        }
        _ => {}
    }
    InputAction::None
}

fn handle_text_key(
    session: &mut QuizSession,
    view: &mut QuizView,
    question: &Question,
    key: KeyEvent,
) -> InputAction {
    let mut text = match session.answer(question.id) {
        Some(Answer::Text(text)) => text.clone(),
        _ => String::new(),
    };
    let cursor = view.cursor_position.min(text.len());

    let new_cursor = match key.code {
        KeyCode::Char(c) => {
            text.insert(cursor, c);
            cursor + c.len_utf8()
        }
        KeyCode::Enter => {
            text.insert(cursor, '\n');
            cursor + 1
        }
        KeyCode::Backspace => {
            if cursor == 0 {
                return InputAction::None;
            }
            let start = prev_boundary(&text, cursor);
            text.replace_range(start..cursor, "");
            start
        }
        KeyCode::Delete => {
            if cursor >= text.len() {
                return InputAction::None;
            }
            let end = next_boundary(&text, cursor);
            text.replace_range(cursor..end, "");
            cursor
        }
        KeyCode::Left => {
            view.cursor_position = prev_boundary(&text, cursor);
            return InputAction::None;
        }
        KeyCode::Right => {
            view.cursor_position = next_boundary(&text, cursor);
            return InputAction::None;
        }
        KeyCode::Home => {
            view.cursor_position = 0;
            return InputAction::None;
        }
        KeyCode::End => {
            view.cursor_position = text.len();
            return InputAction::None;
        }
        _ => return InputAction::None,
    };

    let result = if text.is_empty() {
        session.clear_answer(question.id)
    } else {
        session.set_answer(question.id, Answer::Text(text.clone()))
    };
    match result {
        Ok(()) => {
            view.cursor_position = new_cursor;
            InputAction::DraftChanged(question.id, text)
        }
        Err(e) => {
            view.notify(BannerTone::Danger, "Error", e.to_string());
            InputAction::None
        }
    }
}
