use crate::models::{Answer, Choice};
use crate::store::AnswerStore;
use std::collections::BTreeMap;

/// Form fields posted to the quiz submit route.
pub type SubmissionPayload = BTreeMap<String, String>;

pub fn choice_field(question_id: impl std::fmt::Display) -> String {
    format!("answer_ids_{}", question_id)
}

pub fn text_field(question_id: impl std::fmt::Display) -> String {
    format!("text_answer_{}", question_id)
}

/// Encodes the store with the platform's field naming:
/// `answer_ids_<qid>` carries the chosen option id, `text_answer_<qid>` the
/// trimmed text. Blank text and empty selections produce no field.
///
/// The submit route reads a single option id per question, so a
/// multi-choice selection is sent as its smallest id.
pub fn build_payload(store: &AnswerStore) -> SubmissionPayload {
    let mut payload = SubmissionPayload::new();

    for (question_id, answer) in store.all_entries() {
        match answer {
            Answer::Choice(Choice::Single(option_id)) => {
                payload.insert(choice_field(question_id), option_id.to_string());
            }
            Answer::Choice(Choice::Multiple(option_ids)) => {
                if let Some(first) = option_ids.first() {
                    if option_ids.len() > 1 {
                        log::debug!(
                            "Question {} has {} selections, sending only {}",
                            question_id,
                            option_ids.len(),
                            first
                        );
                    }
                    payload.insert(choice_field(question_id), first.to_string());
                }
            }
            Answer::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    payload.insert(text_field(question_id), trimmed.to_string());
                }
            }
        }
    }

    payload
}
