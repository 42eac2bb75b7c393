use crate::models::{Question, QuestionId};
use crate::store::AnswerStore;

/// Questions without a usable answer, in page order.
pub fn missing_questions(questions: &[Question], store: &AnswerStore) -> Vec<QuestionId> {
    questions
        .iter()
        .filter(|q| !store.get(q.id).is_some_and(|answer| answer.is_filled()))
        .map(|q| q.id)
        .collect()
}

pub fn is_complete(questions: &[Question], store: &AnswerStore) -> bool {
    missing_questions(questions, store).is_empty()
}
