use crate::draft::{draft_key, DraftStorage};
use crate::error::{QuizError, StorageError};
use crate::models::{Answer, Choice, Question, QuestionId, QuestionKind, SlideId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// What a question accepts as an answer.
#[derive(Debug, Clone)]
struct Slot {
    id: QuestionId,
    kind: QuestionKind,
    option_ids: Vec<u64>,
}

impl Slot {
    /// The part of a saved answer that still fits this question, if any.
    fn fit(&self, answer: Answer) -> Option<Answer> {
        match (self.kind, answer) {
            (QuestionKind::OpenText, Answer::Text(text)) => Some(Answer::Text(text)),
            (QuestionKind::SingleChoice, Answer::Choice(Choice::Single(id)))
                if self.option_ids.contains(&id) =>
            {
                Some(Answer::single(id))
            }
            (QuestionKind::MultiChoice, Answer::Choice(choice)) => {
                let ids: BTreeSet<u64> = match choice {
                    Choice::Single(id) => BTreeSet::from([id]),
                    Choice::Multiple(ids) => ids,
                };
                let ids: BTreeSet<u64> = ids
                    .into_iter()
                    .filter(|id| self.option_ids.contains(id))
                    .collect();
                (!ids.is_empty()).then_some(Answer::Choice(Choice::Multiple(ids)))
            }
            _ => None,
        }
    }
}

/// Answers for the questions of one page, at most one per question.
///
/// Ids outside the page's question set are never stored. Persistence is
/// best effort: storage and decoding failures are logged and swallowed so
/// the quiz keeps working without drafts.
pub struct AnswerStore {
    slots: Vec<Slot>,
    answers: HashMap<QuestionId, Answer>,
    storage: Option<Arc<dyn DraftStorage>>,
}

impl AnswerStore {
    pub fn new(questions: &[Question], storage: Option<Arc<dyn DraftStorage>>) -> Self {
        let mut slots: Vec<Slot> = Vec::with_capacity(questions.len());
        for question in questions {
            if !slots.iter().any(|slot| slot.id == question.id) {
                slots.push(Slot {
                    id: question.id,
                    kind: question.kind,
                    option_ids: question.options.iter().map(|option| option.id).collect(),
                });
            }
        }
        Self {
            slots,
            answers: HashMap::new(),
            storage,
        }
    }

    fn slot(&self, question_id: QuestionId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == question_id)
    }

    pub fn contains_question(&self, question_id: QuestionId) -> bool {
        self.slot(question_id).is_some()
    }

    pub fn set(&mut self, question_id: QuestionId, answer: Answer) -> Result<(), QuizError> {
        if !self.contains_question(question_id) {
            return Err(QuizError::UnknownQuestion(question_id));
        }
        self.answers.insert(question_id, answer);
        Ok(())
    }

    pub fn get(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    pub fn remove(&mut self, question_id: QuestionId) -> Option<Answer> {
        self.answers.remove(&question_id)
    }

    /// Entries in page-declaration order.
    pub fn all_entries(&self) -> Vec<(QuestionId, &Answer)> {
        self.slots
            .iter()
            .filter_map(|slot| self.answers.get(&slot.id).map(|answer| (slot.id, answer)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn persist(&self, slide_id: SlideId) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = self.try_persist(storage.as_ref(), slide_id) {
            log::warn!("Failed to save draft for slide {}: {}", slide_id, e);
        }
    }

    fn try_persist(&self, storage: &dyn DraftStorage, slide_id: SlideId) -> Result<(), StorageError> {
        let snapshot: BTreeMap<QuestionId, &Answer> = self.answers.iter().map(|(k, v)| (*k, v)).collect();
        let json = serde_json::to_string(&snapshot)?;
        storage.save(&draft_key(slide_id), &json)
    }

    /// Replaces the in-memory answers with the persisted draft, if any.
    /// Answers that no longer fit their question (wrong kind, or an option
    /// the page no longer offers) are dropped. Returns how many answers
    /// were restored.
    pub fn restore(&mut self, slide_id: SlideId) -> usize {
        let Some(storage) = self.storage.clone() else {
            return 0;
        };
        match Self::try_load(storage.as_ref(), slide_id) {
            Ok(Some(draft)) => {
                self.answers.clear();
                for (question_id, answer) in draft {
                    let Some(slot) = self.slot(question_id) else {
                        log::debug!(
                            "Dropping draft answer for question {} not on slide {}",
                            question_id,
                            slide_id
                        );
                        continue;
                    };
                    match slot.fit(answer) {
                        Some(answer) => {
                            self.answers.insert(question_id, answer);
                        }
                        None => log::debug!(
                            "Dropping draft answer for question {} that no longer fits slide {}",
                            question_id,
                            slide_id
                        ),
                    }
                }
                log::info!("Restored {} draft answers for slide {}", self.answers.len(), slide_id);
                self.answers.len()
            }
            Ok(None) => 0,
            Err(e) => {
                log::error!("Error restoring draft for slide {}: {}", slide_id, e);
                0
            }
        }
    }

    fn try_load(
        storage: &dyn DraftStorage,
        slide_id: SlideId,
    ) -> Result<Option<BTreeMap<QuestionId, Answer>>, StorageError> {
        match storage.load(&draft_key(slide_id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Drops all answers and the persisted draft.
    pub fn clear(&mut self, slide_id: SlideId) {
        self.answers.clear();
        if let Some(storage) = &self.storage
            && let Err(e) = storage.remove(&draft_key(slide_id))
        {
            log::warn!("Failed to remove draft for slide {}: {}", slide_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::MemoryDraftStorage;
    use crate::payload::build_payload;

    fn page() -> Vec<Question> {
        vec![
            Question::sample(7, QuestionKind::OpenText),
            Question::sample(5, QuestionKind::SingleChoice),
            Question::sample(9, QuestionKind::MultiChoice),
        ]
    }

    /// Storage whose every call fails.
    struct BrokenStorage;

    impl DraftStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_set_overwrites_and_get() {
        let mut store = AnswerStore::new(&page(), None);
        store.set(QuestionId(5), Answer::single(1)).unwrap();
        store.set(QuestionId(5), Answer::single(2)).unwrap();
        assert_eq!(store.get(QuestionId(5)), Some(&Answer::single(2)));
        assert_eq!(store.len(), 1);
        assert!(store.get(QuestionId(7)).is_none());
    }

    #[test]
    fn test_set_rejects_question_not_on_page() {
        let mut store = AnswerStore::new(&page(), None);
        let err = store.set(QuestionId(99), Answer::single(1)).unwrap_err();
        assert!(matches!(err, QuizError::UnknownQuestion(QuestionId(99))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_entries_follow_page_order() {
        let mut store = AnswerStore::new(&page(), None);
        store.set(QuestionId(9), Answer::multiple([1])).unwrap();
        store.set(QuestionId(7), Answer::text("x")).unwrap();
        store.set(QuestionId(5), Answer::single(3)).unwrap();

        let ids: Vec<QuestionId> = store.all_entries().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![QuestionId(7), QuestionId(5), QuestionId(9)]);
    }

    #[test]
    fn test_restore_after_reload_reproduces_store() {
        let storage: Arc<dyn DraftStorage> = Arc::new(MemoryDraftStorage::new());
        let slide = SlideId(3);

        let mut store = AnswerStore::new(&page(), Some(storage.clone()));
        store.set(QuestionId(7), Answer::text("draft text")).unwrap();
        store.set(QuestionId(5), Answer::single(52)).unwrap();
        store.set(QuestionId(9), Answer::multiple([93, 91])).unwrap();
        store.persist(slide);

        // Simulated page reload: a fresh store over the same storage.
        let mut reloaded = AnswerStore::new(&page(), Some(storage));
        assert_eq!(reloaded.restore(slide), 3);
        assert_eq!(reloaded.all_entries(), store.all_entries());
    }

    #[test]
    fn test_restore_drops_ids_not_on_page() {
        let storage = Arc::new(MemoryDraftStorage::new());
        storage
            .save(
                "quiz_progress_1",
                r#"{"5":{"type":"choice","value":52},"404":{"type":"text","value":"gone"}}"#,
            )
            .unwrap();

        let mut store = AnswerStore::new(&page(), Some(storage as Arc<dyn DraftStorage>));
        assert_eq!(store.restore(SlideId(1)), 1);
        assert!(store.get(QuestionId(404)).is_none());
        assert_eq!(store.get(QuestionId(5)), Some(&Answer::single(52)));
    }

    #[test]
    fn test_restore_drops_answers_that_no_longer_fit() {
        let storage = Arc::new(MemoryDraftStorage::new());
        storage
            .save(
                "quiz_progress_1",
                r#"{"5":{"type":"text","value":"stale"},"7":{"type":"choice","value":99}}"#,
            )
            .unwrap();

        let mut store = AnswerStore::new(&page(), Some(storage as Arc<dyn DraftStorage>));
        assert_eq!(store.restore(SlideId(1)), 0);
        assert!(store.is_empty());
        assert!(build_payload(&store).is_empty());
    }

    #[test]
    fn test_restore_keeps_only_offered_options() {
        let storage = Arc::new(MemoryDraftStorage::new());
        storage
            .save(
                "quiz_progress_1",
                r#"{"5":{"type":"choice","value":12},"9":{"type":"choice","value":[91,404]}}"#,
            )
            .unwrap();

        let mut store = AnswerStore::new(&page(), Some(storage as Arc<dyn DraftStorage>));
        assert_eq!(store.restore(SlideId(1)), 1);
        assert!(store.get(QuestionId(5)).is_none());
        assert_eq!(store.get(QuestionId(9)), Some(&Answer::multiple([91])));
    }

    #[test]
    fn test_corrupt_draft_is_ignored() {
        let storage = Arc::new(MemoryDraftStorage::new());
        storage.save("quiz_progress_1", "{not json").unwrap();

        let mut store = AnswerStore::new(&page(), Some(storage as Arc<dyn DraftStorage>));
        store.set(QuestionId(5), Answer::single(1)).unwrap();
        assert_eq!(store.restore(SlideId(1)), 0);
        assert_eq!(store.get(QuestionId(5)), Some(&Answer::single(1)));
    }

    #[test]
    fn test_broken_storage_never_propagates() {
        let mut store = AnswerStore::new(&page(), Some(Arc::new(BrokenStorage)));
        store.set(QuestionId(5), Answer::single(1)).unwrap();
        store.persist(SlideId(1));
        assert_eq!(store.restore(SlideId(1)), 0);
        store.clear(SlideId(1));
        assert!(store.is_empty());
    }

    #[test]
    fn test_without_storage_is_noop() {
        let mut store = AnswerStore::new(&page(), None);
        store.set(QuestionId(5), Answer::single(1)).unwrap();
        store.persist(SlideId(1));
        assert_eq!(store.restore(SlideId(1)), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_removes_draft_and_answers() {
        let storage: Arc<dyn DraftStorage> = Arc::new(MemoryDraftStorage::new());
        let mut store = AnswerStore::new(&page(), Some(storage.clone()));
        store.set(QuestionId(5), Answer::single(1)).unwrap();
        store.persist(SlideId(8));
        assert!(storage.load("quiz_progress_8").unwrap().is_some());

        store.clear(SlideId(8));
        assert!(store.is_empty());
        assert!(storage.load("quiz_progress_8").unwrap().is_none());
    }
}
