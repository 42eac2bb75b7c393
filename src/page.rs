use crate::models::{Question, QuestionId, SlideId};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

/// The quiz part of a slide page: which slide, and its questions in
/// display order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizPage {
    pub slide_id: SlideId,
    pub title: String,
    pub questions: Vec<Question>,
}

impl QuizPage {
    pub fn question(&self, question_id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn position(&self, question_id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id == question_id)
    }
}

#[derive(Debug, Deserialize)]
struct PageFile {
    slide_id: Option<SlideId>,
    url: Option<String>,
    #[serde(default)]
    title: String,
    questions: Vec<Question>,
}

fn slide_path_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"/slides/slide/(\d+)(?:[/?#]|$)").expect("valid slide id pattern"),
            Regex::new(r"/slides/slide/[^/?#]*-(\d+)(?:[/?#]|$)").expect("valid slug pattern"),
        ]
    })
}

/// Slide id from a page path: `/slides/slide/12` or the slugged form
/// `/slides/slide/intro-to-rust-12`.
pub fn slide_id_from_path(path: &str) -> Option<SlideId> {
    slide_path_patterns().iter().find_map(|re| {
        re.captures(path)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .map(SlideId)
    })
}

pub fn parse_page(json: &str) -> io::Result<QuizPage> {
    let file: PageFile = serde_json::from_str(json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let slide_id = file
        .slide_id
        .or_else(|| file.url.as_deref().and_then(slide_id_from_path))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "page has neither slide_id nor a slide url",
            )
        })?;

    let mut questions: Vec<Question> = Vec::with_capacity(file.questions.len());
    for question in file.questions {
        if questions.iter().any(|q| q.id == question.id) {
            log::warn!("Ignoring duplicate question {} on slide {}", question.id, slide_id);
            continue;
        }
        questions.push(question);
    }

    Ok(QuizPage {
        slide_id,
        title: file.title,
        questions,
    })
}

pub fn load_page(path: &Path) -> io::Result<QuizPage> {
    let content = fs::read_to_string(path)?;
    parse_page(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;
    use std::io::Write;

    #[test]
    fn test_slide_id_from_plain_path() {
        assert_eq!(slide_id_from_path("/slides/slide/12"), Some(SlideId(12)));
        assert_eq!(slide_id_from_path("/slides/slide/12/quiz"), Some(SlideId(12)));
    }

    #[test]
    fn test_slide_id_from_slug() {
        assert_eq!(
            slide_id_from_path("/slides/slide/intro-to-ownership-34"),
            Some(SlideId(34))
        );
        assert_eq!(
            slide_id_from_path("https://learn.example.com/slides/slide/quiz-2-7?fullscreen=1"),
            Some(SlideId(7))
        );
    }

    #[test]
    fn test_slide_id_absent() {
        assert_eq!(slide_id_from_path("/slides/my_results"), None);
        assert_eq!(slide_id_from_path("/slides/slide/no-number"), None);
    }

    #[test]
    fn test_parse_page_with_url_and_duplicates() {
        let page = parse_page(
            r#"{
                "url": "/slides/slide/borrowing-basics-9",
                "title": "Borrowing basics",
                "questions": [
                    {"id": 1, "kind": "simple_choice", "title": "Pick one",
                     "options": [{"id": 11, "label": "A"}, {"id": 12, "label": "B"}]},
                    {"id": 2, "kind": "text_box", "title": "Explain", "ai_feedback": true},
                    {"id": 1, "kind": "text_box", "title": "Duplicate"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(page.slide_id, SlideId(9));
        assert_eq!(page.questions.len(), 2);
        assert_eq!(page.questions[0].kind, QuestionKind::SingleChoice);
        assert_eq!(page.position(QuestionId(2)), Some(1));
        assert!(page.question(QuestionId(2)).unwrap().wants_ai_feedback());
    }

    #[test]
    fn test_parse_page_requires_slide() {
        let err = parse_page(r#"{"questions": []}"#).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_page_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("quiz.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"slide_id": 4, "questions": [{{"id": 8, "kind": "open_text"}}]}}"#
        )
        .unwrap();

        let page = load_page(&path).unwrap();
        assert_eq!(page.slide_id, SlideId(4));
        assert_eq!(page.questions[0].id, QuestionId(8));
    }
}
