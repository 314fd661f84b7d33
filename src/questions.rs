//! Question bank loading
//!
//! The bank is a read-only JSON catalog of categories, each holding questions
//! keyed by a price that is unique within the category. The session only ever
//! talks to it through [`QuestionBank`], so it tolerates both a cached catalog
//! and one that is re-read from disk on every lookup.

use crate::error::QuestionBankError;
use crate::types::{CellKey, Price};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Text,
    Image,
    Video,
    Audio,
}

/// Answer content; any subset of the variants may be present
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AnswerContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub price: Price,
    pub prompt: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub answer: AnswerContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryQuestions {
    pub name: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Catalog {
    pub categories: Vec<CategoryQuestions>,
}

impl Catalog {
    /// Parse and validate a catalog from JSON text
    pub fn from_json(text: &str) -> Result<Self, QuestionBankError> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), QuestionBankError> {
        for category in &self.categories {
            let mut seen = HashSet::new();
            for question in &category.questions {
                if !seen.insert(question.price) {
                    return Err(QuestionBankError::DuplicatePrice {
                        category: category.name.clone(),
                        price: question.price,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn find(&self, category: &str, price: Price) -> Option<&Question> {
        self.categories
            .iter()
            .find(|c| c.name == category)?
            .questions
            .iter()
            .find(|q| q.price == price)
    }

    pub fn contains(&self, cell: &CellKey) -> bool {
        self.find(&cell.category, cell.price).is_some()
    }

    pub fn total_questions(&self) -> usize {
        self.categories.iter().map(|c| c.questions.len()).sum()
    }
}

/// Read-only source of the question catalog
pub trait QuestionBank: Send + Sync {
    /// Current catalog snapshot
    fn catalog(&self) -> Result<Arc<Catalog>, QuestionBankError>;
}

/// A catalog held in memory for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionBank {
    catalog: Arc<Catalog>,
}

impl StaticQuestionBank {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Load the file once and keep it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuestionBankError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(Catalog::from_json(&text)?))
    }
}

impl QuestionBank for StaticQuestionBank {
    fn catalog(&self) -> Result<Arc<Catalog>, QuestionBankError> {
        Ok(self.catalog.clone())
    }
}

/// A catalog re-read from disk on every lookup, so edits apply mid-game
#[derive(Debug, Clone)]
pub struct FileQuestionBank {
    path: PathBuf,
}

impl FileQuestionBank {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuestionBank for FileQuestionBank {
    fn catalog(&self) -> Result<Arc<Catalog>, QuestionBankError> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(Arc::new(Catalog::from_json(&text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "categories": [
            {
                "name": "History",
                "questions": [
                    {"price": 100, "prompt": "Year the Berlin wall fell?", "answer": {"text": "1989"}},
                    {"price": 200, "prompt": "Who is this?", "media_type": "image", "media": "img/caesar.jpg",
                     "answer": {"text": "Caesar", "image": "img/caesar-full.jpg"}}
                ]
            },
            {
                "name": "Music",
                "questions": [
                    {"price": 100, "prompt": "Name the song", "media_type": "audio", "media": "a.mp3"}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.total_questions(), 3);

        let q = catalog.find("History", 200).unwrap();
        assert_eq!(q.media_type, MediaType::Image);
        assert_eq!(q.answer.text.as_deref(), Some("Caesar"));
        assert!(q.answer.video.is_none());

        let q = catalog.find("Music", 100).unwrap();
        assert_eq!(q.answer, AnswerContent::default());
    }

    #[test]
    fn test_find_misses() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert!(catalog.find("History", 300).is_none());
        assert!(catalog.find("Geography", 100).is_none());
        assert!(!catalog.contains(&CellKey::new("Music", 200)));
        assert!(catalog.contains(&CellKey::new("Music", 100)));
    }

    #[test]
    fn test_duplicate_price_rejected() {
        let text = r#"{"categories": [{"name": "X", "questions": [
            {"price": 100, "prompt": "a"}, {"price": 100, "prompt": "b"}]}]}"#;
        match Catalog::from_json(text) {
            Err(QuestionBankError::DuplicatePrice { category, price }) => {
                assert_eq!(category, "X");
                assert_eq!(price, 100);
            }
            other => panic!("Expected duplicate price error, got {:?}", other),
        }
    }

    #[test]
    fn test_static_bank_loads_file_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let bank = StaticQuestionBank::load(file.path()).unwrap();
        std::fs::write(file.path(), r#"{"categories": []}"#).unwrap();

        assert_eq!(bank.catalog().unwrap().total_questions(), 3);
    }

    #[test]
    fn test_file_bank_rereads_on_every_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let bank = FileQuestionBank::new(file.path());
        assert_eq!(bank.catalog().unwrap().total_questions(), 3);

        std::fs::write(file.path(), r#"{"categories": []}"#).unwrap();
        assert_eq!(bank.catalog().unwrap().total_questions(), 0);
    }

    #[test]
    fn test_file_bank_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let bank = FileQuestionBank::new(dir.path().join("missing.json"));
        assert!(matches!(bank.catalog(), Err(QuestionBankError::Io(_))));
    }
}
