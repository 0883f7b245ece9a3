//! Multiple-choice question bank.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct: usize,
}

impl Question {
    pub fn new(prompt: &str, options: &[&str], correct: usize) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Validate and wrap a set of questions.
    pub fn new(questions: Vec<Question>) -> Result<Self, ValidationError> {
        if questions.is_empty() {
            return Err(ValidationError::invalid("questions", "bank is empty"));
        }
        for (i, q) in questions.iter().enumerate() {
            if q.options.len() < 2 {
                return Err(ValidationError::invalid(
                    format!("questions[{i}].options"),
                    "at least two options are required",
                ));
            }
            if q.correct >= q.options.len() {
                return Err(ValidationError::invalid(
                    format!("questions[{i}].correct"),
                    format!("index {} out of range for {} options", q.correct, q.options.len()),
                ));
            }
        }
        Ok(Self { questions })
    }

    /// Ten general-knowledge questions.
    pub fn builtin() -> Self {
        Self {
            questions: vec![
                Question::new("What is the capital of France?", &["London", "Berlin", "Paris", "Madrid"], 2),
                Question::new("Which planet is known as the Red Planet?", &["Venus", "Mars", "Jupiter", "Saturn"], 1),
                Question::new("What is 15 × 8?", &["120", "115", "125", "130"], 0),
                Question::new(
                    "Who wrote 'Romeo and Juliet'?",
                    &["Charles Dickens", "William Shakespeare", "Jane Austen", "Mark Twain"],
                    1,
                ),
                Question::new("What is the largest ocean on Earth?", &["Atlantic", "Indian", "Arctic", "Pacific"], 3),
                Question::new("In which year did World War II end?", &["1944", "1945", "1946", "1947"], 1),
                Question::new("What is the chemical symbol for gold?", &["Go", "Gd", "Au", "Ag"], 2),
                Question::new(
                    "Which is the smallest country in the world?",
                    &["Monaco", "Vatican City", "San Marino", "Liechtenstein"],
                    1,
                ),
                Question::new("What is the square root of 144?", &["11", "12", "13", "14"], 1),
                Question::new(
                    "Who painted the Mona Lisa?",
                    &["Vincent van Gogh", "Pablo Picasso", "Leonardo da Vinci", "Michelangelo"],
                    2,
                ),
            ],
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bank_is_valid() {
        let bank = QuestionBank::builtin();
        assert_eq!(bank.len(), 10);
        assert!(QuestionBank::new(bank.questions().to_vec()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_answer() {
        let err = QuestionBank::new(vec![Question::new("?", &["a", "b"], 2)]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "questions[0].correct"));
        assert!(QuestionBank::new(Vec::new()).is_err());
    }
}
