//! Response types.
//!
//! Field names follow the wire contract (`questionHead`, `correctAnswer`)
//! via `serde(rename_all = "camelCase")` so the Rust side keeps snake_case.

use serde::{Deserialize, Serialize};

/// Number of answer options every question must carry.
pub const ANSWERS_PER_QUESTION: usize = 4;

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestion {
    /// Caller-meaningful token chosen by the model.
    pub id: String,
    pub question_head: String,
    /// Exactly [`ANSWERS_PER_QUESTION`] options, in display order.
    pub answers: Vec<String>,
    /// Zero-based index into `answers`.
    pub correct_answer: usize,
}

/// The response body of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamResult {
    pub questions: Vec<ExamQuestion>,
}

impl ExamResult {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
