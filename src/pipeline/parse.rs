//! Interpreting the model's answer.
//!
//! The model is an untrusted producer. Parsing happens in two passes so the
//! two failure modes stay distinct:
//!
//! 1. `serde_json::from_str::<Value>`: is it JSON at all? If not,
//!    [`ExamError::GenerationParseFailed`] with serde's diagnostic.
//! 2. Typed deserialisation plus shape checks: does it follow the exam
//!    schema? If not, [`ExamError::GenerationSchemaInvalid`].
//!
//! No repair is attempted: a completion wrapped in prose or code fences is a
//! parse failure.

use crate::error::ExamError;
use crate::output::{ExamQuestion, ExamResult, ANSWERS_PER_QUESTION};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExam {
    questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: RawId,
    question_head: String,
    answers: Vec<String>,
    correct_answer: usize,
}

/// Models often emit `"id": 1` despite the contract; integers are accepted
/// and rendered as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Parse and validate a raw completion.
pub fn parse_exam(raw: &str) -> Result<ExamResult, ExamError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ExamError::GenerationParseFailed(e.to_string()))?;

    let exam: RawExam = serde_json::from_value(value)
        .map_err(|e| ExamError::GenerationSchemaInvalid(e.to_string()))?;

    let questions = exam
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| validate_question(i, q))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExamResult { questions })
}

fn validate_question(index: usize, q: RawQuestion) -> Result<ExamQuestion, ExamError> {
    let n = index + 1;
    if q.answers.len() != ANSWERS_PER_QUESTION {
        return Err(ExamError::GenerationSchemaInvalid(format!(
            "question {n} has {} answers, expected {ANSWERS_PER_QUESTION}",
            q.answers.len()
        )));
    }
    if q.correct_answer >= q.answers.len() {
        return Err(ExamError::GenerationSchemaInvalid(format!(
            "question {n} has correctAnswer {} outside 0..{}",
            q.correct_answer,
            q.answers.len()
        )));
    }
    Ok(ExamQuestion {
        id: q.id.into(),
        question_head: q.question_head,
        answers: q.answers,
        correct_answer: q.correct_answer,
    })
}
