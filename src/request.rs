//! Request types: the raw multipart form and its validated counterpart.
//!
//! [`ExamForm`] is what arrives over the wire: four optional text fields and an
//! optional file. [`ExamRequest`] is the only thing the pipeline accepts; the
//! conversion between them is the input-validation step, so an `ExamRequest`
//! in hand means language, level and question count are known-good.

use crate::error::ExamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language the generated questions are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Arabic,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Arabic => "Arabic",
        }
    }
}

impl FromStr for Language {
    type Err = ExamError;

    /// Matches the literal exactly; `english` or ` English` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "English" => Ok(Language::English),
            "Arabic" => Ok(Language::Arabic),
            _ => Err(ExamError::InvalidArgument(
                "Invalid language. Use 'English' or 'Arabic'.".into(),
            )),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty of the generated questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Difficult,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Difficult => "difficult",
        }
    }
}

impl FromStr for Level {
    type Err = ExamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Level::Easy),
            "medium" => Ok(Level::Medium),
            "difficult" => Ok(Level::Difficult),
            _ => Err(ExamError::InvalidArgument(
                "Invalid level. Use 'easy', 'medium', or 'difficult'.".into(),
            )),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of questions requested. Always ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCount(u32);

impl QuestionCount {
    /// Parse the form text, rejecting zero, negatives, non-digits and values
    /// above `max`. Surrounding whitespace is tolerated.
    pub fn parse(raw: &str, max: u32) -> Result<Self, ExamError> {
        let trimmed = raw.trim();
        let n: u32 = trimmed.parse().map_err(|_| {
            ExamError::InvalidArgument(format!(
                "Invalid question_count '{trimmed}'. Use a positive whole number."
            ))
        })?;
        if n == 0 {
            return Err(ExamError::InvalidArgument(
                "Invalid question_count '0'. Use a positive whole number.".into(),
            ));
        }
        if n > max {
            return Err(ExamError::InvalidArgument(format!(
                "question_count {n} exceeds the maximum of {max}."
            )));
        }
        Ok(Self(n))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unvalidated form input, one field per multipart part.
#[derive(Debug, Clone, Default)]
pub struct ExamForm {
    pub language: Option<String>,
    pub level: Option<String>,
    pub question_count: Option<String>,
    pub pdf_bytes: Option<Vec<u8>>,
}

/// A validated exam-generation request.
#[derive(Debug, Clone)]
pub struct ExamRequest {
    pub language: Language,
    pub level: Level,
    pub question_count: QuestionCount,
    pub pdf_bytes: Vec<u8>,
}

impl ExamRequest {
    /// Validate a form. Language is checked first, then level, then
    /// question count, then presence of the file.
    pub fn from_form(form: ExamForm, max_question_count: u32) -> Result<Self, ExamError> {
        let language: Language = required(form.language.as_deref(), "language")?.parse()?;
        let level: Level = required(form.level.as_deref(), "level")?.parse()?;
        let question_count = QuestionCount::parse(
            required(form.question_count.as_deref(), "question_count")?,
            max_question_count,
        )?;
        let pdf_bytes = form
            .pdf_bytes
            .ok_or_else(|| missing_field("pdf_file"))?;

        Ok(Self {
            language,
            level,
            question_count,
            pdf_bytes,
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ExamError> {
    value.ok_or_else(|| missing_field(field))
}

fn missing_field(field: &str) -> ExamError {
    ExamError::InvalidArgument(format!("Missing form field '{field}'."))
}
