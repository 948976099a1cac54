//! Prompts for LLM-based exam generation.
//!
//! Every string the model sees lives here so prompt changes touch exactly one
//! file and unit tests can inspect the assembled prompt without a provider.
//! Prompt assembly is a pure function of the request and the extracted text:
//! the same inputs always produce the same bytes.

use crate::request::{Language, Level, QuestionCount};

/// System message sent ahead of every exam prompt.
pub const SYSTEM_PROMPT: &str = "You are an educational content generator.";

/// The JSON shape the model must answer with, embedded verbatim in the prompt.
pub const OUTPUT_CONTRACT: &str = r#"{
    "questions": [
        {
            "id": "uniqueId",
            "questionHead": "string",
            "answers": ["string", "string", "string", "string"],
            "correctAnswer": "index of correct answer - int"
        }
    ]
}"#;

/// Build the user prompt for one exam request.
///
/// `text` is embedded as-is; no trimming or escaping is applied so the model
/// sees exactly what was extracted.
pub fn build_exam_prompt(
    text: &str,
    question_count: QuestionCount,
    language: Language,
    level: Level,
) -> String {
    format!(
        "Extract meaningful exam questions and answers from the following text. \
Make exactly {question_count} questions in this language: {language}. \
Questions should be of {level} difficulty.\n\n\
Here is the text:\n{text}\n\n\
Make sure to put the questions in this JSON format:\n\
{OUTPUT_CONTRACT}\n\
Each question must have exactly 4 answers and correctAnswer must be the \
zero-based integer index of the correct answer.\n\
Just give me the json format as a response, with no other text."
    )
}
