//! # pdf2exam
//!
//! Generate multiple-choice exams from PDF documents with a large language
//! model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! multipart form
//!  │
//!  ├─ 1. Validate  language / level / question_count (no I/O on failure)
//!  ├─ 2. Extract   per-page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Prompt    deterministic instructions + text + JSON contract
//!  ├─ 4. Generate  one chat call to openai / anthropic / gemini / …
//!  ├─ 5. Parse     strict JSON, then schema validation
//!  └─ 6. Respond   {"questions": [...]} or {"detail", "kind"}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2exam::{ExamForm, ExamGenerator, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Requires OPENAI_API_KEY and a pdfium library.
//!     let config = ServiceConfig::default();
//!     let generator = ExamGenerator::from_config(&config)?;
//!     let exam = generator
//!         .generate(ExamForm {
//!             language: Some("English".into()),
//!             level: Some("easy".into()),
//!             question_count: Some("5".into()),
//!             pdf_bytes: Some(std::fs::read("chapter1.pdf")?),
//!         })
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&exam)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | axum router and the `pdf2exam-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod request;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{ErrorKind, ExamError, UpstreamReason};
pub use generate::ExamGenerator;
pub use output::{ExamQuestion, ExamResult};
pub use pipeline::extract::{PdfTextExtractor, PdfiumExtractor};
pub use pipeline::llm::{GeneratedText, GenerationRequest, LlmTextGenerator, TextGenerator};
pub use request::{ExamForm, ExamRequest, Language, Level, QuestionCount};
