//! Pipeline stages for exam generation.
//!
//! Each submodule implements one step and is testable on its own. The two
//! stages that talk to the outside world (`extract`, `llm`) sit behind traits
//! so the orchestration in [`crate::generate`] can run against stubs.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prompt ──▶ llm ──▶ parse
//! (pdfium)   (format!)  (chat)  (serde_json + schema)
//! ```
//!
//! 1. [`extract`]: per-page text via pdfium; runs in `spawn_blocking`
//! 2. [`crate::prompts`]: deterministic prompt assembly
//! 3. [`llm`]: one provider call with a timeout; the only network I/O
//! 4. [`parse`]: strict JSON parse, then schema validation

pub mod extract;
pub mod llm;
pub mod parse;
