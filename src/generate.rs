//! Exam generation entry points.
//!
//! [`ExamGenerator`] owns the two collaborators (PDF extractor and text
//! generator) and runs the pipeline for one request:
//!
//! ```text
//! validate ──▶ extract ──▶ prompt ──▶ generate ──▶ parse
//! ```
//!
//! It holds no mutable state; one instance is shared by every request.

use crate::config::ServiceConfig;
use crate::error::ExamError;
use crate::output::ExamResult;
use crate::pipeline::extract::{join_pages, PdfTextExtractor, PdfiumExtractor};
use crate::pipeline::llm::{GenerationRequest, LlmTextGenerator, TextGenerator};
use crate::pipeline::parse::parse_exam;
use crate::prompts::{build_exam_prompt, SYSTEM_PROMPT};
use crate::request::{ExamForm, ExamRequest};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stateless exam-generation handler.
#[derive(Clone)]
pub struct ExamGenerator {
    extractor: Arc<dyn PdfTextExtractor>,
    generator: Arc<dyn TextGenerator>,
    max_question_count: u32,
}

impl ExamGenerator {
    /// Assemble a generator from explicit collaborators.
    pub fn new(
        extractor: Arc<dyn PdfTextExtractor>,
        generator: Arc<dyn TextGenerator>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            extractor,
            generator,
            max_question_count: config.max_question_count,
        }
    }

    /// Build the production generator: pdfium extractor plus the configured
    /// LLM provider.
    ///
    /// Fails when the provider credential is missing or pdfium cannot be
    /// bound, so a misconfigured process never starts serving.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ExamError> {
        let provider = resolve_provider(config)?;
        let generator = LlmTextGenerator::new(
            provider,
            config.provider_name.clone(),
            config.api_timeout_secs,
        );
        let extractor = PdfiumExtractor::new(config.pdfium_library.clone())?;
        info!(
            "Exam generator ready: provider={}, model={}",
            config.provider_name, config.model
        );
        Ok(Self::new(Arc::new(extractor), Arc::new(generator), config))
    }

    /// Validate a raw form, then run [`ExamGenerator::handle`].
    pub async fn generate(&self, form: ExamForm) -> Result<ExamResult, ExamError> {
        let request = ExamRequest::from_form(form, self.max_question_count).map_err(|e| {
            warn!("Rejected request: {}", e);
            e
        })?;
        self.handle(request).await
    }

    /// Run the pipeline for a validated request.
    pub async fn handle(&self, request: ExamRequest) -> Result<ExamResult, ExamError> {
        let start = Instant::now();
        let ExamRequest {
            language,
            level,
            question_count,
            pdf_bytes,
        } = request;
        info!(
            "Generating exam: language={}, level={}, questions={}, pdf={} bytes",
            language,
            level,
            question_count,
            pdf_bytes.len()
        );

        // ── Step 1: Extract text ─────────────────────────────────────────────
        let extractor = Arc::clone(&self.extractor);
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&pdf_bytes))
            .await
            .map_err(|e| ExamError::Internal(format!("Extraction task panicked: {}", e)))??;
        let page_count = pages.len();
        let text = join_pages(pages)?;
        debug!(
            "Extracted {} chars from {} pages",
            text.chars().count(),
            page_count
        );

        // ── Step 2: Build prompt ─────────────────────────────────────────────
        let prompt = build_exam_prompt(&text, question_count, language, level);
        let gen_request = GenerationRequest::new(SYSTEM_PROMPT, prompt);

        // ── Step 3: Call the model ───────────────────────────────────────────
        let generated = self.generator.generate(&gen_request).await?;
        debug!("Raw model output: {}", generated.content);

        // ── Step 4: Parse and validate ───────────────────────────────────────
        let result = parse_exam(&generated.content).map_err(|e| {
            warn!("{} output rejected: {}", self.generator.provider_name(), e);
            e
        })?;

        if result.len() != question_count.get() as usize {
            warn!(
                "Requested {} questions, model returned {}",
                question_count,
                result.len()
            );
        }

        info!(
            "Exam generated: {} questions, {} tokens in / {} out, {}ms",
            result.len(),
            generated.input_tokens,
            generated.output_tokens,
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}

/// Create the configured provider after checking its credential is present.
///
/// `ProviderFactory` reads the key itself; the explicit check turns a missing
/// key into a startup error naming the variable to set.
fn resolve_provider(config: &ServiceConfig) -> Result<Arc<dyn LLMProvider>, ExamError> {
    if let Some(var) = config.credential_var() {
        let present = std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false);
        if !present {
            return Err(ExamError::ProviderNotConfigured {
                provider: config.provider_name.clone(),
                hint: format!("Set {var} in the environment before starting the server."),
            });
        }
    }

    ProviderFactory::create_llm_provider(&config.provider_name, &config.model).map_err(|e| {
        ExamError::ProviderNotConfigured {
            provider: config.provider_name.clone(),
            hint: format!("{e}"),
        }
    })
}
