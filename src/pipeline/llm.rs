//! LLM interaction: send the exam prompt and return the raw completion.
//!
//! This module is intentionally thin. Prompt wording lives in
//! [`crate::prompts`]; interpreting the answer lives in
//! [`crate::pipeline::parse`]. What remains is one provider call, a timeout
//! around it, and mapping provider failures onto
//! [`ExamError::UpstreamUnavailable`].
//!
//! There is no retry loop: a failed call is reported to the client, who
//! decides whether to resubmit.

use crate::error::{ExamError, UpstreamReason};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, LlmError};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Sampling temperature for every generation call.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Output token budget for every generation call.
pub const MAX_OUTPUT_TOKENS: usize = 1000;

/// Everything a provider needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl GenerationRequest {
    /// Request with the fixed temperature and token budget.
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: GENERATION_TEMPERATURE,
        }
    }
}

/// Raw model output plus usage numbers for logging.
#[derive(Debug, Clone, Default)]
pub struct GeneratedText {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// A text-generation collaborator.
///
/// Object-safe so it can be stored as `Arc<dyn TextGenerator>` and replaced by
/// a stub in tests.
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name, used in error messages.
    fn provider_name(&self) -> &str;

    /// Run one completion. Provider failures must come back as
    /// [`ExamError::UpstreamUnavailable`].
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedText, ExamError>>;
}

/// [`TextGenerator`] over an `edgequake_llm` provider.
pub struct LlmTextGenerator {
    provider: Arc<dyn LLMProvider>,
    provider_name: String,
    call_timeout: Duration,
}

impl LlmTextGenerator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        provider_name: impl Into<String>,
        api_timeout_secs: u64,
    ) -> Self {
        Self {
            provider,
            provider_name: provider_name.into(),
            call_timeout: Duration::from_secs(api_timeout_secs),
        }
    }
}

impl TextGenerator for LlmTextGenerator {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedText, ExamError>> {
        Box::pin(async move {
            let start = Instant::now();
            let messages = vec![
                ChatMessage::system(request.system.as_str()),
                ChatMessage::user(request.prompt.as_str()),
            ];
            let options = build_options(request);

            let response = match timeout(
                self.call_timeout,
                self.provider.chat(&messages, Some(&options)),
            )
            .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    let reason = upstream_reason(&e);
                    let detail = e.to_string();
                    warn!("{} call failed ({}): {}", self.provider_name, reason, detail);
                    return Err(ExamError::UpstreamUnavailable {
                        provider: self.provider_name.clone(),
                        reason,
                        detail,
                    });
                }
                Err(_) => {
                    warn!(
                        "{} call timed out after {}s",
                        self.provider_name,
                        self.call_timeout.as_secs()
                    );
                    return Err(ExamError::UpstreamUnavailable {
                        provider: self.provider_name.clone(),
                        reason: UpstreamReason::Timeout,
                        detail: format!("no response after {}s", self.call_timeout.as_secs()),
                    });
                }
            };

            debug!(
                "{}: {} input tokens, {} output tokens, {:?}",
                self.provider_name,
                response.prompt_tokens,
                response.completion_tokens,
                start.elapsed()
            );

            Ok(GeneratedText {
                content: response.content,
                input_tokens: response.prompt_tokens as usize,
                output_tokens: response.completion_tokens as usize,
            })
        })
    }
}

/// Build `CompletionOptions` from a generation request.
fn build_options(request: &GenerationRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        ..Default::default()
    }
}

/// Why a provider call failed.
///
/// Typed variants map directly. Only the catch-all variants, which carry the
/// provider's own message, fall back to [`classify_upstream_message`].
pub fn upstream_reason(err: &LlmError) -> UpstreamReason {
    match err {
        LlmError::AuthError(_) => UpstreamReason::Authentication,
        LlmError::RateLimited(_) => UpstreamReason::RateLimited,
        LlmError::Timeout => UpstreamReason::Timeout,
        LlmError::NetworkError(_) | LlmError::SerializationError(_) => UpstreamReason::Transport,
        LlmError::InvalidRequest(_)
        | LlmError::TokenLimitExceeded { .. }
        | LlmError::ModelNotFound(_)
        | LlmError::ConfigError(_)
        | LlmError::NotSupported(_) => UpstreamReason::Rejected,
        LlmError::ApiError(m) | LlmError::ProviderError(m) | LlmError::Unknown(m) => {
            classify_upstream_message(m)
        }
    }
}

/// Guess a reason from free-text provider output.
///
/// Status codes only count as whole numbers, so "14013 tokens" or "4030ms"
/// are not mistaken for 401 or 403.
pub fn classify_upstream_message(message: &str) -> UpstreamReason {
    let m = message.to_ascii_lowercase();
    let status = |code: &str| {
        m.split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| token == code)
    };
    if status("401")
        || status("403")
        || m.contains("unauthorized")
        || m.contains("authentication")
        || m.contains("api key")
        || m.contains("api_key")
    {
        UpstreamReason::Authentication
    } else if status("429")
        || m.contains("rate limit")
        || m.contains("rate_limit")
        || m.contains("quota")
    {
        UpstreamReason::RateLimited
    } else if m.contains("timed out") || m.contains("timeout") {
        UpstreamReason::Timeout
    } else {
        UpstreamReason::Transport
    }
}
