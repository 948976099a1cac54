//! Service configuration.
//!
//! Everything the operator can tune lives in [`ServiceConfig`], built via
//! [`ServiceConfigBuilder`]. Prompt wording, sampling temperature and output
//! token budget are deliberately absent: they are constants in
//! [`crate::prompts`] and [`crate::pipeline::llm`].

use crate::error::ExamError;
use std::path::PathBuf;

/// Configuration for the exam generator and its HTTP surface.
///
/// # Example
/// ```rust
/// use pdf2exam::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .provider_name("openai")
///     .model("gpt-4.1-mini")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gpt-4.1-mini");
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// LLM provider name understood by `edgequake_llm::ProviderFactory`.
    /// Default: "openai".
    pub provider_name: String,

    /// Model identifier. Default: "gpt-3.5-turbo".
    pub model: String,

    /// Upper bound on one provider call, in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Largest accepted request body, in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,

    /// Largest accepted `question_count`. Default: 20.
    ///
    /// The output token budget is fixed, so large counts would only produce
    /// truncated JSON.
    pub max_question_count: u32,

    /// Explicit pdfium shared-library path. If None, binds the system library.
    pub pdfium_library: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider_name: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_timeout_secs: 60,
            max_upload_bytes: 20 * 1024 * 1024,
            max_question_count: 20,
            pdfium_library: None,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Environment variable holding the API key for the configured provider.
    ///
    /// `None` for providers that run without a credential (e.g. ollama).
    pub fn credential_var(&self) -> Option<&'static str> {
        credential_var(&self.provider_name)
    }
}

/// Map a provider name to the environment variable its API key is read from.
pub fn credential_var(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "gemini" => Some("GEMINI_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        _ => None,
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn max_question_count(mut self, n: u32) -> Self {
        self.config.max_question_count = n;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ExamError> {
        let c = &self.config;
        if c.provider_name.trim().is_empty() {
            return Err(ExamError::InvalidConfig("Provider name must not be empty".into()));
        }
        if c.model.trim().is_empty() {
            return Err(ExamError::InvalidConfig("Model must not be empty".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(ExamError::InvalidConfig("API timeout must be ≥ 1s".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(ExamError::InvalidConfig("Upload limit must be ≥ 1 byte".into()));
        }
        if c.max_question_count == 0 {
            return Err(ExamError::InvalidConfig(
                "Maximum question count must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
