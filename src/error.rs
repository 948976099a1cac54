//! Error types for the pdf2exam library.
//!
//! A single enum, [`ExamError`], covers two families of failure:
//!
//! * **Per-request**: bad form input, unreadable PDF, provider rejection,
//!   malformed model output. These are converted into a structured HTTP
//!   response at the handler boundary and never stop the server.
//!
//! * **Startup**: missing credential, pdfium library not bindable, invalid
//!   configuration. These are returned before the listener is bound so the
//!   process fails fast instead of failing every request.
//!
//! [`ErrorKind`] is the stable, machine-readable tag exposed to clients. Error
//! messages may be reworded; kinds may not.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// All errors returned by the pdf2exam library.
#[derive(Debug, Error)]
pub enum ExamError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A form field is missing or holds an unrecognised value.
    #[error("{0}")]
    InvalidArgument(String),

    /// The request body exceeds the configured upload limit.
    #[error("Upload exceeds the {limit_bytes} byte limit.")]
    UploadTooLarge { limit_bytes: usize },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The upload is not a readable PDF, or no text could be extracted.
    #[error("Failed to extract text from the PDF: {detail}")]
    ExtractionFailed { detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The provider could not be reached or refused the call.
    #[error("LLM provider '{provider}' unavailable ({reason}): {detail}")]
    UpstreamUnavailable {
        provider: String,
        reason: UpstreamReason,
        detail: String,
    },

    /// The model answered with something that is not JSON.
    #[error("Failed to parse JSON: {0}")]
    GenerationParseFailed(String),

    /// The model answered with JSON that does not follow the exam schema.
    #[error("Model output does not match the exam schema: {0}")]
    GenerationSchemaInvalid(String),

    // ── Startup errors ────────────────────────────────────────────────────
    /// The configured provider has no credential in the environment.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable error tag reported to clients alongside the human-readable detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    UploadTooLarge,
    ExtractionFailed,
    UpstreamUnavailable,
    GenerationParseFailed,
    GenerationSchemaInvalid,
    Internal,
}

/// Why the provider call failed. Only used for diagnostics; all reasons map
/// to [`ErrorKind::UpstreamUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamReason {
    /// 401/403 or an invalid API key.
    Authentication,
    /// 429 or exhausted quota.
    RateLimited,
    /// The call exceeded the configured timeout.
    Timeout,
    /// The provider refused the request itself: unknown model, token limit,
    /// invalid parameters.
    Rejected,
    /// Anything else: DNS, TLS, connection reset, 5xx.
    Transport,
}

impl fmt::Display for UpstreamReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpstreamReason::Authentication => "authentication",
            UpstreamReason::RateLimited => "rate limited",
            UpstreamReason::Timeout => "timeout",
            UpstreamReason::Rejected => "rejected",
            UpstreamReason::Transport => "transport",
        };
        f.write_str(s)
    }
}

impl ExamError {
    /// Shorthand for [`ExamError::ExtractionFailed`].
    pub fn extraction(detail: impl Into<String>) -> Self {
        ExamError::ExtractionFailed {
            detail: detail.into(),
        }
    }

    /// The stable kind reported to clients.
    ///
    /// Startup variants never reach a client in practice; they report as
    /// [`ErrorKind::Internal`] if they do.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExamError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ExamError::UploadTooLarge { .. } => ErrorKind::UploadTooLarge,
            ExamError::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            ExamError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            ExamError::GenerationParseFailed(_) => ErrorKind::GenerationParseFailed,
            ExamError::GenerationSchemaInvalid(_) => ErrorKind::GenerationSchemaInvalid,
            ExamError::ProviderNotConfigured { .. }
            | ExamError::PdfiumBindingFailed(_)
            | ExamError::InvalidConfig(_)
            | ExamError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `true` when the caller can fix the request and try again.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidArgument | ErrorKind::UploadTooLarge | ErrorKind::ExtractionFailed
        )
    }
}
