//! HTTP server binary for pdf2exam.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServiceConfig`, checks the provider credential and the pdfium library, and
//! serves the router.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2exam::server::{router, serve};
use pdf2exam::{ExamGenerator, ServiceConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default port with OpenAI
  OPENAI_API_KEY=sk-... pdf2exam-server

  # Use another provider and model
  ANTHROPIC_API_KEY=... pdf2exam-server --provider anthropic --model claude-3-5-haiku-latest

  # Request an exam
  curl -F pdf_file=@chapter1.pdf -F language=English -F level=easy \
       -F question_count=5 http://localhost:8000/generate-exam

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (required with --provider openai)
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  PDFIUM_LIB_PATH         Path to libpdfium; defaults to the system library
  RUST_LOG                Log filter, overrides --verbose
"#;

/// Serve multiple-choice exam generation from PDF uploads.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2exam-server",
    version,
    about = "Generate multiple-choice exams from PDF uploads using an LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "PDF2EXAM_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "PDF2EXAM_PROVIDER", default_value = "openai")]
    provider: String,

    /// LLM model ID.
    #[arg(long, env = "PDF2EXAM_MODEL", default_value = "gpt-3.5-turbo")]
    model: String,

    /// Per-request LLM call timeout in seconds.
    #[arg(long, env = "PDF2EXAM_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Largest accepted upload in MiB.
    #[arg(long, env = "PDF2EXAM_MAX_UPLOAD_MB", default_value_t = 20)]
    max_upload_mb: usize,

    /// Largest accepted question_count.
    #[arg(long, env = "PDF2EXAM_MAX_QUESTIONS", default_value_t = 20)]
    max_questions: u32,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2EXAM_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    // ── Collaborators (fail fast on missing key or pdfium) ───────────────
    let generator =
        ExamGenerator::from_config(&config).context("Failed to initialise exam generator")?;

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    serve(listener, router(generator, &config))
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Map CLI args to `ServiceConfig`.
fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .provider_name(cli.provider.clone())
        .model(cli.model.clone())
        .api_timeout_secs(cli.api_timeout)
        .max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024))
        .max_question_count(cli.max_questions);

    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library(path.clone());
    }

    builder.build().context("Invalid configuration")
}
