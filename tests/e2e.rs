//! End-to-end tests for the `/generate-exam` endpoint.
//!
//! Each test starts the real axum router on an ephemeral port and talks to it
//! over HTTP with reqwest multipart requests. The LLM is always a
//! deterministic stub. Most tests stub the PDF extractor too; tests marked
//! `pdfium_` use the real pdfium extractor and skip when no pdfium library can
//! be bound.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture
//!
//! To exercise pdfium as well:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e

#![cfg(feature = "server")]

use futures::future::BoxFuture;
use pdf2exam::server::{router, serve};
use pdf2exam::{
    ExamError, ExamGenerator, GeneratedText, GenerationRequest, PdfTextExtractor,
    PdfiumExtractor, ServiceConfig, TextGenerator,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

const ONE_QUESTION: &str = r#"{"questions":[{"id":"1","questionHead":"What is the capital of France?","answers":["Paris","Lyon","Nice","Lille"],"correctAnswer":0}]}"#;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Extractor that returns fixed pages regardless of input.
struct FixedPages(Vec<String>);

impl PdfTextExtractor for FixedPages {
    fn extract_pages(&self, _pdf: &[u8]) -> Result<Vec<String>, ExamError> {
        Ok(self.0.clone())
    }
}

/// Generator that returns a canned reply and counts calls.
struct CannedReply {
    reply: String,
    calls: AtomicUsize,
}

impl CannedReply {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

impl TextGenerator for CannedReply {
    fn provider_name(&self) -> &str {
        "canned"
    }

    fn generate<'a>(
        &'a self,
        _request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedText, ExamError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GeneratedText {
                content: self.reply.clone(),
                input_tokens: 120,
                output_tokens: 60,
            })
        })
    }
}

/// Start the router on 127.0.0.1:0 and return the endpoint URL.
async fn spawn_server(generator: ExamGenerator, config: &ServiceConfig) -> String {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let app = router(generator, config);
    tokio::spawn(async move {
        serve(listener, app).await.expect("server");
    });
    format!("http://{addr}/generate-exam")
}

async fn stub_server(pages: &[&str], llm: Arc<CannedReply>) -> String {
    let config = ServiceConfig::default();
    let extractor = Arc::new(FixedPages(pages.iter().map(|p| p.to_string()).collect()));
    spawn_server(ExamGenerator::new(extractor, llm, &config), &config).await
}

fn exam_form(pdf: Vec<u8>, language: &str, level: &str, count: &str) -> Form {
    Form::new()
        .part(
            "pdf_file",
            Part::bytes(pdf)
                .file_name("document.pdf")
                .mime_str("application/pdf")
                .expect("valid mime"),
        )
        .text("language", language.to_string())
        .text("level", level.to_string())
        .text("question_count", count.to_string())
}

async fn post(url: &str, form: Form) -> (StatusCode, Value) {
    let resp = reqwest::Client::new()
        .post(url)
        .multipart(form)
        .send()
        .await
        .expect("request should reach the server");
    let status = resp.status();
    let body = resp.json::<Value>().await.expect("JSON body");
    (status, body)
}

/// A single-page PDF whose only content is `text` in Helvetica.
fn one_page_pdf(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
/Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        xref.push_str(&format!("{off:010} 00000 n \n"));
    }
    pdf.extend_from_slice(xref.as_bytes());
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}

/// Bind pdfium from PDFIUM_LIB_PATH or the system, or print SKIP.
macro_rules! pdfium_or_skip {
    () => {{
        let lib = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);
        match PdfiumExtractor::new(lib) {
            Ok(extractor) => extractor,
            Err(e) => {
                println!("SKIP: pdfium not available: {e}");
                return;
            }
        }
    }};
}

// ── Stubbed pipeline (always runs) ───────────────────────────────────────────

#[tokio::test]
async fn test_success_returns_questions() {
    let llm = CannedReply::new(ONE_QUESTION);
    let url = stub_server(&["The capital of France is Paris."], llm.clone()).await;

    let (status, body) = post(&url, exam_form(one_page_pdf("x"), "English", "easy", "1")).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    let expected: Value = serde_json::from_str(ONE_QUESTION).unwrap();
    assert_eq!(body, expected);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_language_is_400() {
    let llm = CannedReply::new(ONE_QUESTION);
    let url = stub_server(&["text"], llm.clone()).await;

    let (status, body) = post(&url, exam_form(b"%PDF".to_vec(), "German", "easy", "1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "detail": "Invalid language. Use 'English' or 'Arabic'.",
            "kind": "invalid_argument"
        })
    );
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_level_is_400() {
    let llm = CannedReply::new(ONE_QUESTION);
    let url = stub_server(&["text"], llm.clone()).await;

    let (status, body) = post(&url, exam_form(b"%PDF".to_vec(), "Arabic", "hard", "1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_argument");
    assert!(body["detail"].as_str().unwrap().contains("Invalid level"));
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_file_is_400() {
    let url = stub_server(&["text"], CannedReply::new(ONE_QUESTION)).await;

    let form = Form::new()
        .text("language", "English")
        .text("level", "easy")
        .text("question_count", "1");
    let (status, body) = post(&url, form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("pdf_file"), "body: {body}");
}

#[tokio::test]
async fn test_blank_text_is_400() {
    let llm = CannedReply::new(ONE_QUESTION);
    let url = stub_server(&["   ", "\n"], llm.clone()).await;

    let (status, body) = post(&url, exam_form(b"%PDF".to_vec(), "English", "easy", "1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "extraction_failed");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_json_reply_is_500() {
    let url = stub_server(&["text"], CannedReply::new("Here are some questions!")).await;

    let (status, body) = post(&url, exam_form(b"%PDF".to_vec(), "English", "easy", "1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "generation_parse_failed");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Failed to parse JSON"));
}

#[tokio::test]
async fn test_bad_schema_reply_is_500() {
    let reply = r#"{"questions":[{"id":"1","questionHead":"Q","answers":["a","b"],"correctAnswer":0}]}"#;
    let url = stub_server(&["text"], CannedReply::new(reply)).await;

    let (status, body) = post(&url, exam_form(b"%PDF".to_vec(), "English", "easy", "1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "generation_schema_invalid");
}

#[tokio::test]
async fn test_non_multipart_body_is_structured_400() {
    let llm = CannedReply::new(ONE_QUESTION);
    let url = stub_server(&["text"], llm.clone()).await;

    let resp = reqwest::Client::new()
        .post(&url)
        .json(&json!({"language": "English", "level": "easy", "question_count": 1}))
        .send()
        .await
        .expect("request should reach the server");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.json::<Value>().await.expect("JSON body");
    assert_eq!(body["kind"], "invalid_argument");
    assert!(
        body["detail"].as_str().unwrap().contains("multipart/form-data"),
        "body: {body}"
    );
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_over_limit_is_413() {
    let llm = CannedReply::new(ONE_QUESTION);
    let config = ServiceConfig::builder()
        .max_upload_bytes(1024)
        .build()
        .expect("valid config");
    let extractor = Arc::new(FixedPages(vec!["text".to_string()]));
    let url = spawn_server(ExamGenerator::new(extractor, llm.clone(), &config), &config).await;

    let mut pdf = b"%PDF-1.4\n".to_vec();
    pdf.resize(4096, b'x');
    let (status, body) = post(&url, exam_form(pdf, "English", "easy", "1")).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "body: {body}");
    assert_eq!(
        body,
        json!({
            "detail": "Upload exceeds the 1024 byte limit.",
            "kind": "upload_too_large"
        })
    );
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_requests_are_byte_identical() {
    let url = stub_server(&["Same text."], CannedReply::new(ONE_QUESTION)).await;
    let client = reqwest::Client::new();

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let resp = client
            .post(&url)
            .multipart(exam_form(b"%PDF".to_vec(), "English", "medium", "1"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        bodies.push(resp.bytes().await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);
}

// ── Real pdfium extraction (skips without a pdfium library) ──────────────────

#[tokio::test]
async fn test_pdfium_one_page_end_to_end() {
    let extractor = pdfium_or_skip!();
    let llm = CannedReply::new(ONE_QUESTION);
    let config = ServiceConfig::default();
    let url = spawn_server(
        ExamGenerator::new(Arc::new(extractor), llm.clone(), &config),
        &config,
    )
    .await;

    let pdf = one_page_pdf("The capital of France is Paris.");
    let (status, body) = post(&url, exam_form(pdf, "English", "easy", "1")).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body, serde_json::from_str::<Value>(ONE_QUESTION).unwrap());
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pdfium_extracts_page_text() {
    let extractor = pdfium_or_skip!();

    let pages = extractor
        .extract_pages(&one_page_pdf("The capital of France is Paris."))
        .expect("extraction should succeed");

    assert_eq!(pages.len(), 1);
    assert!(
        pages[0].contains("The capital of France is Paris."),
        "got: {:?}",
        pages[0]
    );
}

#[tokio::test]
async fn test_pdfium_rejects_garbage() {
    let extractor = pdfium_or_skip!();

    let err = extractor
        .extract_pages(b"%PDF-1.4 this is not really a pdf")
        .unwrap_err();
    assert!(matches!(err, ExamError::ExtractionFailed { .. }), "got: {err:?}");

    let err = extractor.extract_pages(b"<html></html>").unwrap_err();
    assert!(matches!(err, ExamError::ExtractionFailed { .. }));
}
