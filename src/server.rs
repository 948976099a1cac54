//! HTTP surface: one multipart endpoint in front of [`ExamGenerator`].
//!
//! ```text
//! POST /generate-exam
//!   pdf_file        file part
//!   language        English | Arabic
//!   level           easy | medium | difficult
//!   question_count  positive integer
//! ```
//!
//! Success is `200 {"questions": [...]}`. Every [`ExamError`] becomes
//! `{"detail": "...", "kind": "..."}` with 400 for client errors, 413 for an
//! oversized upload and 500 for everything else. Extractor rejections (a body
//! that is not multipart, an upload over the limit) go through the same path. The handler never panics on bad input, so one failing
//! request cannot take the server down.

use crate::config::ServiceConfig;
use crate::error::{ErrorKind, ExamError};
use crate::generate::ExamGenerator;
use crate::output::ExamResult;
use crate::request::ExamForm;
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
struct AppState {
    generator: ExamGenerator,
    max_upload_bytes: usize,
}

/// Build the application router.
pub fn router(generator: ExamGenerator, config: &ServiceConfig) -> Router {
    let state = AppState {
        generator,
        max_upload_bytes: config.max_upload_bytes,
    };
    Router::new()
        .route("/generate-exam", post(generate_exam))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}

/// Serve `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn generate_exam(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExamResult>, ExamError> {
    let multipart = multipart.map_err(|rejection| {
        ExamError::InvalidArgument(format!(
            "Expected a multipart/form-data body: {}",
            rejection.body_text()
        ))
    })?;
    let form = read_form(multipart, state.max_upload_bytes).await?;
    let result = state.generator.generate(form).await?;
    Ok(Json(result))
}

/// Collect the known multipart fields. Unknown fields are skipped; a repeated
/// field keeps its last value.
async fn read_form(mut multipart: Multipart, limit_bytes: usize) -> Result<ExamForm, ExamError> {
    let mut form = ExamForm::default();
    let to_error = move |e: MultipartError| multipart_error(e, limit_bytes);

    while let Some(field) = multipart.next_field().await.map_err(to_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "pdf_file" => {
                let bytes = field.bytes().await.map_err(to_error)?;
                debug!("Received pdf_file: {} bytes", bytes.len());
                form.pdf_bytes = Some(bytes.to_vec());
            }
            "language" => form.language = Some(field.text().await.map_err(to_error)?),
            "level" => form.level = Some(field.text().await.map_err(to_error)?),
            "question_count" => {
                form.question_count = Some(field.text().await.map_err(to_error)?)
            }
            other => debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError, limit_bytes: usize) -> ExamError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ExamError::UploadTooLarge { limit_bytes }
    } else {
        ExamError::InvalidArgument(format!("Malformed multipart body: {}", e.body_text()))
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidArgument | ErrorKind::ExtractionFailed => StatusCode::BAD_REQUEST,
        ErrorKind::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::UpstreamUnavailable
        | ErrorKind::GenerationParseFailed
        | ErrorKind::GenerationSchemaInvalid
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    kind: ErrorKind,
}

impl IntoResponse for ExamError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind());
        if self.is_client_error() {
            warn!("Request rejected: {}", self);
        } else {
            error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            detail: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
