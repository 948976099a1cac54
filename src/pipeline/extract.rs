//! PDF text extraction via pdfium.
//!
//! ## Why a trait?
//!
//! pdfium is a native library. Tests, and deployments that want a different
//! backend, implement [`PdfTextExtractor`] instead of linking it. The trait is
//! synchronous because extraction is CPU-bound; callers move it onto the
//! blocking pool.
//!
//! ## Why check magic bytes first?
//!
//! An HTML error page or a zip uploaded by mistake gives a clear
//! "not a PDF" message this way, rather than an opaque pdfium load error.

use crate::error::ExamError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Produces the text of each page of a PDF, in page order.
pub trait PdfTextExtractor: Send + Sync {
    /// Extract per-page text. Fails with [`ExamError::ExtractionFailed`] for
    /// unreadable input.
    fn extract_pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExamError>;
}

/// Concatenate page texts with no separator and reject whitespace-only output.
pub fn join_pages(pages: Vec<String>) -> Result<String, ExamError> {
    let text = pages.concat();
    if text.trim().is_empty() {
        return Err(ExamError::extraction(
            "no text could be extracted (scanned or image-only PDF?)",
        ));
    }
    Ok(text)
}

/// Reject input that does not start with the `%PDF` signature.
pub fn check_magic(pdf: &[u8]) -> Result<(), ExamError> {
    if pdf.is_empty() {
        return Err(ExamError::extraction("uploaded file is empty"));
    }
    if pdf.len() < 4 || &pdf[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = pdf.len().min(4);
        magic[..n].copy_from_slice(&pdf[..n]);
        return Err(ExamError::extraction(format!(
            "file is not a valid PDF (first bytes: {magic:?})"
        )));
    }
    Ok(())
}

/// [`PdfTextExtractor`] backed by `pdfium-render`.
#[derive(Debug, Clone)]
pub struct PdfiumExtractor {
    library: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// Create an extractor and bind pdfium once to prove the library loads.
    ///
    /// `library` is an explicit shared-library path; `None` binds the system
    /// library.
    pub fn new(library: Option<PathBuf>) -> Result<Self, ExamError> {
        let extractor = Self { library };
        extractor.bind()?;
        Ok(extractor)
    }

    fn bind(&self) -> Result<Pdfium, ExamError> {
        let bindings = match self.library.as_deref() {
            Some(path) => bind_at(path),
            None => Pdfium::bind_to_system_library()
                .map_err(|e| ExamError::PdfiumBindingFailed(e.to_string())),
        }?;
        Ok(Pdfium::new(bindings))
    }
}

fn bind_at(path: &Path) -> Result<Box<dyn PdfiumLibraryBindings>, ExamError> {
    Pdfium::bind_to_library(path).map_err(|e| {
        ExamError::PdfiumBindingFailed(format!("{}: {}", path.display(), e))
    })
}

impl PdfTextExtractor for PdfiumExtractor {
    fn extract_pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExamError> {
        check_magic(pdf)?;

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    ExamError::extraction("PDF is encrypted and requires a password")
                } else {
                    ExamError::extraction(format!("PDF is corrupt: {err_str}"))
                }
            })?;

        let pages = document.pages();
        let mut texts = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| {
                ExamError::extraction(format!("page {}: {:?}", idx + 1, e))
            })?;
            let content = text.all();
            debug!("Extracted page {} → {} chars", idx + 1, content.chars().count());
            texts.push(content);
        }

        Ok(texts)
    }
}
