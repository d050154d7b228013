use crate::error::UnredactError;
use crate::extraction::{PageContent, PdfExtractor};
use ::lopdf::Document;
use std::path::Path;

/// Pure-Rust PDF extraction backend built on `lopdf`.
///
/// Used as the fallback when the primary backend yields no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        LopdfExtractor
    }
}

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageContent>, UnredactError> {
        let mut doc = Document::load(path)?;

        // Owner-password-only documents open with an empty user password.
        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| UnredactError::Lopdf(format!("encrypted document: {}", e)))?;
        }

        // get_pages() is keyed by 1-based page number, so iteration is in document order.
        let mut pages = Vec::new();
        for (index, page_number) in doc.get_pages().into_keys().enumerate() {
            let text = doc.extract_text(&[page_number])?;
            pages.push(PageContent {
                page_number: index + 1,
                text,
            });
        }

        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "lopdf"
    }
}
