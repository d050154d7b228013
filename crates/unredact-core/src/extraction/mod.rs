pub mod lopdf;
pub mod pdftotext;

use crate::error::UnredactError;
use std::path::Path;

/// Plain text of a single page of a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub page_number: usize,
    pub text: String,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Open the document at `path` and return one PageContent per page, in document order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageContent>, UnredactError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Concatenate page texts, each followed by a blank-line separator.
pub fn join_pages(pages: &[PageContent]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.text);
        text.push_str("\n\n");
    }
    text
}
