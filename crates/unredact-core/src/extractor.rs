use crate::config::BatchConfig;
use crate::error::UnredactError;
use crate::extraction::lopdf::LopdfExtractor;
use crate::extraction::pdftotext::PdftotextExtractor;
use crate::extraction::{join_pages, PdfExtractor};
use crate::outcome::ExtractionOutcome;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// Two-backend extractor: the secondary backend is consulted only when the
/// primary returns nothing but whitespace.
///
/// `extract` is total. Backend errors become [`ExtractionOutcome::Failed`].
#[derive(Clone)]
pub struct FallbackExtractor {
    primary: Arc<dyn PdfExtractor>,
    secondary: Arc<dyn PdfExtractor>,
}

impl FallbackExtractor {
    pub fn new(primary: Arc<dyn PdfExtractor>, secondary: Arc<dyn PdfExtractor>) -> Self {
        FallbackExtractor { primary, secondary }
    }

    /// pdftotext first, lopdf as fallback.
    pub fn with_default_backends(pdftotext_layout: bool) -> Self {
        Self::new(
            Arc::new(PdftotextExtractor::new().with_layout(pdftotext_layout)),
            Arc::new(LopdfExtractor::new()),
        )
    }

    /// Default backends configured for a batch: pdftotext honours the
    /// layout flag and is killed when the per-document timeout expires.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(
            Arc::new(
                PdftotextExtractor::new()
                    .with_layout(config.pdftotext_layout)
                    .with_timeout(config.timeout),
            ),
            Arc::new(LopdfExtractor::new()),
        )
    }

    pub fn extract(&self, path: &Path) -> ExtractionOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.try_extract(path)))
            .unwrap_or_else(|payload| {
                Err(UnredactError::Extraction(format!(
                    "backend panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "extraction failed");
                ExtractionOutcome::failed(e.to_string())
            }
        }
    }

    fn try_extract(&self, path: &Path) -> Result<ExtractionOutcome, UnredactError> {
        let mut backend = self.primary.backend_name();
        let mut text = run_backend(self.primary.as_ref(), path)?;

        // A primary error is not a reason to try the secondary; only an empty result is.
        if text.trim().is_empty() {
            tracing::debug!(
                path = %path.display(),
                primary = self.primary.backend_name(),
                secondary = self.secondary.backend_name(),
                "primary backend yielded no text, falling back"
            );
            backend = self.secondary.backend_name();
            text.push_str(&run_backend(self.secondary.as_ref(), path)?);
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(ExtractionOutcome::NoText);
        }

        Ok(ExtractionOutcome::Extracted {
            text: trimmed.to_string(),
            backend: backend.to_string(),
        })
    }
}

fn run_backend(backend: &dyn PdfExtractor, path: &Path) -> Result<String, UnredactError> {
    let pages = backend.extract_pages(path)?;
    tracing::debug!(
        path = %path.display(),
        backend = backend.backend_name(),
        pages = pages.len(),
        "backend finished"
    );
    Ok(join_pages(&pages))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
