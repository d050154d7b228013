pub mod batch;
pub mod config;
pub mod error;
pub mod extraction;
pub mod extractor;
pub mod layout;
pub mod outcome;
pub mod walk;

pub use batch::{run_batch, BatchReport, DocumentReport, OutcomeKind, ProgressEvent};
pub use config::{BatchConfig, OutputLayout};
pub use error::UnredactError;
pub use extractor::FallbackExtractor;
pub use outcome::{ExtractionOutcome, NO_TEXT_SENTINEL};

use std::path::Path;

/// Extract the text layer of a single PDF with the default backends
/// (pdftotext, then lopdf).
///
/// Never fails: backend errors and backend panics are returned as
/// [`ExtractionOutcome::Failed`]. No timeout applies.
pub fn extract_pdf(path: &Path) -> ExtractionOutcome {
    FallbackExtractor::with_default_backends(false).extract(path)
}
