use crate::config::BatchConfig;
use crate::error::UnredactError;
use crate::extractor::FallbackExtractor;
use crate::layout::{plan_outputs, PlannedDocument};
use crate::outcome::{render_artifact, ExtractionOutcome};
use crate::walk::discover_pdfs;
use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Discovery finished; `total` PDFs will be processed.
    Discovered { total: usize, output_dir: PathBuf },
    /// Extraction of one document is starting.
    Started {
        index: usize,
        total: usize,
        source: PathBuf,
    },
    /// The artifact for one document has been written.
    Saved {
        index: usize,
        total: usize,
        source: PathBuf,
        output: PathBuf,
        kind: OutcomeKind,
    },
    /// Extraction finished but the artifact could not be written.
    WriteFailed {
        index: usize,
        total: usize,
        source: PathBuf,
        output: PathBuf,
        error: String,
    },
    /// The run was cancelled; `remaining` documents were not started.
    Cancelled { remaining: usize },
}

/// Outcome category without the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Extracted,
    NoText,
    Failed,
}

impl From<&ExtractionOutcome> for OutcomeKind {
    fn from(outcome: &ExtractionOutcome) -> Self {
        match outcome {
            ExtractionOutcome::Extracted { .. } => OutcomeKind::Extracted,
            ExtractionOutcome::NoText => OutcomeKind::NoText,
            ExtractionOutcome::Failed { .. } => OutcomeKind::Failed,
        }
    }
}

/// Per-document entry of a [`BatchReport`].
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub kind: OutcomeKind,
    /// The backend that produced the text, for extracted documents.
    pub backend: Option<String>,
    /// False if writing the artifact failed.
    pub written: bool,
}

/// Summary of a finished (or cancelled) batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub documents: Vec<DocumentReport>,
    pub cancelled: usize,
}

impl BatchReport {
    pub fn extracted(&self) -> usize {
        self.count(OutcomeKind::Extracted)
    }

    pub fn no_text(&self) -> usize {
        self.count(OutcomeKind::NoText)
    }

    /// Documents whose extraction failed or whose artifact could not be written.
    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.kind == OutcomeKind::Failed || !d.written)
            .count()
    }

    fn count(&self, kind: OutcomeKind) -> usize {
        self.documents
            .iter()
            .filter(|d| d.kind == kind && d.written)
            .count()
    }
}

enum DocumentResult {
    Done {
        planned: PlannedDocument,
        outcome: ExtractionOutcome,
        write_error: Option<std::io::Error>,
    },
    Cancelled,
}

/// Extract every PDF under `input_dir` and write one text artifact per PDF.
///
/// Only setup failures (unreadable input directory, output directory that
/// cannot be created) return `Err`. Per-document failures end up in the
/// artifact body and the report.
pub async fn run_batch<F>(
    input_dir: &Path,
    config: &BatchConfig,
    extractor: FallbackExtractor,
    on_progress: F,
    cancel: CancellationToken,
) -> Result<BatchReport, UnredactError>
where
    F: Fn(ProgressEvent),
{
    // A missing input directory must not be created as a side effect of
    // creating the output directory inside it.
    tokio::fs::read_dir(input_dir)
        .await
        .map_err(|source| UnredactError::InputDir {
            path: input_dir.to_path_buf(),
            source,
        })?;

    let output_dir = config.resolve_output_dir(input_dir);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|source| UnredactError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

    let docs = discover_pdfs(input_dir, Some(&output_dir))?;
    let planned = plan_outputs(docs, &output_dir, config.layout);
    let total = planned.len();
    tracing::info!(input = %input_dir.display(), output = %output_dir.display(), total, "starting batch");
    on_progress(ProgressEvent::Discovered {
        total,
        output_dir: output_dir.clone(),
    });

    let timeout = config.timeout;
    let on_progress = &on_progress;
    let cancel = &cancel;
    let mut results = stream::iter(planned.into_iter().enumerate())
        .map(|(index, planned)| {
            let extractor = extractor.clone();
            let span = tracing::info_span!("document", path = %planned.source.path.display());
            async move {
                if cancel.is_cancelled() {
                    return (index, DocumentResult::Cancelled);
                }
                on_progress(ProgressEvent::Started {
                    index,
                    total,
                    source: planned.source.path.clone(),
                });

                let outcome = extract_bounded(extractor, planned.source.path.clone(), timeout).await;
                let write_error = write_artifact(&planned, &outcome).await.err();
                (
                    index,
                    DocumentResult::Done {
                        planned,
                        outcome,
                        write_error,
                    },
                )
            }
            .instrument(span)
        })
        .buffered(config.jobs.max(1));

    let mut report = BatchReport {
        output_dir,
        ..BatchReport::default()
    };

    while let Some((index, result)) = results.next().await {
        match result {
            DocumentResult::Cancelled => report.cancelled += 1,
            DocumentResult::Done {
                planned,
                outcome,
                write_error,
            } => {
                let kind = OutcomeKind::from(&outcome);
                let source = planned.source.path;
                let output = planned.output;
                let written = match write_error {
                    None => {
                        on_progress(ProgressEvent::Saved {
                            index,
                            total,
                            source: source.clone(),
                            output: output.clone(),
                            kind,
                        });
                        true
                    }
                    Some(e) => {
                        tracing::warn!(output = %output.display(), error = %e, "failed to write output");
                        on_progress(ProgressEvent::WriteFailed {
                            index,
                            total,
                            source: source.clone(),
                            output: output.clone(),
                            error: e.to_string(),
                        });
                        false
                    }
                };
                report.documents.push(DocumentReport {
                    source,
                    output,
                    kind,
                    backend: outcome.backend().map(str::to_string),
                    written,
                });
            }
        }
    }

    if report.cancelled > 0 {
        tracing::warn!(remaining = report.cancelled, "batch cancelled");
        on_progress(ProgressEvent::Cancelled {
            remaining: report.cancelled,
        });
    }

    tracing::info!(
        extracted = report.extracted(),
        no_text = report.no_text(),
        failed = report.failed(),
        cancelled = report.cancelled,
        "batch finished"
    );

    Ok(report)
}

/// How long a timed-out document may take to wind down (pdftotext killing
/// its child) before the next one starts.
const SETTLE_GRACE: Duration = Duration::from_secs(1);

/// Run the extractor on a blocking thread, bounded by `timeout`.
///
/// pdftotext kills its own child at the same deadline. A backend that
/// ignores it (a hung lopdf parse) keeps its blocking thread after
/// `SETTLE_GRACE` and is abandoned.
async fn extract_bounded(
    extractor: FallbackExtractor,
    path: PathBuf,
    timeout: Option<Duration>,
) -> ExtractionOutcome {
    let span = tracing::Span::current();
    let mut task = tokio::task::spawn_blocking(move || span.in_scope(|| extractor.extract(&path)));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(?limit, "extraction timed out");
                if tokio::time::timeout(SETTLE_GRACE, &mut task).await.is_err() {
                    tracing::warn!("backend still running, abandoning it");
                }
                return ExtractionOutcome::failed(UnredactError::Timeout(limit).to_string());
            }
        },
        None => task.await,
    };

    joined.unwrap_or_else(|e| ExtractionOutcome::failed(format!("extraction task failed: {e}")))
}

async fn write_artifact(
    planned: &PlannedDocument,
    outcome: &ExtractionOutcome,
) -> Result<(), std::io::Error> {
    if let Some(parent) = planned.output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let source = planned.source.path.display().to_string();
    tokio::fs::write(&planned.output, render_artifact(&source, outcome)).await
}
