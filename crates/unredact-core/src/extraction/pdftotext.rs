use crate::error::UnredactError;
use crate::extraction::{PageContent, PdfExtractor};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// pdftotext reads the page content streams directly, so text that sits
/// underneath an overlay box (a drawn rectangle or annotation) is still
/// emitted. This makes it the primary backend.
///
/// With a timeout set, a pdftotext process that outlives it is killed and
/// reaped before `extract_pages` returns.
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    program: PathBuf,
    layout: bool,
    timeout: Option<Duration>,
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor {
            program: PathBuf::from("pdftotext"),
            layout: false,
            timeout: None,
        }
    }

    /// Use `pdftotext -layout` to preserve column alignment.
    pub fn with_layout(mut self, layout: bool) -> Self {
        self.layout = layout;
        self
    }

    /// Kill pdftotext if a single document takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a different executable, e.g. a pdftotext outside `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        std::process::Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        if self.layout {
            cmd.arg("-layout");
        }
        cmd.arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-") // output to stdout
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageContent>, UnredactError> {
        // Backends are called from blocking threads, so the child gets a
        // runtime of its own.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let output = runtime.block_on(run_bounded(self.command(path), self.timeout))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(UnredactError::PdftotextFailed { code, stderr });
        }

        Ok(split_pages(&String::from_utf8_lossy(&output.stdout)))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Run `cmd` to completion, or kill it once `timeout` has passed.
async fn run_bounded(mut cmd: Command, timeout: Option<Duration>) -> Result<Output, UnredactError> {
    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            UnredactError::PdftotextNotFound
        } else {
            UnredactError::Extraction(format!("pdftotext failed: {}", e))
        }
    })?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| UnredactError::Extraction("pdftotext stdout not captured".into()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| UnredactError::Extraction("pdftotext stderr not captured".into()))?;

    let collect = async {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let (status, _, _) = tokio::try_join!(
            child.wait(),
            stdout.read_to_end(&mut out),
            stderr.read_to_end(&mut err)
        )?;
        Ok::<_, std::io::Error>(Output {
            status,
            stdout: out,
            stderr: err,
        })
    };

    let Some(limit) = timeout else {
        return collect
            .await
            .map_err(|e| UnredactError::Extraction(format!("pdftotext failed: {}", e)));
    };

    let finished = tokio::time::timeout(limit, collect).await;
    match finished {
        Ok(output) => output.map_err(|e| UnredactError::Extraction(format!("pdftotext failed: {}", e))),
        Err(_) => {
            tracing::warn!(?limit, "pdftotext timed out, killing it");
            // kill() also waits, so no zombie is left behind.
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to kill pdftotext");
            }
            Err(UnredactError::Timeout(limit))
        }
    }
}

/// Split pdftotext output into pages.
///
/// pdftotext terminates every page with a form feed (\x0c), so the segment
/// after the last form feed is not a page.
fn split_pages(stdout: &str) -> Vec<PageContent> {
    let mut segments: Vec<&str> = stdout.split('\x0c').collect();
    if stdout.ends_with('\x0c') || segments.last().is_some_and(|s| s.trim().is_empty()) {
        segments.pop();
    }

    segments
        .into_iter()
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            text: page_text.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_drops_trailing_form_feed() {
        let pages = split_pages("Page one\n\x0cPage two\n\x0c");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].text, "Page one\n");
        assert_eq!(pages[1].page_number, 2);
        assert_eq!(pages[1].text, "Page two\n");
    }

    #[test]
    fn test_split_pages_keeps_blank_inner_pages() {
        let pages = split_pages("cover\n\x0c\x0cappendix\n\x0c");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].text, "");
        assert_eq!(pages[2].text, "appendix\n");
    }

    #[test]
    fn test_split_pages_empty_output() {
        assert!(split_pages("").is_empty());
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let extractor = PdftotextExtractor::new().with_program("/nonexistent/bin/pdftotext");
        let result = extractor.extract_pages(Path::new("doc.pdf"));
        assert!(matches!(result, Err(UnredactError::PdftotextNotFound)));
    }

    #[test]
    fn test_split_pages_without_final_form_feed() {
        let pages = split_pages("only page");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "only page");
    }
}
