use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the output directory created inside the input directory when no
/// explicit output directory is configured.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "unredacted_txt";

/// Per-document extraction timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How output artifact paths are derived from input paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputLayout {
    /// All artifacts directly in the output directory, named by file stem.
    /// A stem seen earlier in the run is disambiguated by the relative path.
    #[default]
    Flat,
    /// Artifacts mirror the input directory structure.
    Mirror,
}

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub output_dir: Option<PathBuf>,
    pub layout: OutputLayout,
    /// `None` disables the per-document timeout.
    pub timeout: Option<Duration>,
    /// Documents extracted concurrently. Results are still written in discovery order.
    pub jobs: usize,
    pub pdftotext_layout: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            output_dir: None,
            layout: OutputLayout::Flat,
            timeout: Some(DEFAULT_TIMEOUT),
            jobs: 1,
            pdftotext_layout: false,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_pdftotext_layout(mut self, layout: bool) -> Self {
        self.pdftotext_layout = layout;
        self
    }

    /// The configured output directory, or `<input_dir>/unredacted_txt`.
    pub fn resolve_output_dir(&self, input_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| input_dir.join(DEFAULT_OUTPUT_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_dir_is_inside_input() {
        let config = BatchConfig::default();
        assert_eq!(
            config.resolve_output_dir(Path::new("/data/pdfs")),
            PathBuf::from("/data/pdfs/unredacted_txt")
        );
    }

    #[test]
    fn test_explicit_output_dir_wins() {
        let config = BatchConfig::new().with_output_dir("/tmp/out");
        assert_eq!(
            config.resolve_output_dir(Path::new("/data/pdfs")),
            PathBuf::from("/tmp/out")
        );
    }

    #[test]
    fn test_jobs_clamped_to_one() {
        assert_eq!(BatchConfig::new().with_jobs(0).jobs, 1);
    }
}
