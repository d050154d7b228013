use unredact_core::{BatchReport, ProgressEvent};

/// Console line for a progress event, if it has one.
///
/// Per-document lines go to stdout; failures and cancellation go to stderr.
pub fn format_event(event: &ProgressEvent) -> Option<(Stream, String)> {
    match event {
        ProgressEvent::Discovered { .. } => None,
        ProgressEvent::Started { source, .. } => {
            Some((Stream::Stdout, format!("Processing: {}", source.display())))
        }
        ProgressEvent::Saved { output, .. } => {
            Some((Stream::Stdout, format!("Saved: {}", output.display())))
        }
        ProgressEvent::WriteFailed { output, error, .. } => Some((
            Stream::Stderr,
            format!("Failed to write {}: {}", output.display(), error),
        )),
        ProgressEvent::Cancelled { remaining } => Some((
            Stream::Stderr,
            format!("Cancelled: {remaining} PDF(s) not processed"),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

pub fn print_event(event: ProgressEvent) {
    match format_event(&event) {
        Some((Stream::Stdout, line)) => println!("{line}"),
        Some((Stream::Stderr, line)) => eprintln!("{line}"),
        None => {}
    }
}

pub fn format_summary(report: &BatchReport) -> String {
    format!(
        "Done: {} extracted, {} without text, {} failed. Output in {}",
        report.extracted(),
        report.no_text(),
        report.failed(),
        report.output_dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use unredact_core::OutcomeKind;

    #[test]
    fn test_started_and_saved_lines() {
        let started = ProgressEvent::Started {
            index: 0,
            total: 1,
            source: PathBuf::from("/data/a.PDF"),
        };
        assert_eq!(
            format_event(&started),
            Some((Stream::Stdout, "Processing: /data/a.PDF".to_string()))
        );

        let saved = ProgressEvent::Saved {
            index: 0,
            total: 1,
            source: PathBuf::from("/data/a.PDF"),
            output: PathBuf::from("/data/unredacted_txt/a.txt"),
            kind: OutcomeKind::Extracted,
        };
        assert_eq!(
            format_event(&saved),
            Some((Stream::Stdout, "Saved: /data/unredacted_txt/a.txt".to_string()))
        );
    }

    #[test]
    fn test_discovery_is_silent() {
        let event = ProgressEvent::Discovered {
            total: 3,
            output_dir: PathBuf::from("/out"),
        };
        assert_eq!(format_event(&event), None);
    }

    #[test]
    fn test_write_failure_goes_to_stderr() {
        let event = ProgressEvent::WriteFailed {
            index: 2,
            total: 3,
            source: PathBuf::from("/data/c.pdf"),
            output: PathBuf::from("/out/c.txt"),
            error: "Permission denied".into(),
        };
        let (stream, line) = format_event(&event).unwrap();
        assert_eq!(stream, Stream::Stderr);
        assert_eq!(line, "Failed to write /out/c.txt: Permission denied");
    }

    #[test]
    fn test_summary_line() {
        let report = BatchReport {
            output_dir: PathBuf::from("/out"),
            ..BatchReport::default()
        };
        assert_eq!(
            format_summary(&report),
            "Done: 0 extracted, 0 without text, 0 failed. Output in /out"
        );
    }
}
