use std::fmt;

/// Body written for a document where no backend recovered any text.
pub const NO_TEXT_SENTINEL: &str = "No extractable text (likely image-only PDF).";

/// Result of extracting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Non-empty text with surrounding whitespace stripped.
    Extracted { text: String, backend: String },
    /// Neither backend produced anything but whitespace.
    NoText,
    /// A backend failed, or the extraction task timed out or panicked.
    Failed { message: String },
}

impl ExtractionOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        ExtractionOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, ExtractionOutcome::Extracted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed { .. })
    }

    /// The backend that produced the text, if any.
    pub fn backend(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Extracted { backend, .. } => Some(backend),
            _ => None,
        }
    }

    /// Text written into the output artifact below the `Source:` header.
    pub fn body(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionOutcome::Extracted { text, .. } => f.write_str(text),
            ExtractionOutcome::NoText => f.write_str(NO_TEXT_SENTINEL),
            ExtractionOutcome::Failed { message } => write!(f, "Error: {message}"),
        }
    }
}

/// Full contents of an output artifact.
pub fn render_artifact(source: &str, outcome: &ExtractionOutcome) -> String {
    format!("Source: {source}\n\n{outcome}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_per_kind() {
        let extracted = ExtractionOutcome::Extracted {
            text: "Hello".into(),
            backend: "pdftotext".into(),
        };
        assert_eq!(extracted.body(), "Hello");
        assert_eq!(ExtractionOutcome::NoText.body(), NO_TEXT_SENTINEL);
        assert_eq!(
            ExtractionOutcome::failed("bad xref").body(),
            "Error: bad xref"
        );
    }

    #[test]
    fn test_extracted_text_that_looks_like_an_error_stays_extracted() {
        let outcome = ExtractionOutcome::Extracted {
            text: "Error: this line is part of the document".into(),
            backend: "lopdf".into(),
        };
        assert!(outcome.is_extracted());
        assert!(!outcome.is_failed());
        assert_eq!(outcome.backend(), Some("lopdf"));
    }

    #[test]
    fn test_render_artifact_header() {
        let rendered = render_artifact(
            "/data/a.PDF",
            &ExtractionOutcome::Extracted {
                text: "Hello".into(),
                backend: "pdftotext".into(),
            },
        );
        assert_eq!(rendered, "Source: /data/a.PDF\n\nHello");
    }
}
