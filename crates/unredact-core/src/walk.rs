use crate::error::UnredactError;
use std::fs;
use std::path::{Path, PathBuf};

/// A PDF found under the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path as discovered: the input directory joined with `relative`.
    pub path: PathBuf,
    /// Path relative to the input directory.
    pub relative: PathBuf,
}

/// True if the file name carries a `.pdf` extension, in any case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Recursively collect every PDF under `input_dir`, sorted by relative path.
///
/// `exclude` is a directory that is not descended into (the output
/// directory when it lives inside the input tree). Unreadable
/// subdirectories are logged and skipped; an unreadable `input_dir` is an error.
pub fn discover_pdfs(
    input_dir: &Path,
    exclude: Option<&Path>,
) -> Result<Vec<SourceDocument>, UnredactError> {
    let entries = fs::read_dir(input_dir).map_err(|source| UnredactError::InputDir {
        path: input_dir.to_path_buf(),
        source,
    })?;

    let exclude = exclude.map(canonical);
    let mut found = Vec::new();
    walk_entries(input_dir, entries, exclude.as_deref(), &mut found);

    let mut docs: Vec<SourceDocument> = found
        .into_iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(input_dir).ok()?.to_path_buf();
            Some(SourceDocument { path, relative })
        })
        .collect();
    docs.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(docs)
}

fn walk_entries(dir: &Path, entries: fs::ReadDir, exclude: Option<&Path>, out: &mut Vec<PathBuf>) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot stat entry");
                continue;
            }
        };

        if file_type.is_dir() {
            if exclude.is_some_and(|ex| canonical(&path) == ex) {
                tracing::debug!(path = %path.display(), "not descending into output directory");
                continue;
            }
            match fs::read_dir(&path) {
                Ok(children) => walk_entries(&path, children, exclude, out),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable directory")
                }
            }
            continue;
        }

        // Symlinked files count, symlinked directories are not followed.
        let is_file = if file_type.is_symlink() {
            fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false)
        } else {
            file_type.is_file()
        };

        if !is_pdf(&path) {
            continue;
        }
        if is_file {
            out.push(path);
        } else {
            tracing::warn!(path = %path.display(), "skipping .pdf entry that is not a regular file");
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
