use crate::config::OutputLayout;
use crate::walk::SourceDocument;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Separator used in place of `/` when a relative path becomes a flat file name.
const FLAT_PATH_SEPARATOR: &str = "__";

/// A discovered document paired with the artifact it will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDocument {
    pub source: SourceDocument,
    pub output: PathBuf,
}

/// Assign each document a unique output path.
///
/// Under the flat layout the shallowest document with a given stem (the
/// first in order on ties) gets `<stem>.txt`. The others fall back to their
/// relative path with separators encoded, e.g. `sub__dir__report.txt`.
pub fn plan_outputs(
    docs: Vec<SourceDocument>,
    output_dir: &Path,
    layout: OutputLayout,
) -> Vec<PlannedDocument> {
    let outputs = match layout {
        OutputLayout::Flat => flat_outputs(&docs, output_dir),
        OutputLayout::Mirror => mirror_outputs(&docs, output_dir),
    };

    docs.into_iter()
        .zip(outputs)
        .map(|(source, output)| PlannedDocument { source, output })
        .collect()
}

fn flat_outputs(docs: &[SourceDocument], output_dir: &Path) -> Vec<PathBuf> {
    let depth = |i: usize| docs[i].relative.components().count();

    let mut owners: HashMap<OsString, usize> = HashMap::new();
    for (i, doc) in docs.iter().enumerate() {
        owners
            .entry(stem_of(&doc.relative))
            .and_modify(|owner| {
                if depth(i) < depth(*owner) {
                    *owner = i;
                }
            })
            .or_insert(i);
    }

    let mut taken: HashSet<PathBuf> = owners
        .keys()
        .map(|stem| output_dir.join(txt_name(stem.clone())))
        .collect();

    docs.iter()
        .enumerate()
        .map(|(i, doc)| {
            let stem = stem_of(&doc.relative);
            let plain = output_dir.join(txt_name(stem.clone()));
            if owners.get(&stem) == Some(&i) {
                return plain;
            }

            tracing::warn!(
                input = %doc.relative.display(),
                output = %plain.display(),
                "output name shared with another input, using the relative path instead"
            );
            let path = first_free(output_dir, encode_relative(&doc.relative), &taken);
            taken.insert(path.clone());
            path
        })
        .collect()
}

fn mirror_outputs(docs: &[SourceDocument], output_dir: &Path) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    docs.iter()
        .map(|doc| {
            let dir = match doc.relative.parent() {
                Some(parent) => output_dir.join(parent),
                None => output_dir.to_path_buf(),
            };
            // `a.pdf` and `a.PDF` side by side share a stem even when mirrored.
            let path = first_free(&dir, stem_of(&doc.relative), &taken);
            taken.insert(path.clone());
            path
        })
        .collect()
}

fn stem_of(relative: &Path) -> OsString {
    relative.file_stem().unwrap_or_default().to_os_string()
}

/// `<dir>/<stem>.txt`, or `<dir>/<stem>-N.txt` for the smallest free N >= 2.
fn first_free(dir: &Path, stem: OsString, taken: &HashSet<PathBuf>) -> PathBuf {
    let candidate = dir.join(txt_name(stem.clone()));
    if !taken.contains(&candidate) {
        return candidate;
    }

    (2..)
        .map(|n| {
            let mut name = stem.clone();
            name.push(format!("-{n}"));
            dir.join(txt_name(name))
        })
        .find(|path| !taken.contains(path))
        .unwrap_or(candidate)
}

/// `sub/dir/report.pdf` -> `sub__dir__report`
fn encode_relative(relative: &Path) -> OsString {
    let without_ext = relative.with_extension("");
    let mut encoded = OsString::new();
    for component in without_ext.components() {
        if let Component::Normal(part) = component {
            if !encoded.is_empty() {
                encoded.push(FLAT_PATH_SEPARATOR);
            }
            encoded.push(part);
        }
    }
    encoded
}

fn txt_name(mut stem: OsString) -> OsString {
    stem.push(".txt");
    stem
}
