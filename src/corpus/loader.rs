use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{CollocError, Result};

/// Raw text of one document, ready for correction and segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier recorded as provenance on every segment.
    pub source_id: String,
    /// Extracted text; paragraphs separated by newlines.
    pub text: String,
}

/// A document file found under the corpus root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Absolute or root-relative path of the file.
    pub path: PathBuf,
    /// Path relative to the root, extension removed, `/`-separated.
    pub source_id: String,
}

/// Pulls raw paragraph text out of a document file.
///
/// Best effort: failures are reported as `None` and never abort a build.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of `path`.
    fn extract_text(&self, path: &Path) -> Option<String>;
}

/// Reads UTF-8 text files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Option<String> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("skipping unreadable document {}: {e}", path.display());
                return None;
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => Some(text.trim_start_matches('\u{FEFF}').to_string()),
            Err(_) => {
                tracing::warn!("skipping non UTF-8 document {}", path.display());
                None
            }
        }
    }
}

/// Recursively list files with `extension` under `root`, sorted by path.
pub fn discover_documents(root: &Path, extension: &str) -> Result<Vec<DocumentRef>> {
    if !root.is_dir() {
        return Err(CollocError::Corpus(format!(
            "corpus root {} is not a directory",
            root.display()
        )));
    }
    let extension = extension.trim_start_matches('.');

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
            {
                files.push(path);
            }
        }
    }
    files.sort();

    Ok(files
        .into_iter()
        .map(|path| {
            let source_id = source_id_for(root, &path);
            DocumentRef { path, source_id }
        })
        .collect())
}

/// Root-relative, extension-free, `/`-separated identifier of `path`.
pub fn source_id_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// A single document from a JSONL corpus.
#[derive(Debug, Deserialize)]
pub struct JsonlDoc {
    /// Unique document identifier.
    pub id: String,
    /// Raw text content of the document.
    pub text: String,
}

/// A corpus reader for line-delimited JSON files.
#[derive(Debug)]
pub struct JsonlCorpus {
    path: PathBuf,
}

impl JsonlCorpus {
    /// Create a new corpus reader for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Iterate over documents in the corpus. Blank lines are skipped.
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<Document>>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        Ok(reader
            .lines()
            .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(|line| {
                let line = line?;
                let doc: JsonlDoc = serde_json::from_str(&line)?;
                Ok(Document {
                    source_id: doc.id,
                    text: doc.text,
                })
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_sorted_with_relative_ids() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("vol2")).unwrap();
        std::fs::write(root.join("vol2/b.txt"), "x").unwrap();
        std::fs::write(root.join("a.txt"), "y").unwrap();
        std::fs::write(root.join("notes.md"), "z").unwrap();

        let docs = discover_documents(root, "txt").unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "vol2/b"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = discover_documents(Path::new("/nonexistent/corpus"), "txt").unwrap_err();
        assert!(matches!(err, CollocError::Corpus(_)));
    }

    #[test]
    fn plain_text_strips_bom_and_tolerates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        std::fs::write(&good, "\u{FEFF}سلام").unwrap();
        std::fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();

        assert_eq!(PlainTextExtractor.extract_text(&good).as_deref(), Some("سلام"));
        assert_eq!(PlainTextExtractor.extract_text(&bad), None);
        assert_eq!(PlainTextExtractor.extract_text(&dir.path().join("missing.txt")), None);
    }

    #[test]
    fn jsonl_documents_keep_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        std::fs::write(&path, "{\"id\": \"d1\", \"text\": \"الف ب\"}\n\n{\"id\": \"d2\", \"text\": \"ج\"}\n").unwrap();

        let docs: Vec<_> = JsonlCorpus::new(&path).iter().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].source_id, "d2");
    }
}
