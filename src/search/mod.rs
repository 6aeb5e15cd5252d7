//! Collocation search over a tagged corpus index.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::TaggedSegment;

pub mod engine;
pub mod query;
pub mod ranker;

pub use engine::{CollocationEngine, ResultRow, SearchOutcome, SourceKey};
pub use query::{Condition, Mode, Position, Query, SearchKind};
pub use ranker::{rank, Ranker, SortColumn};

/// Append-ordered sequence of tagged segments plus the corpus root.
///
/// Read-only once built; share it behind an `Arc` for concurrent queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusIndex {
    /// Segments in document enumeration order.
    pub segments: Vec<TaggedSegment>,
    /// Directory the `source_id`s are relative to, when known.
    pub root: Option<PathBuf>,
}

impl CorpusIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            segments: Vec::new(),
            root: Some(root.into()),
        }
    }

    /// Append a segment.
    pub fn push(&mut self, segment: TaggedSegment) {
        self.segments.push(segment);
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when no segment has been indexed.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in order.
    pub fn segments(&self) -> &[TaggedSegment] {
        &self.segments
    }

    /// Number of distinct non-empty source ids.
    pub fn document_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| !s.source_id.is_empty())
            .map(|s| s.source_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Path of the document a `source_id` came from, if the root is known.
    pub fn resolve_source(&self, source_id: &str, extension: &str) -> Option<PathBuf> {
        let root = self.root.as_deref()?;
        if source_id.is_empty() {
            return None;
        }
        let mut path = root.to_path_buf();
        for part in source_id.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        Some(with_extension(&path, extension))
    }
}

/// Display file name of a `source_id`: its last component plus `extension`.
pub fn file_name_for(source_id: &str, extension: &str) -> String {
    let stem = source_id.rsplit('/').next().unwrap_or(source_id);
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return path.to_path_buf();
    }
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(extension);
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaggedToken;

    fn segment(text: &str, source_id: &str) -> TaggedSegment {
        TaggedSegment {
            text: text.to_string(),
            tokens: text.split_whitespace().map(|w| TaggedToken::new(w, "X")).collect(),
            source_id: source_id.to_string(),
        }
    }

    #[test]
    fn counts_distinct_documents() {
        let mut index = CorpusIndex::new();
        index.push(segment("a b", "one"));
        index.push(segment("c d", "one"));
        index.push(segment("e", "two"));
        index.push(segment("f", ""));
        assert_eq!(index.len(), 4);
        assert_eq!(index.document_count(), 2);
    }

    #[test]
    fn resolves_sources_against_root() {
        let index = CorpusIndex::with_root("/data/corpus");
        assert_eq!(
            index.resolve_source("vol1/book.v2", "txt"),
            Some(PathBuf::from("/data/corpus/vol1/book.v2.txt"))
        );
        assert_eq!(index.resolve_source("", "txt"), None);
        assert_eq!(CorpusIndex::new().resolve_source("book", "txt"), None);
    }

    #[test]
    fn file_names_use_last_component() {
        assert_eq!(file_name_for("vol1/book", "txt"), "book.txt");
        assert_eq!(file_name_for("book", ".docx"), "book.docx");
        assert_eq!(file_name_for("book", ""), "book");
    }
}
