//! Persistence layer for the corpus index.
//! Saves/loads: the bincode cache `(segments, root)` and a JSON metadata sidecar.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::config::CollocConfig;
use crate::errors::{CollocError, Result};
use crate::search::CorpusIndex;
use crate::types::TaggedSegment;

/// Metadata stored next to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetadata {
    /// Version of the colloc-core library.
    pub version: String,
    /// RFC 3339 timestamp of creation.
    pub created_at: String,
    /// Configuration used to build the index.
    pub config: CollocConfig,
    /// Number of segments in the cache.
    pub segment_count: usize,
    /// Number of distinct documents.
    pub document_count: usize,
    /// Corpus root, when known.
    pub root: Option<PathBuf>,
}

impl CorpusMetadata {
    /// Create new metadata with current version and timestamp.
    pub fn new(config: &CollocConfig, index: &CorpusIndex) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            config: config.clone(),
            segment_count: index.len(),
            document_count: index.document_count(),
            root: index.root.clone(),
        }
    }
}

/// An index read back from disk.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    /// The index.
    pub index: CorpusIndex,
    /// True when the cache predates the stored root; sources cannot be resolved.
    pub legacy: bool,
}

/// Sidecar location for the cache at `path`: `<path>.meta.json`.
pub fn metadata_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".meta.json");
    PathBuf::from(os)
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Save the index to `path` and its metadata to the sidecar.
pub fn save_corpus(path: &Path, index: &CorpusIndex, config: &CollocConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    codec().serialize_into(&mut writer, &(&index.segments, &index.root))?;
    writer.flush()?;

    let meta_file = File::create(metadata_path(path))?;
    serde_json::to_writer_pretty(meta_file, &CorpusMetadata::new(config, index))?;

    tracing::info!("Saved {} segments to {}", index.len(), path.display());
    Ok(())
}

/// Load the index from `path`.
///
/// Accepts the current `(segments, root)` form and the legacy bare segment
/// list. Anything else is [`CollocError::CorruptCache`].
pub fn load_corpus(path: &Path) -> Result<LoadedCorpus> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

    let pair = codec().deserialize::<(Vec<TaggedSegment>, Option<PathBuf>)>(&bytes);
    let (segments, root, legacy) = match pair {
        Ok((segments, root)) => (segments, root, false),
        Err(pair_err) => match codec().deserialize::<Vec<TaggedSegment>>(&bytes) {
            Ok(segments) => {
                tracing::warn!(
                    "{} is a legacy cache without a corpus root; source files cannot be opened",
                    path.display()
                );
                (segments, None, true)
            }
            Err(_) => {
                return Err(CollocError::CorruptCache {
                    path: path.to_path_buf(),
                    reason: pair_err.to_string(),
                })
            }
        },
    };

    tracing::info!("Loaded {} segments from {}", segments.len(), path.display());
    Ok(LoadedCorpus {
        index: CorpusIndex { segments, root },
        legacy,
    })
}

/// Read the metadata sidecar of the cache at `path`, if present.
pub fn load_metadata(path: &Path) -> Result<Option<CorpusMetadata>> {
    let meta_path = metadata_path(path);
    if !meta_path.exists() {
        return Ok(None);
    }
    let meta_file = File::open(&meta_path)?;
    Ok(Some(serde_json::from_reader(BufReader::new(meta_file))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaggedToken;

    fn index() -> CorpusIndex {
        let mut index = CorpusIndex::with_root("/corpus");
        index.push(TaggedSegment {
            text: "سلام دنیا.".into(),
            tokens: vec![
                TaggedToken::new("سلام", "NOUN"),
                TaggedToken::new("دنیا", "NOUN"),
                TaggedToken::new(".", "PUNCT"),
            ],
            source_id: "book".into(),
        });
        index
    }

    #[test]
    fn metadata_sidecar_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        save_corpus(&path, &index(), &CollocConfig::default()).unwrap();

        let meta = load_metadata(&path).unwrap().unwrap();
        assert_eq!(meta.segment_count, 1);
        assert_eq!(meta.document_count, 1);
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert!(chrono::DateTime::parse_from_rfc3339(&meta.created_at).is_ok());
    }

    #[test]
    fn metadata_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_metadata(&dir.path().join("none.bin")).unwrap().is_none());
    }

    #[test]
    fn sidecar_name_appends_suffix() {
        assert_eq!(
            metadata_path(Path::new("out/cache.bin")),
            PathBuf::from("out/cache.bin.meta.json")
        );
    }
}
