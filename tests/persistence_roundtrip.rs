use std::path::PathBuf;

use colloc_core::{persistence, CollocConfig, CollocError, CorpusIndex, TaggedSegment, TaggedToken};

fn index() -> CorpusIndex {
    let mut index = CorpusIndex::with_root("/data/books");
    for (i, text) in ["یک دو.", "سه چهار!"].iter().enumerate() {
        index.push(TaggedSegment {
            text: text.to_string(),
            tokens: text
                .split_whitespace()
                .map(|w| TaggedToken::new(w, "NOUN"))
                .collect(),
            source_id: format!("vol/book{i}"),
        });
    }
    index
}

#[test]
fn pair_form_keeps_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/cache.bin");
    let config = CollocConfig {
        max_words: 40,
        ..CollocConfig::default()
    };

    persistence::save_corpus(&path, &index(), &config).unwrap();
    let loaded = persistence::load_corpus(&path).unwrap();

    assert!(!loaded.legacy);
    assert_eq!(loaded.index, index());
    assert_eq!(loaded.index.root, Some(PathBuf::from("/data/books")));

    let meta = persistence::load_metadata(&path).unwrap().unwrap();
    assert_eq!(meta.config, config);
    assert_eq!(meta.segment_count, 2);
    assert_eq!(meta.root, Some(PathBuf::from("/data/books")));
}

#[test]
fn legacy_segment_list_loads_without_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.bin");
    let bytes = bincode::serialize(&index().segments).unwrap();
    std::fs::write(&path, bytes).unwrap();

    let loaded = persistence::load_corpus(&path).unwrap();
    assert!(loaded.legacy);
    assert_eq!(loaded.index.root, None);
    assert_eq!(loaded.index.segments, index().segments);
    assert_eq!(loaded.index.resolve_source("vol/book0", "txt"), None);
}

#[test]
fn garbage_is_reported_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.bin");
    std::fs::write(&path, b"definitely not a corpus cache").unwrap();

    match persistence::load_corpus(&path) {
        Err(CollocError::CorruptCache { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected CorruptCache, got {other:?}"),
    }
}

#[test]
fn missing_cache_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = persistence::load_corpus(&dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, CollocError::Io(_)));
}
