use std::sync::Arc;

use colloc_core::{
    corpus::{CorrectionLexicon, Corrector, Document, PersianNormalizer, UniformTagger, WordTokenizer},
    persistence,
    search::{Mode, Position, Query},
    CollocConfig, CollocationEngine, CorpusBuildPipeline, CorpusIndex,
};

fn pipeline(lexicon: CorrectionLexicon) -> CorpusBuildPipeline {
    CorpusBuildPipeline::new(
        CollocConfig::default(),
        Corrector::new(lexicon).expect("lexicon compiles"),
        Arc::new(PersianNormalizer),
        Arc::new(WordTokenizer),
        Arc::new(UniformTagger::new("X")),
    )
    .expect("default config is valid")
}

fn engine(index: &CorpusIndex) -> CollocationEngine<'_> {
    CollocationEngine::new(index, Arc::new(PersianNormalizer), Arc::new(WordTokenizer))
}

#[test]
fn smoke_build_search_and_reload() {
    // 1. Corpus on disk: one document, sentences on separate lines.
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("corpus");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("doc1.txt"), "سلام دنیا.\nاین یک آزمون است.\n").unwrap();

    // 2. Build
    let index = pipeline(CorrectionLexicon::new())
        .build_from_root(&root)
        .expect("build failed");

    let texts: Vec<_> = index.segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["سلام دنیا.", "این یک آزمون است."]);
    assert!(index.segments.iter().all(|s| s.source_id == "doc1"));
    assert!(index.segments[0].tokens.iter().all(|t| t.tag == "X"));

    // 3. Search
    let query = Query::collocation("دنیا").with_mode(Mode::Before);
    let outcome = engine(&index).search(&query);
    let before: Vec<_> = outcome
        .rows
        .iter()
        .filter(|r| r.position == Position::Before)
        .collect();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].term, "سلام");
    assert_eq!(before[0].frequency, 1);
    assert_eq!(before[0].position.label(), "before");

    let sources = outcome.sources_for(before[0]);
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].sentence, "سلام دنیا.");
    let path = index
        .resolve_source("doc1", "txt")
        .expect("root is recorded");
    assert!(path.ends_with("corpus/doc1.txt"));
    assert!(path.exists());

    // 4. Persist and reload
    let cache = dir.path().join("preprocessed_corpus.bin");
    persistence::save_corpus(&cache, &index, &CollocConfig::default()).unwrap();
    let loaded = persistence::load_corpus(&cache).unwrap();
    assert!(!loaded.legacy);
    assert_eq!(loaded.index, index);
}

#[test]
fn single_paragraph_stays_one_segment() {
    let docs = vec![Document {
        source_id: "doc1".into(),
        text: "سلام دنیا. این یک آزمون است.".into(),
    }];
    let index = pipeline(CorrectionLexicon::new()).build_documents(&docs);
    assert_eq!(index.len(), 1);

    let outcome = engine(&index).search(&Query::collocation("دنیا").with_mode(Mode::Before));
    let row = outcome
        .rows
        .iter()
        .find(|r| r.position == Position::Before)
        .expect("neighbor row");
    assert_eq!((row.term.as_str(), row.frequency), ("سلام", 1));
}

#[test]
fn corrections_are_visible_to_search() {
    let lexicon: CorrectionLexicon = [("جهان".to_string(), "دنیا".to_string())]
        .into_iter()
        .collect();
    let docs = vec![Document {
        source_id: "doc".into(),
        text: "سلام جهان.".into(),
    }];
    let index = pipeline(lexicon).build_documents(&docs);
    let outcome = engine(&index).search(&Query::collocation("دنیا"));
    let keyword = outcome
        .rows
        .iter()
        .find(|r| r.position == Position::Keyword)
        .expect("phrase occurs");
    assert_eq!(keyword.frequency, 1);
    assert_eq!(keyword.role, "-");
}

#[test]
fn root_of_empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = pipeline(CorrectionLexicon::new())
        .build_from_root(dir.path())
        .unwrap_err();
    assert!(matches!(err, colloc_core::CollocError::NoDocuments(_)));
}
