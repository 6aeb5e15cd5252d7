//! Orchestrates: documents -> correction -> segmentation -> tagging -> CorpusIndex.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    config::CollocConfig,
    corpus::{
        discover_documents, Corrector, Document, JsonlCorpus, Normalizer, PlainTextExtractor,
        Segmenter, Tagger, TextExtractor, Tokenizer,
    },
    errors::{CollocError, Result},
    search::CorpusIndex,
    types::TaggedSegment,
};

/// High-level pipeline: corpus root -> tagged segment index.
///
/// Documents are processed in parallel but the index keeps document
/// enumeration order, and segment order within each document.
pub struct CorpusBuildPipeline {
    config: CollocConfig,
    corrector: Corrector,
    normalizer: Arc<dyn Normalizer>,
    segmenter: Segmenter,
    tokenizer: Arc<dyn Tokenizer>,
    tagger: Arc<dyn Tagger>,
    extractor: Arc<dyn TextExtractor>,
}

impl std::fmt::Debug for CorpusBuildPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusBuildPipeline")
            .field("config", &self.config)
            .field("corrections", &self.corrector.lexicon().len())
            .field("segmenter", &self.segmenter)
            .field("tokenizer", &"<Tokenizer>")
            .field("tagger", &"<Tagger>")
            .field("extractor", &"<TextExtractor>")
            .finish()
    }
}

impl CorpusBuildPipeline {
    /// Create a pipeline reading plain text documents.
    pub fn new(
        config: CollocConfig,
        corrector: Corrector,
        normalizer: Arc<dyn Normalizer>,
        tokenizer: Arc<dyn Tokenizer>,
        tagger: Arc<dyn Tagger>,
    ) -> Result<Self> {
        config.validate()?;
        let segmenter = Segmenter::from_config(normalizer.clone(), &config);
        Ok(Self {
            config,
            corrector,
            normalizer,
            segmenter,
            tokenizer,
            tagger,
            extractor: Arc::new(PlainTextExtractor),
        })
    }

    /// Replace the document text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Normalizer shared with the segmenter; queries must use the same one.
    pub fn normalizer(&self) -> Arc<dyn Normalizer> {
        self.normalizer.clone()
    }

    /// Tokenizer used for segments; queries must use the same one.
    pub fn tokenizer(&self) -> Arc<dyn Tokenizer> {
        self.tokenizer.clone()
    }

    /// Build the index from every document under `root`.
    pub fn build_from_root(&self, root: &Path) -> Result<CorpusIndex> {
        let refs = discover_documents(root, self.config.extension())?;
        if refs.is_empty() {
            return Err(CollocError::NoDocuments(root.to_path_buf()));
        }
        tracing::info!("Found {} documents under {}", refs.len(), root.display());

        let segmented: Vec<(String, Vec<String>)> = refs
            .par_iter()
            .filter_map(|doc| {
                let text = self.extractor.extract_text(&doc.path)?;
                let segments = self.segment_document(&text);
                tracing::debug!("{}: {} segments", doc.source_id, segments.len());
                Some((doc.source_id.clone(), segments))
            })
            .collect();

        let skipped = refs.len() - segmented.len();
        if skipped > 0 {
            tracing::warn!("{skipped} documents produced no text and were skipped");
        }

        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let mut index = CorpusIndex::with_root(root);
        index.segments = self.tag_segments(segmented);
        tracing::info!("Indexed {} segments", index.len());
        Ok(index)
    }

    /// Build the index from in-memory documents. The root stays unknown.
    pub fn build_documents(&self, docs: &[Document]) -> CorpusIndex {
        let segmented: Vec<(String, Vec<String>)> = docs
            .par_iter()
            .map(|doc| (doc.source_id.clone(), self.segment_document(&doc.text)))
            .collect();

        let mut index = CorpusIndex::new();
        index.segments = self.tag_segments(segmented);
        tracing::info!("Indexed {} segments from {} documents", index.len(), docs.len());
        index
    }

    /// Build the index from a JSONL corpus. Malformed lines are skipped.
    pub fn build_from_jsonl(&self, corpus: &JsonlCorpus) -> Result<CorpusIndex> {
        let docs: Vec<Document> = corpus
            .iter()?
            .filter_map(|doc| match doc {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::warn!("skipping malformed corpus line: {e}");
                    None
                }
            })
            .collect();
        Ok(self.build_documents(&docs))
    }

    /// Correct a document's text and cut it into segments.
    ///
    /// Each `\n`-separated line is one paragraph (a trailing `\r` is dropped).
    /// Sentences sharing a line stay in one segment unless the line exceeds
    /// `max_words`.
    pub fn segment_document(&self, text: &str) -> Vec<String> {
        let corrected = self.corrector.correct(text);
        let paragraphs: Vec<&str> = corrected.lines().collect();
        self.segmenter.segment(&paragraphs)
    }

    fn tag_segments(&self, segmented: Vec<(String, Vec<String>)>) -> Vec<TaggedSegment> {
        let flat: Vec<(String, String)> = segmented
            .into_iter()
            .flat_map(|(source_id, segments)| {
                segments.into_iter().map(move |text| (source_id.clone(), text))
            })
            .collect();

        flat.into_par_iter()
            .map(|(source_id, text)| {
                let tokens = self.tagger.tag(&self.tokenizer.tokenize(&text));
                TaggedSegment {
                    text,
                    tokens,
                    source_id,
                }
            })
            .collect()
    }
}
