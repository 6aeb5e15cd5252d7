//! Corpus ingestion: extraction, correction, normalization, segmentation,
//! tokenization and tagging.

pub mod corrector;
pub mod lexicon;
/// Document discovery and text extraction.
pub mod loader;
pub mod normalizer;
pub mod segmenter;
pub mod tagger;
pub mod tokenizer;

pub use corrector::{correct, Corrector};
pub use lexicon::CorrectionLexicon;
pub use loader::{discover_documents, Document, DocumentRef, JsonlCorpus, PlainTextExtractor, TextExtractor};
pub use normalizer::{Normalizer, PersianNormalizer};
pub use segmenter::{find_split_point, word_count, Segmenter};
pub use tagger::{LexiconTagger, Tagger, UniformTagger};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer, WordTokenizer};
