#![forbid(unsafe_code)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]

//! # colloc-core
//!
//! Core library for corpus-based collocation search:
//! - lexicon-driven correction and length-bounded segmentation
//! - tagged segment index with per-document provenance
//! - exact-phrase and neighbor (collocation) counting with filters
//!
//! Linguistic capabilities (normalizer, tokenizer, tagger, text extraction)
//! are traits; defaults for Persian plain text are included.

pub mod config;
pub mod corpus;
pub mod errors;
pub mod export;
/// High-level pipelines.
pub mod pipeline;
/// Search and retrieval.
pub mod search;
/// Persistence layer.
pub mod persistence;
/// HTTP API server.
pub mod server;
pub mod types;

pub use config::CollocConfig;
pub use errors::{CollocError, Result};
pub use pipeline::CorpusBuildPipeline;
pub use search::{CollocationEngine, CorpusIndex, Query, ResultRow, SearchOutcome};
pub use types::{PosCategory, SourceRef, TaggedSegment, TaggedToken};
