//! High-level pipelines: corpus building.

pub mod build_corpus;

pub use build_corpus::CorpusBuildPipeline;
