//! Global configuration for segmentation, tagging defaults and caching.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CollocError, Result};

/// Configuration shared by the corpus build and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocConfig {
    /// Maximum number of whitespace-separated words per segment.
    pub max_words: usize,
    /// Preferred split position, used as a character offset.
    pub ideal_words: usize,
    /// Extension (without dot) of document files under the corpus root.
    pub document_extension: String,
    /// Tag assigned to every token when no tag lexicon is supplied.
    pub default_tag: String,
    /// Default cache file name.
    pub cache_file: String,
}

impl Default for CollocConfig {
    fn default() -> Self {
        Self {
            max_words: 250,
            ideal_words: 150,
            document_extension: "txt".to_string(),
            default_tag: "X".to_string(),
            cache_file: "preprocessed_corpus.bin".to_string(),
        }
    }
}

impl CollocConfig {
    /// Load a JSON config file, or the defaults when no path is given.
    ///
    /// Missing keys take their default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let s = std::fs::read_to_string(path)?;
                serde_json::from_str(&s)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the segmenter and loader cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_words == 0 {
            return Err(CollocError::Config("max_words must be at least 1".into()));
        }
        if self.ideal_words == 0 {
            return Err(CollocError::Config("ideal_words must be at least 1".into()));
        }
        if self.document_extension.trim_start_matches('.').is_empty() {
            return Err(CollocError::Config("document_extension must not be empty".into()));
        }
        Ok(())
    }

    /// Document extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.document_extension.trim_start_matches('.')
    }
}
