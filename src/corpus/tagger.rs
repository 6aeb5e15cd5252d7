//! Part-of-speech tagging capability.

use std::collections::HashMap;
use std::path::Path;

use crate::errors::{CollocError, Result};
use crate::types::TaggedToken;

/// Assigns a grammatical tag to each token.
///
/// The output has the same length and order as the input.
pub trait Tagger: Send + Sync {
    /// Tag a token sequence.
    fn tag(&self, tokens: &[String]) -> Vec<TaggedToken>;
}

/// Tags every token with the same tag.
#[derive(Debug, Clone)]
pub struct UniformTagger {
    tag: String,
}

impl UniformTagger {
    /// Create a tagger that always emits `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Tagger for UniformTagger {
    fn tag(&self, tokens: &[String]) -> Vec<TaggedToken> {
        tokens
            .iter()
            .map(|t| TaggedToken::new(t.clone(), self.tag.clone()))
            .collect()
    }
}

/// Dictionary tagger backed by a `{word: tag}` JSON object.
///
/// Unknown words get `PUNCT` when made only of punctuation, `NUM` when made
/// only of digits, and the fallback tag otherwise.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    tags: HashMap<String, String>,
    fallback: String,
}

impl LexiconTagger {
    /// Build from an in-memory lexicon.
    pub fn new(tags: HashMap<String, String>, fallback: impl Into<String>) -> Self {
        Self {
            tags,
            fallback: fallback.into(),
        }
    }

    /// Load the lexicon file. A missing or malformed file means no model.
    pub fn from_path(path: &Path, fallback: impl Into<String>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|_| CollocError::ModelUnavailable(path.to_path_buf()))?;
        let tags: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            tracing::warn!("tag lexicon {} is not a JSON object: {e}", path.display());
            CollocError::ModelUnavailable(path.to_path_buf())
        })?;
        tracing::info!("Loaded {} tagged words from {}", tags.len(), path.display());
        Ok(Self::new(tags, fallback))
    }

    /// Number of words in the lexicon.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True when the lexicon has no entries.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn tag_word(&self, word: &str) -> String {
        if let Some(tag) = self.tags.get(word) {
            return tag.clone();
        }
        if word.chars().all(|c| c.is_ascii_punctuation() || is_arabic_punctuation(c)) {
            "PUNCT".to_string()
        } else if word.chars().all(char::is_numeric) {
            "NUM".to_string()
        } else {
            self.fallback.clone()
        }
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Vec<TaggedToken> {
        tokens
            .iter()
            .map(|t| TaggedToken::new(t.clone(), self.tag_word(t)))
            .collect()
    }
}

fn is_arabic_punctuation(c: char) -> bool {
    matches!(c, '،' | '؛' | '؟' | '«' | '»' | '…')
}
