//! Tokenizer abstraction. You can plug in your own implementation.

use unicode_segmentation::UnicodeSegmentation;

/// Trait for tokenization.
pub trait Tokenizer: Send + Sync {
    /// Split text into an ordered sequence of tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Very naive whitespace tokenizer; punctuation stays glued to words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Unicode word-boundary tokenizer (UAX #29).
///
/// Punctuation marks become tokens of their own, whitespace is dropped,
/// and ZWNJ stays inside the word it joins.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_word_bounds()
            .filter(|piece| !piece.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}
