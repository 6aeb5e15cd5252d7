//! Paragraph merging and length-bounded segmentation.
//!
//! Paragraphs are normalized and merged until a unit ends with terminal
//! punctuation. Units longer than `max_words` words are then cut at a
//! "good" boundary found by a character-offset heuristic:
//!
//! 1. the last terminal punctuation in `[0, ideal + 50)` if it lies past `ideal / 2`,
//! 2. else the last space in `[0, ideal + 20)` if it lies past `ideal / 3`,
//! 3. else a hard cut at `min(ideal, len)`.
//!
//! `ideal` is the configured `ideal_words` value used directly as a
//! character offset. If a cut would not shrink the text, the unit is cut
//! after its `max_words`-th word instead, so every output segment has at
//! most `max_words` words and no non-whitespace character is dropped.

use std::sync::Arc;

use crate::config::CollocConfig;
use crate::corpus::Normalizer;

/// Characters that end a sentence-like unit.
pub const TERMINAL_PUNCTUATION: [char; 5] = ['.', '!', '?', ':', '؟'];

/// Punctuation search window beyond the ideal position, in characters.
pub const PUNCTUATION_WINDOW_SLACK: usize = 50;

/// Space search window beyond the ideal position, in characters.
pub const SPACE_WINDOW_SLACK: usize = 20;

/// Whether `c` ends a sentence-like unit.
pub fn is_terminal(c: char) -> bool {
    TERMINAL_PUNCTUATION.contains(&c)
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits raw paragraphs into bounded segments.
pub struct Segmenter {
    normalizer: Arc<dyn Normalizer>,
    max_words: usize,
    ideal_words: usize,
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter")
            .field("normalizer", &"<Normalizer>")
            .field("max_words", &self.max_words)
            .field("ideal_words", &self.ideal_words)
            .finish()
    }
}

impl Segmenter {
    /// Create a segmenter.
    ///
    /// # Panics
    /// If `max_words` or `ideal_words` is zero.
    pub fn new(normalizer: Arc<dyn Normalizer>, max_words: usize, ideal_words: usize) -> Self {
        assert!(max_words > 0, "Segmenter requires max_words >= 1");
        assert!(ideal_words > 0, "Segmenter requires ideal_words >= 1");
        Self {
            normalizer,
            max_words,
            ideal_words,
        }
    }

    /// Create a segmenter with the limits from `config`.
    pub fn from_config(normalizer: Arc<dyn Normalizer>, config: &CollocConfig) -> Self {
        Self::new(normalizer, config.max_words, config.ideal_words)
    }

    /// Maximum words per segment.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Normalize, merge and bound `paragraphs`.
    pub fn segment<S: AsRef<str>>(&self, paragraphs: &[S]) -> Vec<String> {
        let mut segments = Vec::new();
        for unit in self.merge(paragraphs) {
            self.bound(&unit, &mut segments);
        }
        segments
    }

    /// Merge normalized paragraphs into units ending with terminal punctuation.
    /// A trailing unit without punctuation is kept.
    pub fn merge<S: AsRef<str>>(&self, paragraphs: &[S]) -> Vec<String> {
        let mut units = Vec::new();
        let mut buffer = String::new();

        for para in paragraphs {
            let cleaned = self.normalizer.normalize(para.as_ref().trim());
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                continue;
            }

            if !buffer.is_empty() {
                buffer.push(' ');
            }
            buffer.push_str(cleaned);

            if buffer.ends_with(is_terminal) {
                units.push(std::mem::take(&mut buffer));
            }
        }

        if !buffer.is_empty() {
            units.push(buffer);
        }
        units
    }

    fn bound(&self, unit: &str, out: &mut Vec<String>) {
        let mut rest = unit.trim().to_string();

        while word_count(&rest) > self.max_words {
            let chars: Vec<char> = rest.chars().collect();
            let mut split = find_split_point(&rest, self.ideal_words).max(1);
            if chars[split.min(chars.len())..].iter().all(|c| c.is_whitespace()) {
                split = cut_after_words(&chars, self.max_words);
            }

            let byte = byte_offset(&rest, split);
            let head = rest[..byte].trim();
            if !head.is_empty() {
                if word_count(head) > self.max_words {
                    self.bound(head, out);
                } else {
                    out.push(head.to_string());
                }
            }
            rest = rest[byte..].trim().to_string();
        }

        if !rest.is_empty() {
            out.push(rest);
        }
    }
}

/// Character offset at which to cut `text`, preferring punctuation, then a
/// space, then a hard cut at `ideal_pos`.
pub fn find_split_point(text: &str, ideal_pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let punct_limit = len.min(ideal_pos + PUNCTUATION_WINDOW_SLACK);
    if let Some(pos) = chars[..punct_limit].iter().rposition(|&c| is_terminal(c)) {
        if 2 * pos > ideal_pos {
            return pos + 1;
        }
    }

    let space_limit = len.min(ideal_pos + SPACE_WINDOW_SLACK);
    if let Some(pos) = chars[..space_limit].iter().rposition(|&c| c == ' ') {
        if 3 * pos > ideal_pos {
            return pos + 1;
        }
    }

    ideal_pos.min(len)
}

/// Character offset just past the `words`-th word.
fn cut_after_words(chars: &[char], words: usize) -> usize {
    let mut seen = 0;
    let mut in_word = false;
    for (i, c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            if in_word {
                seen += 1;
                if seen == words {
                    return i;
                }
            }
            in_word = false;
        } else {
            in_word = true;
        }
    }
    chars.len()
}

fn byte_offset(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PersianNormalizer;

    fn segmenter(max_words: usize, ideal_words: usize) -> Segmenter {
        Segmenter::new(Arc::new(PersianNormalizer), max_words, ideal_words)
    }

    fn non_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn merges_until_terminal_punctuation() {
        let seg = segmenter(250, 150);
        let out = seg.segment(&["Hello", "world.", "", "   ", "Next one!", "dangling"]);
        assert_eq!(out, vec!["Hello world.", "Next one!", "dangling"]);
    }

    #[test]
    fn persian_question_mark_and_colon_terminate() {
        let seg = segmenter(250, 150);
        let out = seg.segment(&["چرا؟", "گفت:", "بله"]);
        assert_eq!(out, vec!["چرا؟", "گفت:", "بله"]);
    }

    #[test]
    fn separate_sentences_on_separate_lines() {
        let seg = segmenter(250, 150);
        let out = seg.segment(&["سلام دنیا.", "این یک آزمون است."]);
        assert_eq!(out, vec!["سلام دنیا.", "این یک آزمون است."]);
    }

    #[test]
    fn split_prefers_punctuation_then_space() {
        let seg = segmenter(3, 10);
        let out = seg.segment(&["one two three. four five six seven"]);
        assert_eq!(out, vec!["one two three.", "four five six", "seven"]);
    }

    #[test]
    fn split_point_thresholds() {
        // '.' at index 4 is not past ideal/2 = 5, so the last space wins.
        assert_eq!(find_split_point("abcd. efgh ijkl", 10), 11);
        // '.' at index 13 is past the midpoint.
        assert_eq!(find_split_point("one two three. four", 10), 14);
        // Space at index 1 is not past ideal/3; hard cut.
        let text = format!("a {}", "b".repeat(100));
        assert_eq!(find_split_point(&text, 30), 30);
        // Hard cut never exceeds the text length.
        assert_eq!(find_split_point("ab", 30), 2);
    }

    #[test]
    fn hard_cut_keeps_every_character() {
        let seg = segmenter(1, 30);
        let text = format!("a {}", "b".repeat(100));
        let out = seg.segment(&[text.as_str()]);
        assert_eq!(out, vec!["a".to_string(), "b".repeat(28), "b".repeat(72)]);
        assert_eq!(non_ws(&out.concat()), non_ws(&text));
    }

    #[test]
    fn cut_that_would_not_shrink_falls_back_to_word_limit() {
        let seg = segmenter(2, 150);
        let out = seg.segment(&["a b c d."]);
        assert_eq!(out, vec!["a b", "c d."]);
    }

    #[test]
    fn segments_respect_word_limit_and_conserve_text() {
        let seg = segmenter(7, 20);
        let paragraphs: Vec<String> = (0..40)
            .map(|i| {
                let words: Vec<String> = (0..(i % 13 + 1)).map(|w| format!("w{i}x{w}")).collect();
                let mut p = words.join(" ");
                if i % 4 == 0 {
                    p.push('.');
                }
                p
            })
            .collect();

        let out = seg.segment(&paragraphs);
        for s in &out {
            assert!(word_count(s) <= 7, "segment too long: {s}");
            assert!(!s.trim().is_empty());
        }
        let merged: String = seg.merge(&paragraphs).concat();
        assert_eq!(non_ws(&out.concat()), non_ws(&merged));
    }

    #[test]
    #[should_panic(expected = "max_words")]
    fn zero_word_limit_is_a_precondition_violation() {
        segmenter(0, 10);
    }
}
