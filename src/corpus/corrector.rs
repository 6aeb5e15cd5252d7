//! Whole-word find/replace using a correction lexicon.

use std::borrow::Cow;
use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::corpus::CorrectionLexicon;
use crate::errors::Result;

/// Large lexicons compile into a single alternation.
const PATTERN_SIZE_LIMIT: usize = 256 * (1 << 20);

/// Applies a [`CorrectionLexicon`] in a single pass.
///
/// Keys match literally and case-sensitively, and only as whole words: a
/// match may not touch a word character on either side. When the longest
/// key at a position fails that check, shorter keys at the same position
/// are tried before moving on. Substituted text is never re-matched.
#[derive(Debug, Clone)]
pub struct Corrector {
    lexicon: CorrectionLexicon,
    pattern: Option<Regex>,
    /// Keys by first character, longest first.
    by_first: HashMap<char, Vec<String>>,
}

impl Corrector {
    /// Compile the lexicon into one pattern.
    pub fn new(lexicon: CorrectionLexicon) -> Result<Self> {
        let mut keys: Vec<&str> = lexicon.iter().map(|(k, _)| k).filter(|k| !k.is_empty()).collect();
        if keys.is_empty() {
            return Ok(Self {
                lexicon,
                pattern: None,
                by_first: HashMap::new(),
            });
        }
        // Longest first so that overlapping keys prefer the longer form.
        keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

        let mut by_first: HashMap<char, Vec<String>> = HashMap::new();
        for key in &keys {
            if let Some(c) = key.chars().next() {
                by_first.entry(c).or_default().push(key.to_string());
            }
        }

        let alternation = keys
            .iter()
            .map(|key| {
                let mut alt = String::new();
                if key.chars().next().is_some_and(is_word_char) {
                    alt.push_str(r"\b");
                }
                alt.push_str(&regex::escape(key));
                if key.chars().next_back().is_some_and(is_word_char) {
                    alt.push_str(r"\b");
                }
                alt
            })
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!("(?:{alternation})"))
            .size_limit(PATTERN_SIZE_LIMIT)
            .dfa_size_limit(PATTERN_SIZE_LIMIT)
            .build()?;

        Ok(Self {
            lexicon,
            pattern: Some(pattern),
            by_first,
        })
    }

    /// The lexicon this corrector applies.
    pub fn lexicon(&self) -> &CorrectionLexicon {
        &self.lexicon
    }

    /// Replace every whole-word occurrence of a lexicon key.
    pub fn correct<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let Some(pattern) = &self.pattern else {
            return Cow::Borrowed(text);
        };

        let mut out = String::new();
        let mut copied = 0;
        let mut pos = 0;
        let mut replaced = false;
        while pos < text.len() {
            let Some(m) = pattern.find_at(text, pos) else {
                break;
            };
            let start = m.start();
            match self.whole_word_at(text, start) {
                Some((len, replacement)) => {
                    out.push_str(&text[copied..start]);
                    out.push_str(replacement);
                    copied = start + len;
                    pos = copied;
                    replaced = true;
                }
                None => {
                    pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        if !replaced {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[copied..]);
        Cow::Owned(out)
    }

    /// Longest key starting at `start` with a word boundary on both sides.
    fn whole_word_at(&self, text: &str, start: usize) -> Option<(usize, &str)> {
        if text[..start].chars().next_back().is_some_and(is_word_char) {
            return None;
        }
        let rest = &text[start..];
        let first = rest.chars().next()?;
        self.by_first
            .get(&first)?
            .iter()
            .filter(|key| rest.starts_with(key.as_str()))
            .find(|key| !rest[key.len()..].chars().next().is_some_and(is_word_char))
            .and_then(|key| self.lexicon.get(key.as_str()).map(|r| (key.len(), r)))
    }
}

/// One-shot correction; compiles the lexicon on every call.
pub fn correct(text: &str, lexicon: &CorrectionLexicon) -> Result<String> {
    if lexicon.is_empty() || text.is_empty() {
        return Ok(text.to_string());
    }
    let corrector = Corrector::new(lexicon.clone())?;
    Ok(corrector.correct(text).into_owned())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\u{200C}' || c == '\u{200D}'
}
