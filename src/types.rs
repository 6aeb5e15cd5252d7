//! Common core types used across segmentation, indexing and search.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A token paired with the grammatical tag assigned by the tagger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Surface form as produced by the tokenizer.
    pub word: String,
    /// Tag code, e.g. `NOUN` or `ADJ,EZ`.
    pub tag: String,
}

impl TaggedToken {
    /// Create a tagged token.
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// A segment of normalized prose with its tagged tokens and origin.
///
/// Immutable once built; `tokens` keeps tokenizer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSegment {
    /// Normalized segment text.
    pub text: String,
    /// Tagged tokens of `text`, in order.
    pub tokens: Vec<TaggedToken>,
    /// Document identifier relative to the corpus root, without extension.
    /// Empty when the origin is unknown.
    pub source_id: String,
}

impl TaggedSegment {
    /// Provenance pointer for this segment.
    pub fn source_ref(&self) -> SourceRef {
        SourceRef {
            sentence: self.text.clone(),
            source_id: if self.source_id.is_empty() {
                None
            } else {
                Some(self.source_id.clone())
            },
        }
    }
}

/// Provenance of a result: the sentence and the document it came from.
///
/// Ordered with unknown sources last, then by source id, then by sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Segment text the result was counted in.
    pub sentence: String,
    /// Originating document, if known.
    pub source_id: Option<String>,
}

impl Ord for SourceRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source_id
            .is_none()
            .cmp(&other.source_id.is_none())
            .then_with(|| self.source_id.cmp(&other.source_id))
            .then_with(|| self.sentence.cmp(&other.sentence))
    }
}

impl PartialOrd for SourceRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Grammatical categories offered as search filters.
///
/// Each category covers one or more tag codes; the `,EZ` variants
/// (with linking vowel) fold into their base category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosCategory {
    /// NOUN, NOUN,EZ
    Noun,
    /// VERB
    Verb,
    /// ADJ, ADJ,EZ
    Adjective,
    /// ADV
    Adverb,
    /// PRON
    Pronoun,
    /// NUM, NUM,EZ
    Numeral,
    /// ADP, ADP,EZ
    Adposition,
    /// CCONJ, SCONJ
    Conjunction,
    /// PUNCT
    Punctuation,
    /// DET
    Determiner,
    /// INTJ
    Interjection,
}

impl PosCategory {
    /// Every category, in display order.
    pub const ALL: [PosCategory; 11] = [
        PosCategory::Noun,
        PosCategory::Verb,
        PosCategory::Adjective,
        PosCategory::Adverb,
        PosCategory::Pronoun,
        PosCategory::Numeral,
        PosCategory::Adposition,
        PosCategory::Conjunction,
        PosCategory::Punctuation,
        PosCategory::Determiner,
        PosCategory::Interjection,
    ];

    /// Tag codes belonging to this category.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            PosCategory::Noun => &["NOUN", "NOUN,EZ"],
            PosCategory::Verb => &["VERB"],
            PosCategory::Adjective => &["ADJ", "ADJ,EZ"],
            PosCategory::Adverb => &["ADV"],
            PosCategory::Pronoun => &["PRON"],
            PosCategory::Numeral => &["NUM", "NUM,EZ"],
            PosCategory::Adposition => &["ADP", "ADP,EZ"],
            PosCategory::Conjunction => &["CCONJ", "SCONJ"],
            PosCategory::Punctuation => &["PUNCT"],
            PosCategory::Determiner => &["DET"],
            PosCategory::Interjection => &["INTJ"],
        }
    }

    /// Whether `tag` belongs to this category.
    pub fn contains(self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    /// Category of a tag code, if any.
    pub fn from_tag(tag: &str) -> Option<PosCategory> {
        Self::ALL.into_iter().find(|c| c.contains(tag))
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PosCategory::Noun => "noun",
            PosCategory::Verb => "verb",
            PosCategory::Adjective => "adjective",
            PosCategory::Adverb => "adverb",
            PosCategory::Pronoun => "pronoun",
            PosCategory::Numeral => "numeral",
            PosCategory::Adposition => "adposition",
            PosCategory::Conjunction => "conjunction",
            PosCategory::Punctuation => "punctuation",
            PosCategory::Determiner => "determiner",
            PosCategory::Interjection => "interjection",
        }
    }
}

/// Display label for a tag: its category name, or the raw tag when unmapped.
pub fn role_label(tag: &str) -> String {
    PosCategory::from_tag(tag)
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| tag.to_string())
}

impl fmt::Display for PosCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PosCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|c| c.label()).collect();
                format!("unknown category '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ezafe_variants_fold_into_base_category() {
        assert_eq!(PosCategory::from_tag("NOUN,EZ"), Some(PosCategory::Noun));
        assert_eq!(PosCategory::from_tag("ADJ,EZ"), Some(PosCategory::Adjective));
        assert_eq!(PosCategory::from_tag("SCONJ"), Some(PosCategory::Conjunction));
        assert_eq!(PosCategory::from_tag("X"), None);
    }

    #[test]
    fn role_label_falls_back_to_raw_tag() {
        assert_eq!(role_label("VERB"), "verb");
        assert_eq!(role_label("X"), "X");
    }

    #[test]
    fn parse_category_labels() {
        assert_eq!("Noun".parse::<PosCategory>(), Ok(PosCategory::Noun));
        assert!("gerund".parse::<PosCategory>().is_err());
    }

    #[test]
    fn unknown_sources_sort_last() {
        let mut refs = vec![
            SourceRef {
                sentence: "a".into(),
                source_id: None,
            },
            SourceRef {
                sentence: "b".into(),
                source_id: Some("book2".into()),
            },
            SourceRef {
                sentence: "c".into(),
                source_id: Some("book1".into()),
            },
        ];
        refs.sort();
        let ids: Vec<_> = refs.iter().map(|r| r.source_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("book1"), Some("book2"), None]);
    }
}
