//! Query description: kind, neighbor mode, lexical condition, category filter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::corpus::Normalizer;
use crate::errors::{CollocError, Result};
use crate::types::PosCategory;

/// Which search to run. The two kinds are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    /// Substring match of the phrase inside token word forms.
    ExactPhrase,
    /// Words immediately before/after exact occurrences of the phrase.
    #[default]
    Collocation,
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" | "exact_phrase" | "phrase" | "substring" => Ok(SearchKind::ExactPhrase),
            "collocation" | "neighbors" | "colloc" => Ok(SearchKind::Collocation),
            other => Err(format!("unknown search kind '{other}' (expected exact or collocation)")),
        }
    }
}

/// Which neighbors a collocation search collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Only the word preceding the phrase.
    Before,
    /// Only the word following the phrase.
    After,
    /// Both neighbors.
    #[default]
    Both,
}

impl Mode {
    /// Whether preceding words are collected.
    pub fn includes_before(self) -> bool {
        matches!(self, Mode::Before | Mode::Both)
    }

    /// Whether following words are collected.
    pub fn includes_after(self) -> bool {
        matches!(self, Mode::After | Mode::Both)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "before" | "prev" | "previous" => Ok(Mode::Before),
            "after" | "next" => Ok(Mode::After),
            "both" => Ok(Mode::Both),
            other => Err(format!("unknown mode '{other}' (expected before, after or both)")),
        }
    }
}

/// Lexical condition a neighbor word must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Condition {
    /// Always passes.
    #[default]
    None,
    /// The word contains the value.
    Contains(String),
    /// The word starts with the value.
    StartsWith(String),
}

impl Condition {
    /// True unless this is [`Condition::None`].
    pub fn is_active(&self) -> bool {
        !matches!(self, Condition::None)
    }

    /// Same condition with its value trimmed and normalized.
    pub fn normalized(&self, normalizer: &dyn Normalizer) -> Condition {
        match self {
            Condition::None => Condition::None,
            Condition::Contains(v) => Condition::Contains(normalizer.normalize(v.trim())),
            Condition::StartsWith(v) => Condition::StartsWith(normalizer.normalize(v.trim())),
        }
    }

    /// Check `word` against the condition.
    pub fn matches(&self, word: &str) -> bool {
        match self {
            Condition::None => true,
            Condition::Contains(v) => word.contains(v.as_str()),
            Condition::StartsWith(v) => word.starts_with(v.as_str()),
        }
    }
}

/// A search request against a corpus index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Search phrase as typed by the user.
    pub phrase: String,
    /// Search kind.
    #[serde(default)]
    pub kind: SearchKind,
    /// Neighbor positions (collocation only).
    #[serde(default)]
    pub mode: Mode,
    /// Lexical condition on neighbors (collocation only).
    #[serde(default)]
    pub condition: Condition,
    /// Grammatical category filter on neighbors (collocation only).
    #[serde(default)]
    pub pos_filter: Option<PosCategory>,
}

impl Query {
    /// Collocation query collecting both neighbors, no filters.
    pub fn collocation(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            kind: SearchKind::Collocation,
            mode: Mode::Both,
            condition: Condition::None,
            pos_filter: None,
        }
    }

    /// Exact-phrase (substring) query.
    pub fn exact(phrase: impl Into<String>) -> Self {
        Self {
            kind: SearchKind::ExactPhrase,
            ..Self::collocation(phrase)
        }
    }

    /// Set the neighbor mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the lexical condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Set the category filter.
    pub fn with_pos(mut self, category: PosCategory) -> Self {
        self.pos_filter = Some(category);
        self
    }

    /// Whether any neighbor filter is active.
    pub fn has_filters(&self) -> bool {
        self.pos_filter.is_some() || self.condition.is_active()
    }

    /// Reject queries the user must fix before searching.
    pub fn validate(&self) -> Result<()> {
        if self.phrase.trim().is_empty() {
            return Err(CollocError::InvalidQuery("search phrase is empty".into()));
        }
        if self.kind == SearchKind::Collocation {
            match &self.condition {
                Condition::Contains(v) | Condition::StartsWith(v) if v.trim().is_empty() => {
                    return Err(CollocError::InvalidQuery("condition needs a value".into()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Where a result row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Total exact occurrences of the phrase itself.
    Keyword,
    /// Word form containing the phrase (exact-phrase search).
    Substring,
    /// Word preceding the phrase.
    Before,
    /// Word following the phrase.
    After,
}

impl Position {
    /// Label shown in the position column.
    pub fn label(self) -> &'static str {
        match self {
            Position::Keyword => "keyword",
            Position::Substring => "substring",
            Position::Before => "before",
            Position::After => "after",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "keyword" => Ok(Position::Keyword),
            "substring" => Ok(Position::Substring),
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            other => Err(format!("unknown position '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_coverage() {
        assert!(Mode::Both.includes_before() && Mode::Both.includes_after());
        assert!(!Mode::Before.includes_after());
        assert!(!Mode::After.includes_before());
    }

    #[test]
    fn condition_matching() {
        assert!(Condition::None.matches("anything"));
        assert!(Condition::Contains("تاب".into()).matches("کتاب"));
        assert!(!Condition::StartsWith("تاب".into()).matches("کتاب"));
        assert!(Condition::StartsWith("کت".into()).matches("کتاب"));
    }

    #[test]
    fn condition_value_is_normalized() {
        let upper = |s: &str| s.to_uppercase();
        let c = Condition::Contains("  ab ".into()).normalized(&upper);
        assert_eq!(c, Condition::Contains("AB".into()));
    }

    #[test]
    fn validation() {
        assert!(Query::collocation("  ").validate().is_err());
        assert!(Query::collocation("x")
            .with_condition(Condition::StartsWith(" ".into()))
            .validate()
            .is_err());
        assert!(Query::exact("x").validate().is_ok());
    }

    #[test]
    fn query_json_defaults() {
        let q: Query = serde_json::from_str(r#"{"phrase": "دنیا", "mode": "before"}"#).unwrap();
        assert_eq!(q.kind, SearchKind::Collocation);
        assert_eq!(q.mode, Mode::Before);
        assert_eq!(q.condition, Condition::None);
        assert_eq!(q.pos_filter, None);
    }
}
