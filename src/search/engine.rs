//! Exact-phrase and collocation counting.
//!
//! Every call allocates its own counters and provenance buckets; the index is
//! only read. Rows come back ranked by [`rank`](super::rank), which keeps a
//! collocation's keyword row on top.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use super::query::{Position, Query, SearchKind};
use super::{rank, CorpusIndex};
use crate::corpus::{Normalizer, Tokenizer};
use crate::types::{role_label, SourceRef, TaggedToken};

/// Provenance bucket a result row draws its sources from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    /// The bare phrase occurrences of a collocation search.
    Keyword,
    /// A word form matched by an exact-phrase search.
    Term(String),
    /// A neighbor word on one side of the phrase.
    Neighbor(Position, String),
}

/// One aggregated result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    /// Display sample, e.g. `"word phrase"`.
    pub sample: String,
    /// Matched or neighbor word (the phrase itself for the keyword row).
    pub term: String,
    /// Grammatical role label, `-` for the keyword row.
    pub role: String,
    /// Number of occurrences counted.
    pub frequency: u64,
    /// Where the term sits relative to the phrase.
    pub position: Position,
    /// Provenance bucket for [`SearchOutcome::sources_for`].
    #[serde(skip)]
    pub key: SourceKey,
}

/// Ranked rows plus the provenance needed to list their sources.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Rows, ranked by frequency then term.
    pub rows: Vec<ResultRow>,
    sources: HashMap<SourceKey, Vec<SourceRef>>,
}

impl SearchOutcome {
    /// True when the search produced nothing to show.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Distinct sources a row was counted in, unknown sources last.
    pub fn sources_for(&self, row: &ResultRow) -> Vec<SourceRef> {
        self.sources
            .get(&row.key)
            .map(|refs| refs.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect())
            .unwrap_or_default()
    }
}

/// Runs queries against a borrowed [`CorpusIndex`].
pub struct CollocationEngine<'a> {
    index: &'a CorpusIndex,
    normalizer: Arc<dyn Normalizer>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl<'a> std::fmt::Debug for CollocationEngine<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollocationEngine")
            .field("segments", &self.index.len())
            .field("normalizer", &"<Normalizer>")
            .field("tokenizer", &"<Tokenizer>")
            .finish()
    }
}

type NeighborCounts = HashMap<(String, String), u64>;

impl<'a> CollocationEngine<'a> {
    /// Create an engine. Use the normalizer and tokenizer the index was built with.
    pub fn new(
        index: &'a CorpusIndex,
        normalizer: Arc<dyn Normalizer>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        Self {
            index,
            normalizer,
            tokenizer,
        }
    }

    /// Run `query`. Validation is the caller's job; see [`Query::validate`].
    pub fn search(&self, query: &Query) -> SearchOutcome {
        let mut outcome = match query.kind {
            SearchKind::ExactPhrase => self.search_substring(query),
            SearchKind::Collocation => self.search_collocation(query),
        };
        rank(&mut outcome.rows);
        outcome
    }

    fn search_substring(&self, query: &Query) -> SearchOutcome {
        let display = query.phrase.trim();
        let needle = self.normalizer.normalize(display);
        if needle.is_empty() {
            return SearchOutcome::default();
        }

        let mut counts: NeighborCounts = HashMap::new();
        let mut sources: HashMap<SourceKey, Vec<SourceRef>> = HashMap::new();

        for segment in &self.index.segments {
            if !self.normalizer.normalize(&segment.text).contains(&needle) {
                continue;
            }
            let hit = segment
                .tokens
                .iter()
                .find(|t| self.normalizer.normalize(&t.word).contains(&needle));
            if let Some(token) = hit {
                *counts
                    .entry((token.word.clone(), token.tag.clone()))
                    .or_insert(0) += 1;
                sources
                    .entry(SourceKey::Term(token.word.clone()))
                    .or_default()
                    .push(segment.source_ref());
            }
        }

        let rows = sorted_counts(counts)
            .into_iter()
            .map(|((word, tag), frequency)| ResultRow {
                sample: format!("{word} ({display})"),
                role: role_label(&tag),
                frequency,
                position: Position::Substring,
                key: SourceKey::Term(word.clone()),
                term: word,
            })
            .collect();

        SearchOutcome { rows, sources }
    }

    fn search_collocation(&self, query: &Query) -> SearchOutcome {
        let display = query.phrase.trim();
        let phrase = self.tokenizer.tokenize(&self.normalizer.normalize(display));
        if phrase.is_empty() {
            return SearchOutcome::default();
        }
        let len = phrase.len();
        let matched = phrase.join(" ");

        let condition = query.condition.normalized(self.normalizer.as_ref());
        let filtered = query.has_filters();
        let passes = |token: &TaggedToken| {
            !filtered
                || (query.pos_filter.map_or(true, |c| c.contains(&token.tag))
                    && condition.matches(&token.word))
        };

        let mut occurrences = 0u64;
        let mut before: NeighborCounts = HashMap::new();
        let mut after: NeighborCounts = HashMap::new();
        let mut sources: HashMap<SourceKey, Vec<SourceRef>> = HashMap::new();

        for segment in &self.index.segments {
            let tokens = &segment.tokens;
            if tokens.len() < len {
                continue;
            }
            for (i, window) in tokens.windows(len).enumerate() {
                if !window.iter().zip(&phrase).all(|(t, p)| t.word == *p) {
                    continue;
                }
                occurrences += 1;
                sources
                    .entry(SourceKey::Keyword)
                    .or_default()
                    .push(segment.source_ref());

                if query.mode.includes_before() && i > 0 {
                    let token = &tokens[i - 1];
                    if passes(token) {
                        record(&mut before, &mut sources, Position::Before, token, segment.source_ref());
                    }
                }
                if query.mode.includes_after() {
                    if let Some(token) = tokens.get(i + len) {
                        if passes(token) {
                            record(&mut after, &mut sources, Position::After, token, segment.source_ref());
                        }
                    }
                }
            }
        }

        let mut rows = Vec::new();
        if occurrences > 0 {
            rows.push(ResultRow {
                sample: display.to_string(),
                term: display.to_string(),
                role: "-".to_string(),
                frequency: occurrences,
                position: Position::Keyword,
                key: SourceKey::Keyword,
            });
        }
        rows.extend(neighbor_rows(before, Position::Before, &matched));
        rows.extend(neighbor_rows(after, Position::After, &matched));

        tracing::debug!(
            phrase = %matched,
            occurrences,
            rows = rows.len(),
            "collocation search finished"
        );
        SearchOutcome { rows, sources }
    }
}

fn record(
    counts: &mut NeighborCounts,
    sources: &mut HashMap<SourceKey, Vec<SourceRef>>,
    position: Position,
    token: &TaggedToken,
    source: SourceRef,
) {
    *counts
        .entry((token.word.clone(), token.tag.clone()))
        .or_insert(0) += 1;
    sources
        .entry(SourceKey::Neighbor(position, token.word.clone()))
        .or_default()
        .push(source);
}

fn neighbor_rows(counts: NeighborCounts, position: Position, phrase: &str) -> Vec<ResultRow> {
    sorted_counts(counts)
        .into_iter()
        .map(|((word, tag), frequency)| ResultRow {
            sample: match position {
                Position::Before => format!("{word} {phrase}"),
                _ => format!("{phrase} {word}"),
            },
            role: role_label(&tag),
            frequency,
            position,
            key: SourceKey::Neighbor(position, word.clone()),
            term: word,
        })
        .collect()
}

/// Frequency descending, then word, then tag.
fn sorted_counts(counts: NeighborCounts) -> Vec<((String, String), u64)> {
    let mut entries: Vec<_> = counts.into_iter().collect();
    entries.sort_by(|(ka, fa), (kb, fb)| fb.cmp(fa).then_with(|| ka.cmp(kb)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{PersianNormalizer, WhitespaceTokenizer};
    use crate::search::{Condition, Mode};
    use crate::types::{PosCategory, TaggedSegment};

    fn segment(tagged: &[(&str, &str)], source_id: &str) -> TaggedSegment {
        TaggedSegment {
            text: tagged.iter().map(|(w, _)| *w).collect::<Vec<_>>().join(" "),
            tokens: tagged.iter().map(|(w, t)| TaggedToken::new(*w, *t)).collect(),
            source_id: source_id.to_string(),
        }
    }

    fn engine(index: &CorpusIndex) -> CollocationEngine<'_> {
        CollocationEngine::new(index, Arc::new(PersianNormalizer), Arc::new(WhitespaceTokenizer))
    }

    fn sample_index() -> CorpusIndex {
        let mut index = CorpusIndex::new();
        index.push(segment(&[("الف", "NOUN"), ("ب", "VERB"), ("ج", "NOUN")], "doc1"));
        index.push(segment(&[("د", "ADJ"), ("ب", "VERB")], "doc2"));
        index
    }

    #[test]
    fn collocation_counts_both_sides() {
        let index = sample_index();
        let out = engine(&index).search(&Query::collocation("ب"));

        let keyword = out.rows.iter().find(|r| r.position == Position::Keyword).unwrap();
        assert_eq!(keyword.frequency, 2);
        assert_eq!(keyword.role, "-");

        let before: Vec<_> = out
            .rows
            .iter()
            .filter(|r| r.position == Position::Before)
            .map(|r| (r.term.as_str(), r.frequency, r.sample.as_str()))
            .collect();
        assert_eq!(before, vec![("الف", 1, "الف ب"), ("د", 1, "د ب")]);

        let after: Vec<_> = out
            .rows
            .iter()
            .filter(|r| r.position == Position::After)
            .map(|r| (r.term.as_str(), r.role.as_str(), r.sample.as_str()))
            .collect();
        assert_eq!(after, vec![("ج", "noun", "ب ج")]);
    }

    #[test]
    fn filters_apply_to_neighbors_only() {
        let index = sample_index();
        let query = Query::collocation("ب").with_pos(PosCategory::Adjective);
        let out = engine(&index).search(&query);

        assert_eq!(out.rows[0].position, Position::Keyword);
        assert_eq!(out.rows[0].frequency, 2);
        let terms: Vec<_> = out.rows[1..].iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["د"]);
    }

    #[test]
    fn starts_with_condition() {
        let mut index = CorpusIndex::new();
        index.push(segment(&[("کتاب", "NOUN"), ("خوب", "ADJ")], "a"));
        index.push(segment(&[("کتاب", "NOUN"), ("بزرگ", "ADJ")], "a"));
        let query = Query::collocation("کتاب")
            .with_mode(Mode::After)
            .with_condition(Condition::StartsWith("خ".into()));
        let out = engine(&index).search(&query);
        let terms: Vec<_> = out.rows.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["کتاب", "خوب"]);
    }

    #[test]
    fn multi_token_phrase_uses_window_bounds() {
        let mut index = CorpusIndex::new();
        index.push(segment(&[("a", "X"), ("b", "X"), ("c", "X")], "s"));
        index.push(segment(&[("b", "X"), ("c", "X")], "s"));
        let out = engine(&index).search(&Query::collocation("b c"));
        let rows: Vec<_> = out
            .rows
            .iter()
            .map(|r| (r.position, r.term.as_str(), r.frequency))
            .collect();
        assert_eq!(
            rows,
            vec![(Position::Keyword, "b c", 2), (Position::Before, "a", 1)]
        );
    }

    #[test]
    fn substring_counts_first_token_once_per_segment() {
        let mut index = CorpusIndex::new();
        index.push(segment(&[("کتابخانه", "NOUN"), ("کتاب", "NOUN")], "a"));
        index.push(segment(&[("کتاب", "NOUN")], "b"));
        index.push(segment(&[("دفتر", "NOUN")], "c"));

        let out = engine(&index).search(&Query::exact("کتاب"));
        let rows: Vec<_> = out
            .rows
            .iter()
            .map(|r| (r.sample.as_str(), r.frequency, r.position))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("کتاب (کتاب)", 1, Position::Substring),
                ("کتابخانه (کتاب)", 1, Position::Substring),
            ]
        );
    }

    #[test]
    fn sources_are_deduplicated() {
        let mut index = CorpusIndex::new();
        let seg = segment(&[("x", "X"), ("y", "X"), ("x", "X"), ("y", "X")], "doc");
        index.push(seg.clone());
        index.push(seg);
        let out = engine(&index).search(&Query::collocation("y").with_mode(Mode::Before));

        let row = out.rows.iter().find(|r| r.position == Position::Before).unwrap();
        assert_eq!(row.frequency, 4);
        let sources = out.sources_for(row);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id.as_deref(), Some("doc"));
    }

    #[test]
    fn keyword_row_stays_first_on_frequency_ties() {
        let mut index = CorpusIndex::new();
        index.push(segment(&[("الف", "NOUN"), ("ب", "VERB")], "a"));
        let out = engine(&index).search(&Query::collocation("ب").with_mode(Mode::Before));

        let rows: Vec<_> = out
            .rows
            .iter()
            .map(|r| (r.term.as_str(), r.frequency, r.position))
            .collect();
        assert_eq!(
            rows,
            vec![("ب", 1, Position::Keyword), ("الف", 1, Position::Before)]
        );
    }

    #[test]
    fn neighbor_samples_use_normalized_phrase() {
        let mut index = CorpusIndex::new();
        index.push(segment(&[("خوب", "ADJ"), ("کتاب", "NOUN")], "a"));
        // Arabic kaf in the query.
        let out = engine(&index).search(&Query::collocation("  كتاب ").with_mode(Mode::Before));

        let keyword = out.rows.iter().find(|r| r.position == Position::Keyword).unwrap();
        assert_eq!(keyword.sample, "كتاب");
        let before = out.rows.iter().find(|r| r.position == Position::Before).unwrap();
        assert_eq!(before.sample, "خوب کتاب");
    }

    #[test]
    fn empty_phrase_yields_nothing() {
        let index = sample_index();
        assert!(engine(&index).search(&Query::collocation("   ")).is_empty());
        assert!(engine(&index).search(&Query::exact("")).is_empty());
    }
}
