//! Result ordering: the initial ranking and per-column toggled sorts.

use std::cmp::Ordering;
use std::str::FromStr;

use super::{Position, ResultRow};

/// A sortable result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    /// Display sample.
    Sample,
    /// Matched or neighbor word.
    Term,
    /// Grammatical role label.
    Role,
    /// Occurrence count; compared numerically.
    Frequency,
    /// Position label.
    Position,
}

impl SortColumn {
    /// All columns in display order.
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Sample,
        SortColumn::Term,
        SortColumn::Role,
        SortColumn::Frequency,
        SortColumn::Position,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn compare(self, a: &ResultRow, b: &ResultRow) -> Ordering {
        match self {
            SortColumn::Sample => a.sample.cmp(&b.sample),
            SortColumn::Term => a.term.cmp(&b.term),
            SortColumn::Role => a.role.cmp(&b.role),
            SortColumn::Frequency => a.frequency.cmp(&b.frequency),
            SortColumn::Position => a.position.label().cmp(b.position.label()),
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sample" => Ok(SortColumn::Sample),
            "term" | "word" => Ok(SortColumn::Term),
            "role" | "grammatical_role" | "pos" => Ok(SortColumn::Role),
            "frequency" | "freq" => Ok(SortColumn::Frequency),
            "position" => Ok(SortColumn::Position),
            other => Err(format!("unknown column '{other}'")),
        }
    }
}

/// Initial ranking: the keyword row on top, then frequency descending and
/// term ascending. Stable.
pub fn rank(rows: &mut [ResultRow]) {
    let is_keyword = |r: &ResultRow| r.position == Position::Keyword;
    rows.sort_by(|a, b| {
        is_keyword(b)
            .cmp(&is_keyword(a))
            .then_with(|| b.frequency.cmp(&a.frequency))
            .then_with(|| a.term.cmp(&b.term))
    });
}

/// Per-column sort direction toggles for interactive re-sorting.
///
/// A column's first sort is ascending, then it alternates. Frequency starts
/// as if already sorted descending, since [`Ranker::rank`] did that.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    next_descending: [bool; 5],
}

impl Ranker {
    /// Fresh toggle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the initial ranking and reset the toggles.
    pub fn rank(&mut self, rows: &mut [ResultRow]) {
        rank(rows);
        self.next_descending = [false; 5];
    }

    /// Stable sort on `column`, flipping its direction for the next call.
    /// Returns true when this sort was descending.
    pub fn sort_by(&mut self, rows: &mut [ResultRow], column: SortColumn) -> bool {
        let descending = self.next_descending[column.index()];
        if descending {
            rows.sort_by(|a, b| column.compare(b, a));
        } else {
            rows.sort_by(|a, b| column.compare(a, b));
        }
        self.next_descending[column.index()] = !descending;
        descending
    }
}
