//! Correction lexicon loading.

use std::collections::HashMap;
use std::path::Path;

use crate::errors::Result;

/// Mapping from an incorrect form to its correction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionLexicon {
    entries: HashMap<String, String>,
}

impl CorrectionLexicon {
    /// Empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a correction.
    pub fn insert(&mut self, incorrect: impl Into<String>, correct: impl Into<String>) {
        self.entries.insert(incorrect.into(), correct.into());
    }

    /// Merge `other` into `self`; entries of `other` win.
    pub fn extend(&mut self, other: CorrectionLexicon) {
        self.entries.extend(other.entries);
    }

    /// Correction for `incorrect`, if any.
    pub fn get(&self, incorrect: &str) -> Option<&str> {
        self.entries.get(incorrect).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there is nothing to correct.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(incorrect, correct)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Load a two-column `incorrect,correct` file without header
    /// (tab-separated when the extension is `.tsv`).
    ///
    /// A missing path or unreadable file yields an empty lexicon.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::new();
        };
        if !path.exists() {
            tracing::warn!("correction list {} not found, continuing without corrections", path.display());
            return Self::new();
        }
        match Self::read(path) {
            Ok(lexicon) => {
                tracing::info!("Loaded {} corrections from {}", lexicon.len(), path.display());
                lexicon
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable correction list {}: {e}", path.display());
                Self::new()
            }
        }
    }

    /// Load several sources in order; later sources override earlier ones.
    pub fn load_many<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut merged = Self::new();
        for path in paths {
            merged.extend(Self::load(Some(path.as_ref())));
        }
        merged
    }

    fn read(path: &Path) -> Result<Self> {
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)?;

        let mut lexicon = Self::new();
        for record in reader.records() {
            let record = record?;
            let (Some(incorrect), Some(correct)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let (incorrect, correct) = (incorrect.trim(), correct.trim());
            if incorrect.is_empty() || correct.is_empty() {
                continue;
            }
            lexicon.insert(incorrect, correct);
        }
        Ok(lexicon)
    }
}

impl FromIterator<(String, String)> for CorrectionLexicon {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
