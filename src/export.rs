//! Tabular export of result rows and source sentences.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CollocError, Result};
use crate::search::{file_name_for, ResultRow};
use crate::types::SourceRef;

/// Characters removed from a phrase before it becomes a file name.
const FILE_NAME_FORBIDDEN: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// One exported result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Display sample.
    pub sample: String,
    /// Matched or neighbor word.
    pub term: String,
    /// Grammatical role label.
    pub grammatical_role: String,
    /// Occurrence count.
    pub frequency: u64,
    /// Position label.
    pub position: String,
}

impl From<&ResultRow> for ResultRecord {
    fn from(row: &ResultRow) -> Self {
        Self {
            sample: row.sample.clone(),
            term: row.term.clone(),
            grammatical_role: row.role.clone(),
            frequency: row.frequency,
            position: row.position.label().to_string(),
        }
    }
}

/// One exported source sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Segment text.
    pub source_sentence: String,
    /// Document file name; empty when unknown.
    pub file_name: String,
}

impl SourceRecord {
    /// Record for `source`, naming its file with `extension`.
    pub fn new(source: &SourceRef, extension: &str) -> Self {
        Self {
            source_sentence: source.sentence.clone(),
            file_name: source
                .source_id
                .as_deref()
                .map(|id| file_name_for(id, extension))
                .unwrap_or_default(),
        }
    }
}

/// Write `rows` as CSV with a header row.
pub fn write_results<W: Write>(writer: W, rows: &[ResultRow]) -> Result<()> {
    if rows.is_empty() {
        return Err(CollocError::NothingToExport);
    }
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(ResultRecord::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read rows written by [`write_results`].
pub fn read_results<R: Read>(reader: R) -> Result<Vec<ResultRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records = rdr.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Write `sources` as CSV with a header row.
pub fn write_sources<W: Write>(writer: W, sources: &[SourceRef], extension: &str) -> Result<()> {
    if sources.is_empty() {
        return Err(CollocError::NothingToExport);
    }
    let mut wtr = csv::Writer::from_writer(writer);
    for source in sources {
        wtr.serialize(SourceRecord::new(source, extension))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read sources written by [`write_sources`].
pub fn read_sources<R: Read>(reader: R) -> Result<Vec<SourceRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records = rdr.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Write result rows to the file at `path`.
pub fn export_results(path: &Path, rows: &[ResultRow]) -> Result<()> {
    if rows.is_empty() {
        return Err(CollocError::NothingToExport);
    }
    write_results(File::create(path)?, rows)?;
    tracing::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write source sentences to the file at `path`.
pub fn export_sources(path: &Path, sources: &[SourceRef], extension: &str) -> Result<()> {
    if sources.is_empty() {
        return Err(CollocError::NothingToExport);
    }
    write_sources(File::create(path)?, sources, extension)?;
    tracing::info!("Exported {} sources to {}", sources.len(), path.display());
    Ok(())
}

/// Suggested export file name for `phrase`, e.g. `phrase_results.csv`.
pub fn default_file_name(phrase: &str, suffix: &str) -> String {
    let safe: String = phrase
        .trim()
        .chars()
        .filter(|c| !FILE_NAME_FORBIDDEN.contains(c))
        .collect();
    if safe.is_empty() {
        format!("{suffix}.csv")
    } else {
        format!("{safe}_{suffix}.csv")
    }
}
