//! Ingestion of tabular datasets, i.e., a header row followed by data rows.

use std::{fs::File, io::Read, path::Path};

use serde::de::DeserializeOwned;

/// How many data rows (after the header) are ingested from a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowLimit {
    /// Read every data row.
    #[default]
    Unlimited,
    /// Only read the first `n` data rows.
    First(usize),
}

impl From<Option<usize>> for RowLimit {
    fn from(limit: Option<usize>) -> Self {
        limit.map(Self::First).unwrap_or_default()
    }
}

/// Deserialize the rows of a CSV source with a header row. Whitespace around fields is trimmed.
pub fn read_records<T, R>(reader: R, limit: RowLimit) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = csv.deserialize();
    match limit {
        RowLimit::Unlimited => records.collect(),
        RowLimit::First(n) => records.take(n).collect(),
    }
}

/// Deserialize the rows of the CSV file at `path`.
pub fn read_records_from_path<T, P>(path: P, limit: RowLimit) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    log::info!("Loading: {path:?}");
    let file = File::open(path)?;
    let records = read_records(file, limit)?;
    log::debug!("Read {} rows from {path:?}", records.len());
    Ok(records)
}
