//! CSV export of record history.
//!
//! Writes one record kind per file, oldest first, with a header row.

use crate::{Record, RecordKind, RecordStore, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
///
/// Columns not used by a kind are left empty so every export shares one header.
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    kind: &'static str,
    duration_hours: Option<f64>,
    feeling: Option<&'static str>,
    energy_level: Option<&'static str>,
    text: Option<&'a str>,
}

impl<'a> From<&'a Record> for CsvRow<'a> {
    fn from(record: &'a Record) -> Self {
        let mut row = CsvRow {
            date: record.date().to_string(),
            kind: record.kind().as_str(),
            duration_hours: None,
            feeling: None,
            energy_level: None,
            text: None,
        };
        match record {
            Record::Sleep(r) => row.duration_hours = Some(r.duration_hours),
            Record::Condition(r) => {
                row.feeling = Some(r.feeling.as_str());
                row.energy_level = Some(r.energy_level.as_str());
            }
            Record::Diary(r) => row.text = Some(r.text.as_str()),
        }
        row
    }
}

/// Write every record of `kind` to `path`, replacing any existing file
///
/// Returns the number of rows written. The file is synced to disk before
/// returning.
pub fn export_csv(store: &RecordStore, kind: RecordKind, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let records = store.all(kind);
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);

    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }

    // An empty export still gets a header
    if records.is_empty() {
        writer.write_record([
            "date",
            "kind",
            "duration_hours",
            "feeling",
            "energy_level",
            "text",
        ])?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} {} records to {:?}", records.len(), kind, path);
    Ok(records.len())
}
