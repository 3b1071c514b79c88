//! History export to CSV or JSON.

use std::fs;
use std::io::Write;
use std::path::Path;

use calckit_core::HistoryEntry;
use tracing::info;

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick the format from a file extension; anything but `.json` is CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Write `Date,Parameters,Result` rows, one per entry
pub fn write_csv<W: Write>(writer: W, entries: &[HistoryEntry]) -> Result<(), StorageError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Date", "Parameters", "Result"])?;
    for entry in entries {
        let params = format!("{}: {}", entry.formula_id, entry.params);
        wtr.write_record([entry.date().as_str(), params.as_str(), entry.result.as_str()])?;
    }
    wtr.flush()
        .map_err(|e| StorageError::Serialize(format!("Failed to flush CSV: {e}")))
}

pub fn write_json<W: Write>(writer: W, entries: &[HistoryEntry]) -> Result<(), StorageError> {
    serde_json::to_writer_pretty(writer, entries)?;
    Ok(())
}

/// Export entries to `path`, inferring the format from its extension
pub fn export_history(path: &Path, entries: &[HistoryEntry]) -> Result<ExportFormat, StorageError> {
    let format = ExportFormat::from_path(path);
    let file = fs::File::create(path).map_err(|e| StorageError::io(path, e))?;
    match format {
        ExportFormat::Csv => write_csv(file, entries)?,
        ExportFormat::Json => write_json(file, entries)?,
    }
    info!(path = %path.display(), count = entries.len(), ?format, "history exported");
    Ok(format)
}
