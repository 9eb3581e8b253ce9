//! CSV writer for normalized tables.
//!
//! Cells are rendered as:
//!
//! - `null` → empty field
//! - strings verbatim
//! - numbers and booleans in JSON notation
//! - arrays and objects as compact JSON

use csv::Writer;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::OutputResult;
use crate::records::Table;

/// Text form of one cell
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Serialize a table (header + rows) to any writer.
pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> OutputResult<()> {
    let mut csv_writer = Writer::from_writer(writer);

    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(cell_to_string))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write a table to `path`.
///
/// Rows go to a temporary file in the destination directory, which is renamed
/// over `path` only once fully written. On error nothing is left behind.
pub fn write_csv(table: &Table, path: &Path) -> OutputResult<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_csv_to(table, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    Ok(path.to_path_buf())
}
