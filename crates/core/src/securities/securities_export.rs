//! CSV export of security lists.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;

use super::securities_model::SecurityList;
use crate::errors::{Error, Result};

/// Write `list` as CSV with an `exchange,code,name,board` header.
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(list: &SecurityList, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in list.iter() {
        csv_writer
            .serialize(record)
            .map_err(|e| Error::Export(e.to_string()))?;
    }
    csv_writer.flush().map_err(|e| Error::Export(e.to_string()))?;
    Ok(list.len())
}

/// Export `list` to a CSV file at `path`, replacing any existing file.
pub fn export_csv(list: &SecurityList, path: &Path) -> Result<usize> {
    let file = File::create(path)
        .map_err(|e| Error::Export(format!("cannot create {}: {}", path.display(), e)))?;
    let rows = write_csv(list, file)?;
    info!("Exported {} securities to {}", rows, path.display());
    Ok(rows)
}
