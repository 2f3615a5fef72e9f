//! CSV source tables
//!
//! Reads a delimited export into a `RawTable`: decodes the bytes, cleans the
//! header names and pads short rows. Blank lines are skipped.

use std::path::Path;

use tracing::{debug, info};
use weighgate_domain::RawTable;
use weighgate_types::{Error, Result};

use crate::encoding::decode_bytes;

/// Header cleanup: exported headers often carry padding, full-width spaces
/// or a stray BOM that would break column lookup
pub fn clean_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect()
}

/// Load a table from a CSV file in any supported encoding
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let (text, encoding) = decode_bytes(&bytes).ok_or_else(|| Error::Decode {
        path: path.display().to_string(),
    })?;
    debug!(path = %path.display(), encoding = encoding.name(), "decoded source file");

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("table")
        .to_string();
    let table = parse_table(&name, &text)?;
    info!(table = %name, rows = table.len(), columns = table.headers.len(), "loaded table");
    Ok(table)
}

/// Parse already-decoded CSV text
pub fn parse_table(name: &str, text: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::EmptyTable(name.to_string()));
    }

    // delimiter-only rows stay so they show up as invalid rows downstream
    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    let hollow = rows.iter().filter(|r| r.iter().all(|c| c.is_empty())).count();
    if hollow > 0 {
        debug!(table = %name, hollow, "rows without any value");
    }

    Ok(RawTable::new(name, headers, rows))
}
