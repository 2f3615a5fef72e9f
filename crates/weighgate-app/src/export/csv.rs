//! CSV export with legacy-spreadsheet friendly encodings

use std::fs;
use std::path::Path;

use encoding_rs::GBK;
use tracing::{info, warn};
use weighgate_types::{CsvEncoding, Result};

use super::ReportSheet;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn render_text(sheet: &ReportSheet) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        wtr.write_record(row.iter().map(|c| c.to_text()))?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Encode report text; GBK falls back to UTF-8 with BOM when a character
/// has no GBK representation. Returns the encoding actually used.
pub fn encode_report_text(text: &str, encoding: CsvEncoding) -> (Vec<u8>, CsvEncoding) {
    match encoding {
        CsvEncoding::Gbk => {
            let (bytes, _, had_errors) = GBK.encode(text);
            if !had_errors {
                return (bytes.into_owned(), CsvEncoding::Gbk);
            }
            warn!("Report contains characters GBK cannot encode, writing UTF-8 with BOM instead");
            encode_report_text(text, CsvEncoding::Utf8Bom)
        }
        CsvEncoding::Utf8 => (text.as_bytes().to_vec(), CsvEncoding::Utf8),
        CsvEncoding::Utf8Bom => {
            let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
            bytes.extend_from_slice(UTF8_BOM);
            bytes.extend_from_slice(text.as_bytes());
            (bytes, CsvEncoding::Utf8Bom)
        }
    }
}

/// Export the report sheet to a CSV file
pub fn export_to_csv(sheet: &ReportSheet, path: &Path, encoding: CsvEncoding) -> Result<CsvEncoding> {
    let text = render_text(sheet)?;
    let (bytes, used) = encode_report_text(&text, encoding);
    fs::write(path, bytes)?;
    info!("Wrote {} rows to {} ({})", sheet.rows.len(), path.display(), used);
    Ok(used)
}
