//! Core types for weighbridge / gate reconciliation

mod error;

pub use error::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for reconciliation results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Xlsx,
    Json,
    /// Console summary only, nothing written to disk
    Table,
}

impl OutputFormat {
    /// File extension used for the written report, if any
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Xlsx => Some("xlsx"),
            OutputFormat::Json => Some("json"),
            OutputFormat::Table => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Xlsx => write!(f, "xlsx"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

/// Text encoding for CSV reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum CsvEncoding {
    /// GBK, what Excel expects on a Chinese-locale Windows machine
    #[default]
    #[serde(rename = "gbk")]
    #[value(name = "gbk")]
    Gbk,
    #[serde(rename = "utf-8")]
    #[value(name = "utf-8")]
    Utf8,
    #[serde(rename = "utf-8-bom")]
    #[value(name = "utf-8-bom")]
    Utf8Bom,
}

impl std::fmt::Display for CsvEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CsvEncoding::Gbk => write!(f, "gbk"),
            CsvEncoding::Utf8 => write!(f, "utf-8"),
            CsvEncoding::Utf8Bom => write!(f, "utf-8-bom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Csv.extension(), Some("csv"));
        assert_eq!(OutputFormat::Xlsx.extension(), Some("xlsx"));
        assert_eq!(OutputFormat::Table.extension(), None);
    }

    #[test]
    fn test_csv_encoding_serde_names() {
        let json = serde_json::to_string(&CsvEncoding::Utf8Bom).unwrap();
        assert_eq!(json, "\"utf-8-bom\"");
        let parsed: CsvEncoding = serde_json::from_str("\"gbk\"").unwrap();
        assert_eq!(parsed, CsvEncoding::Gbk);
    }
}
