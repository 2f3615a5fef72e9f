//! Error types for weighgate

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not decode {path} as UTF-8, GBK or GB18030")]
    Decode { path: String },

    #[error("{table}: missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{0} is empty")]
    EmptyTable(String),

    #[error("Excel export error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message() {
        let err = Error::MissingColumn {
            table: "磅单列表.csv".to_string(),
            column: "车号".to_string(),
        };
        assert_eq!(err.to_string(), "磅单列表.csv: missing required column '车号'");
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::NotFound.into();
        assert!(matches!(err, Error::Config(ConfigError::NotFound)));
    }
}
