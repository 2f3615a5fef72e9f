//! Configuration management for weighgate
//!
//! Config stored at: ~/.config/weighgate/config.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use weighgate_domain::{MatchPolicy, StalePolicy};
use weighgate_infra::{GateColumns, WeighColumns};
use weighgate_types::{ConfigError, CsvEncoding, OutputFormat, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Weighbridge ledger file name, looked up in the working directory
    #[serde(default = "default_weigh_file")]
    pub weigh_file: String,

    /// Gate log file name
    #[serde(default = "default_gate_file")]
    pub gate_file: String,

    /// Report file name without extension
    #[serde(default = "default_output_name")]
    pub output_name: String,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub csv_encoding: CsvEncoding,

    #[serde(default)]
    pub weigh_columns: WeighColumns,

    #[serde(default)]
    pub gate_columns: GateColumns,

    /// Material keywords for fuzzy cargo name matching
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub stale_policy: StalePolicy,

    /// Matching threads. 0 = CPU count
    #[serde(default)]
    pub jobs: usize,
}

fn default_weigh_file() -> String {
    "磅单列表.csv".to_string()
}

fn default_gate_file() -> String {
    "门禁数据.csv".to_string()
}

fn default_output_name() -> String {
    "最终对账结果".to_string()
}

fn default_keywords() -> Vec<String> {
    MatchPolicy::default().keywords
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weigh_file: default_weigh_file(),
            gate_file: default_gate_file(),
            output_name: default_output_name(),
            output_format: OutputFormat::default(),
            csv_encoding: CsvEncoding::default(),
            weigh_columns: WeighColumns::default(),
            gate_columns: GateColumns::default(),
            keywords: default_keywords(),
            stale_policy: StalePolicy::default(),
            jobs: 0,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("weighgate");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)).into())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy::new()
            .with_keywords(self.keywords.iter().cloned())
            .with_stale_policy(self.stale_policy)
    }
}

/// Split a keyword list typed on the command line ("焦,煤" or "焦，煤")
pub fn parse_keyword_list(s: &str) -> Vec<String> {
    s.split([',', '，'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Weighgate Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Weighbridge file: {}", self.weigh_file)?;
        writeln!(f, "Gate file:        {}", self.gate_file)?;
        writeln!(f, "Output name:      {}", self.output_name)?;
        writeln!(f, "Output format:    {}", self.output_format)?;
        writeln!(f, "CSV encoding:     {}", self.csv_encoding)?;
        writeln!(f, "Stale policy:     {}", self.stale_policy)?;
        writeln!(f, "Keywords:         {}", self.keywords.join(" "))?;
        writeln!(
            f,
            "Jobs:             {}",
            if self.jobs == 0 {
                "auto".to_string()
            } else {
                self.jobs.to_string()
            }
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Weighbridge columns: plate={} name={} spec={} weight={} time={}",
            self.weigh_columns.plate,
            self.weigh_columns.name,
            self.weigh_columns.spec,
            self.weigh_columns.weight,
            self.weigh_columns.time
        )?;
        writeln!(
            f,
            "Gate columns:        plate={} name={} weight={} time={}",
            self.gate_columns.plate,
            self.gate_columns.name,
            self.gate_columns.weight,
            self.gate_columns.time
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:      {}", path.display())?;
        }

        Ok(())
    }
}
