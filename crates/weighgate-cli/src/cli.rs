//! CLI definition using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use weighgate_domain::StalePolicy;
use weighgate_types::{CsvEncoding, OutputFormat};

/// What to do with matches whose exit is more than 48h after weighing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StaleArg {
    /// Keep the match, mark it 超时
    Flag,
    /// Report the row as unmatched
    Reject,
}

impl From<StaleArg> for StalePolicy {
    fn from(arg: StaleArg) -> Self {
        match arg {
            StaleArg::Flag => StalePolicy::Flag,
            StaleArg::Reject => StalePolicy::Reject,
        }
    }
}

#[derive(Parser)]
#[command(name = "weighgate")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Reconcile weighbridge slips against gate exit records")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (csv, xlsx, json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match weighbridge slips to gate exits and write the annotated ledger
    Reconcile {
        /// Weighbridge ledger CSV (default: configured name inside --dir)
        #[arg(long)]
        weigh: Option<PathBuf>,

        /// Gate exit log CSV (default: configured name inside --dir)
        #[arg(long)]
        gate: Option<PathBuf>,

        /// Folder searched for source files and receiving the report
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,

        /// Output file for results. Never overwritten; a _N suffix is added instead.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// CSV report encoding. Uses config value if not specified.
        #[arg(long)]
        encoding: Option<CsvEncoding>,

        /// Stale match handling. Uses config value if not specified.
        #[arg(long)]
        stale: Option<StaleArg>,

        /// Number of parallel matching threads. 0 = auto (CPU count).
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set default weighbridge file name
        #[arg(long)]
        set_weigh_file: Option<String>,

        /// Set default gate file name
        #[arg(long)]
        set_gate_file: Option<String>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set default CSV encoding
        #[arg(long)]
        set_encoding: Option<CsvEncoding>,

        /// Set stale match handling
        #[arg(long)]
        set_stale: Option<StaleArg>,

        /// Set fuzzy name keywords, comma separated (e.g. "焦,煤,油")
        #[arg(long)]
        set_keywords: Option<String>,

        /// Set default number of matching threads (0 = auto)
        #[arg(long)]
        set_jobs: Option<usize>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reconcile() {
        let cli = Cli::try_parse_from([
            "weighgate",
            "--format",
            "xlsx",
            "reconcile",
            "--weigh",
            "a.csv",
            "--encoding",
            "utf-8-bom",
            "--stale",
            "reject",
            "-j",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Xlsx));
        match cli.command {
            Commands::Reconcile {
                weigh,
                gate,
                dir,
                encoding,
                stale,
                jobs,
                ..
            } => {
                assert_eq!(weigh, Some(PathBuf::from("a.csv")));
                assert!(gate.is_none());
                assert_eq!(dir, PathBuf::from("."));
                assert_eq!(encoding, Some(CsvEncoding::Utf8Bom));
                assert_eq!(stale.map(StalePolicy::from), Some(StalePolicy::Reject));
                assert_eq!(jobs, Some(2));
            }
            _ => panic!("expected reconcile"),
        }
    }

    #[test]
    fn test_parse_config() {
        let cli = Cli::try_parse_from(["weighgate", "config", "--set-keywords", "焦,煤", "--show"]).unwrap();
        match cli.command {
            Commands::Config {
                show, set_keywords, reset, ..
            } => {
                assert!(show);
                assert!(!reset);
                assert_eq!(set_keywords.as_deref(), Some("焦,煤"));
            }
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
