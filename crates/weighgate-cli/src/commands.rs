//! Command implementations

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use weighgate_app::app::{effective_jobs, load_sources, match_parallel};
use weighgate_app::config::{parse_keyword_list, Config};
use weighgate_app::export::{write_report, ReportContext};
use weighgate_app::sources::{next_available_path, resolve_sources};
use weighgate_domain::service::{generate_reconcile_report, ReconcileSummary};
use weighgate_types::{CsvEncoding, OutputFormat, Result};

use crate::cli::{Cli, Commands, StaleArg};

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Reconcile {
            weigh,
            gate,
            dir,
            output,
            encoding,
            stale,
            jobs,
        } => {
            let mut config = Config::load()?;

            // Override from CLI args
            if let Some(format) = cli.format {
                config.output_format = format;
            }
            if let Some(encoding) = encoding {
                config.csv_encoding = encoding;
            }
            if let Some(stale) = stale {
                config.stale_policy = stale.into();
            }
            if let Some(jobs) = jobs {
                config.jobs = jobs;
            }

            cmd_reconcile(&config, weigh, gate, dir, output)
        }
        Commands::Config {
            show,
            set_weigh_file,
            set_gate_file,
            set_output,
            set_encoding,
            set_stale,
            set_keywords,
            set_jobs,
            reset,
        } => cmd_config(ConfigUpdate {
            show,
            set_weigh_file,
            set_gate_file,
            set_output,
            set_encoding,
            set_stale,
            set_keywords,
            set_jobs,
            reset,
        }),
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn cmd_reconcile(
    config: &Config,
    weigh: Option<PathBuf>,
    gate: Option<PathBuf>,
    dir: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    let paths = resolve_sources(weigh, gate, &dir, config)?;
    println!("Weighbridge ledger: {}", paths.weigh.display());
    println!("Gate exit log:      {}", paths.gate.display());

    let loaded = load_sources(&paths, config)?;
    println!(
        "  Loaded {} weighbridge rows, {} gate rows",
        loaded.weighs.len(),
        loaded.gates.len()
    );

    let jobs = effective_jobs(config.jobs);
    debug!(jobs, stale_policy = %config.stale_policy, "starting match");

    let pb = ProgressBar::new(loaded.weighs.len() as u64);
    pb.set_style(progress_style());
    let results = match_parallel(
        &loaded.weighs,
        &loaded.gates,
        &config.match_policy(),
        jobs,
        || pb.inc(1),
    );
    pb.finish_and_clear();

    let summary = ReconcileSummary::from_results(&results);
    println!("{}", generate_reconcile_report(&results));

    if let Some(ext) = config.output_format.extension() {
        let target = output.unwrap_or_else(|| dir.join(format!("{}.{}", config.output_name, ext)));
        let path = next_available_path(&target);
        if path != target {
            info!("{} already exists, writing {} instead", target.display(), path.display());
        }

        let ctx = ReportContext {
            weigh_table: &loaded.weigh_table,
            gate_table: &loaded.gate_table,
            results: &results,
            summary: &summary,
        };
        write_report(config.output_format, &path, &ctx, config.csv_encoding)?;
        println!("Results written to: {}", path.display());
    }

    if summary.issues() > 0 {
        warn!("{} of {} rows need attention", summary.issues(), summary.total);
    }

    Ok(())
}

struct ConfigUpdate {
    show: bool,
    set_weigh_file: Option<String>,
    set_gate_file: Option<String>,
    set_output: Option<OutputFormat>,
    set_encoding: Option<CsvEncoding>,
    set_stale: Option<StaleArg>,
    set_keywords: Option<String>,
    set_jobs: Option<usize>,
    reset: bool,
}

fn cmd_config(update: ConfigUpdate) -> Result<()> {
    if update.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let modified = apply_update(&mut config, &update);

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if update.show || !modified {
        println!("{}", config);
    }

    Ok(())
}

/// Apply `--set-*` flags; returns true when anything changed
fn apply_update(config: &mut Config, update: &ConfigUpdate) -> bool {
    let mut modified = false;

    if let Some(ref name) = update.set_weigh_file {
        config.weigh_file = name.clone();
        modified = true;
    }

    if let Some(ref name) = update.set_gate_file {
        config.gate_file = name.clone();
        modified = true;
    }

    if let Some(format) = update.set_output {
        config.output_format = format;
        modified = true;
    }

    if let Some(encoding) = update.set_encoding {
        config.csv_encoding = encoding;
        modified = true;
    }

    if let Some(stale) = update.set_stale {
        config.stale_policy = stale.into();
        modified = true;
    }

    if let Some(ref keywords) = update.set_keywords {
        let keywords = parse_keyword_list(keywords);
        if keywords.is_empty() {
            warn!("Ignoring empty keyword list");
        } else {
            config.keywords = keywords;
            modified = true;
        }
    }

    if let Some(jobs) = update.set_jobs {
        config.jobs = jobs;
        modified = true;
    }

    modified
}

#[cfg(test)]
mod tests {
    use super::*;
    use weighgate_domain::StalePolicy;

    fn empty_update() -> ConfigUpdate {
        ConfigUpdate {
            show: false,
            set_weigh_file: None,
            set_gate_file: None,
            set_output: None,
            set_encoding: None,
            set_stale: None,
            set_keywords: None,
            set_jobs: None,
            reset: false,
        }
    }

    #[test]
    fn test_apply_update_noop() {
        let mut config = Config::default();
        assert!(!apply_update(&mut config, &empty_update()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_apply_update_sets_fields() {
        let mut config = Config::default();
        let update = ConfigUpdate {
            set_gate_file: Some("门禁3月.csv".to_string()),
            set_encoding: Some(CsvEncoding::Utf8Bom),
            set_stale: Some(StaleArg::Reject),
            set_keywords: Some("焦，煤, 油".to_string()),
            set_jobs: Some(4),
            ..empty_update()
        };
        assert!(apply_update(&mut config, &update));
        assert_eq!(config.gate_file, "门禁3月.csv");
        assert_eq!(config.csv_encoding, CsvEncoding::Utf8Bom);
        assert_eq!(config.stale_policy, StalePolicy::Reject);
        assert_eq!(config.keywords, vec!["焦", "煤", "油"]);
        assert_eq!(config.jobs, 4);
    }

    #[test]
    fn test_empty_keyword_list_is_ignored() {
        let mut config = Config::default();
        let update = ConfigUpdate {
            set_keywords: Some(" , ".to_string()),
            ..empty_update()
        };
        assert!(!apply_update(&mut config, &update));
        assert_eq!(config.keywords, Config::default().keywords);
    }
}
