//! JSON export

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;
use weighgate_domain::service::ReconcileSummary;
use weighgate_domain::MatchResult;
use weighgate_types::Result;

use super::ReportContext;

#[derive(Serialize)]
struct JsonEntry<'r, 'a> {
    #[serde(flatten)]
    result: &'r MatchResult<'a>,
    remark: String,
    remark_zh: String,
}

#[derive(Serialize)]
struct JsonReport<'r, 'a> {
    generated_at: DateTime<Local>,
    weigh_file: &'r str,
    gate_file: &'r str,
    summary: &'r ReconcileSummary,
    results: Vec<JsonEntry<'r, 'a>>,
}

pub(crate) fn render_json(ctx: &ReportContext<'_, '_>) -> Result<String> {
    let report = JsonReport {
        generated_at: Local::now(),
        weigh_file: &ctx.weigh_table.name,
        gate_file: &ctx.gate_table.name,
        summary: ctx.summary,
        results: ctx
            .results
            .iter()
            .map(|result| JsonEntry {
                result,
                remark: result.remark(),
                remark_zh: result.remark_zh(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Export results and summary as pretty-printed JSON
pub fn export_to_json(ctx: &ReportContext<'_, '_>, path: &Path) -> Result<()> {
    let json = render_json(ctx)?;
    fs::write(path, json)?;
    info!("Wrote {} results to {}", ctx.results.len(), path.display());
    Ok(())
}
