//! Report export: CSV, Excel and JSON renderings of a reconciliation run

mod csv;
mod excel;
mod json;

pub use self::csv::{encode_report_text, export_to_csv};
pub use self::excel::export_to_excel;
pub use self::json::export_to_json;

use std::path::Path;

use weighgate_domain::model::Severity;
use weighgate_domain::service::ReconcileSummary;
use weighgate_domain::{MatchResult, RawTable};
use weighgate_types::{CsvEncoding, OutputFormat, Result};

/// Columns appended after the original weighbridge columns
pub const RESULT_HEADERS: [&str; 9] = [
    "门禁车牌",
    "门禁出厂时间",
    "门禁净重",
    "门禁货名",
    "停留时长(分钟)",
    "状态_车牌",
    "状态_净重",
    "状态_货名",
    "备注",
];

const GATE_NOT_FOUND: &str = "未找到";

/// One rendered report cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Status { label: String, severity: Severity },
    Empty,
}

impl Cell {
    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Status { label, .. } => label.clone(),
            Cell::Empty => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

/// Tabular report shared by the CSV and Excel writers
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Number of leading columns copied from the weighbridge ledger
    pub source_columns: usize,
}

pub fn build_report_sheet(weigh_table: &RawTable, results: &[MatchResult<'_>]) -> ReportSheet {
    let source_columns = weigh_table.headers.len();
    let mut headers = weigh_table.headers.clone();
    headers.extend(RESULT_HEADERS.iter().map(|h| h.to_string()));

    let rows = results
        .iter()
        .map(|result| {
            let mut cells: Vec<Cell> = weigh_table
                .rows
                .get(result.weigh.row)
                .map(|row| row.iter().map(|c| Cell::Text(c.clone())).collect())
                .unwrap_or_default();
            cells.resize(source_columns, Cell::Empty);

            match result.matched_gate {
                Some(gate) => {
                    cells.push(Cell::Text(gate.plate_raw.clone()));
                    cells.push(Cell::Text(gate.exit_time_raw.clone()));
                    cells.push(Cell::Number(gate.net_weight));
                    cells.push(Cell::Text(gate.cargo_name.clone()));
                }
                None => {
                    cells.push(Cell::Text(GATE_NOT_FOUND.to_string()));
                    cells.extend([Cell::Empty, Cell::Empty, Cell::Empty]);
                }
            }
            cells.push(result.dwell_minutes.map(Cell::Number).unwrap_or(Cell::Empty));
            cells.push(Cell::Status {
                label: result.plate_status.label().to_string(),
                severity: result.plate_status.severity(),
            });
            cells.push(Cell::Status {
                label: result.weight_status.label().to_string(),
                severity: result.weight_status.severity(),
            });
            cells.push(Cell::Status {
                label: result.name_label().to_string(),
                severity: result.name_status.severity(),
            });
            cells.push(Cell::Text(result.remark_zh()));
            cells
        })
        .collect();

    ReportSheet {
        headers,
        rows,
        source_columns,
    }
}

/// Everything a report writer may need from one run
pub struct ReportContext<'r, 'a> {
    pub weigh_table: &'r RawTable,
    pub gate_table: &'r RawTable,
    pub results: &'r [MatchResult<'a>],
    pub summary: &'r ReconcileSummary,
}

/// Write the report in `format` to `path`; `Table` writes nothing
pub fn write_report(
    format: OutputFormat,
    path: &Path,
    ctx: &ReportContext<'_, '_>,
    encoding: CsvEncoding,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let sheet = build_report_sheet(ctx.weigh_table, ctx.results);
            export_to_csv(&sheet, path, encoding).map(|_| ())
        }
        OutputFormat::Xlsx => {
            let sheet = build_report_sheet(ctx.weigh_table, ctx.results);
            export_to_excel(&sheet, ctx.summary, path)
        }
        OutputFormat::Json => export_to_json(ctx, path),
        OutputFormat::Table => Ok(()),
    }
}
