//! Excel export

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use weighgate_domain::model::Severity;
use weighgate_domain::service::ReconcileSummary;
use weighgate_types::{Error, Result};

use super::{Cell, ReportSheet};

const MAX_COLUMN_WIDTH: usize = 40;

fn excel_err(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

fn severity_format(severity: Severity) -> Format {
    let (fill, font) = match severity {
        Severity::Good => (0xC6EFCE, 0x006100),
        Severity::Warn => (0xFFEB9C, 0x9C5700),
        Severity::Bad => (0xFFC7CE, 0x9C0006),
    };
    Format::new()
        .set_background_color(Color::RGB(fill))
        .set_font_color(Color::RGB(font))
        .set_align(FormatAlign::Center)
}

/// Display width with CJK characters counted double
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// Export the report sheet plus a summary sheet to an .xlsx file
pub fn export_to_excel(sheet: &ReportSheet, summary: &ReconcileSummary, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let details = workbook.add_worksheet();
    write_details_sheet(details, sheet)?;

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, summary)?;

    workbook.save(output_path).map_err(excel_err)?;
    Ok(())
}

fn write_details_sheet(ws: &mut Worksheet, sheet: &ReportSheet) -> Result<()> {
    ws.set_name("对账结果").map_err(excel_err)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2));
    let number_format = Format::new().set_num_format("0.###");
    let formats = [
        severity_format(Severity::Good),
        severity_format(Severity::Warn),
        severity_format(Severity::Bad),
    ];

    let mut widths: Vec<usize> = sheet.headers.iter().map(|h| display_width(h)).collect();

    for (col, header) in sheet.headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, header, &header_format)
            .map_err(excel_err)?;
    }

    for (i, row) in sheet.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Text(text) => {
                    ws.write_string(r, c, text).map_err(excel_err)?;
                }
                Cell::Number(n) => {
                    ws.write_number_with_format(r, c, *n, &number_format)
                        .map_err(excel_err)?;
                }
                Cell::Status { label, severity } => {
                    let format = &formats[*severity as usize];
                    ws.write_string_with_format(r, c, label, format)
                        .map_err(excel_err)?;
                }
                Cell::Empty => {}
            }
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(display_width(&cell.to_text()));
            }
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (*width).min(MAX_COLUMN_WIDTH) + 2;
        ws.set_column_width(col as u16, width as f64).map_err(excel_err)?;
    }
    ws.set_freeze_panes(1, 0).map_err(excel_err)?;

    Ok(())
}

fn write_summary_sheet(ws: &mut Worksheet, summary: &ReconcileSummary) -> Result<()> {
    ws.set_name("汇总").map_err(excel_err)?;

    let header_format = Format::new().set_bold();
    ws.write_string_with_format(0, 0, "磅单门禁对账汇总", &header_format)
        .map_err(excel_err)?;

    let rows: [(&str, usize); 12] = [
        ("磅单总数", summary.total),
        ("匹配成功", summary.matched),
        ("全部正常", summary.clean),
        ("超时(>48h)", summary.stale),
        ("净重不符", summary.weight_mismatch),
        ("货名不符", summary.name_mismatch),
        ("货名模糊匹配", summary.name_fuzzy),
        ("未匹配", summary.unmatched()),
        ("  磅单时间无效", summary.invalid_weigh_time),
        ("  门禁无此车牌", summary.plate_not_found),
        ("  无后续出厂记录", summary.no_subsequent_exit),
        ("  时间间隔过长", summary.too_late),
    ];
    for (i, (label, count)) in rows.iter().enumerate() {
        let r = (i + 2) as u32;
        ws.write_string(r, 0, *label).map_err(excel_err)?;
        ws.write_number(r, 1, *count as f64).map_err(excel_err)?;
    }

    ws.set_column_width(0, 20.0).map_err(excel_err)?;
    ws.set_column_width(1, 10.0).map_err(excel_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("京A1"), 4);
    }

    #[test]
    fn test_export_to_excel_writes_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.xlsx");
        let sheet = ReportSheet {
            headers: vec!["车号".to_string(), "门禁净重".to_string(), "状态_车牌".to_string()],
            rows: vec![
                vec![
                    Cell::Text("京A123".to_string()),
                    Cell::Number(30.01),
                    Cell::Status {
                        label: "正常".to_string(),
                        severity: Severity::Good,
                    },
                ],
                vec![
                    Cell::Text("京B456".to_string()),
                    Cell::Empty,
                    Cell::Status {
                        label: "异常".to_string(),
                        severity: Severity::Bad,
                    },
                ],
            ],
            source_columns: 1,
        };
        let summary = ReconcileSummary {
            total: 2,
            matched: 1,
            clean: 1,
            plate_not_found: 1,
            ..Default::default()
        };

        export_to_excel(&sheet, &summary, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }
}
