//! Row normalization: raw table cells into typed records
//!
//! Nothing in here fails. Malformed cells degrade to `None` timestamps and
//! zero weights so the matcher can treat them as ordinary data.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::{GateRecord, RawTable, WeighRecord};

/// Column positions for the weighbridge ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeighFieldIndex {
    pub plate: usize,
    pub time: usize,
    pub weight: usize,
    /// 存货名称; absent columns read as empty
    pub name: Option<usize>,
    /// 规格型号
    pub spec: Option<usize>,
}

/// Column positions for the gate log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateFieldIndex {
    pub plate: usize,
    pub time: usize,
    pub weight: usize,
    pub name: usize,
}

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Map full-width ASCII variants (Ｕ+FF01..Ｕ+FF5E) and the ideographic
/// space to their half-width forms
fn fold_width(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

fn is_invisible(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// Best-effort timestamp parsing; `None` marks an invalid value
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let folded = fold_width(s);
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (date_part, time_part) = trimmed
        .split_once(|c: char| c == 'T' || c.is_whitespace())
        .map(|(date, time)| (date, time.trim()))
        .unwrap_or((trimmed, ""));

    // 2024年1月1日 / 2024/01/01 / 2024.01.01 all become 2024-1-1
    let date_text: String = date_part
        .chars()
        .filter(|c| *c != '日')
        .map(|c| match c {
            '/' | '.' | '年' | '月' => '-',
            _ => c,
        })
        .collect();
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").ok()?;

    if time_part.is_empty() {
        return date.and_hms_opt(0, 0, 0);
    }

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time_part, fmt).ok())
        .map(|time| date.and_time(time))
}

/// Best-effort weight parsing; unparseable, non-finite or negative input is 0
pub fn parse_weight(s: &str) -> f64 {
    let folded = fold_width(s);
    let cleaned: String = folded
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned
        .trim_end_matches('吨')
        .trim_end_matches(['t', 'T']);

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

/// Canonical join key: no whitespace of any width, uppercase
pub fn plate_key(plate: &str) -> String {
    fold_width(plate)
        .chars()
        .filter(|c| !is_invisible(*c))
        .collect::<String>()
        .to_uppercase()
}

fn is_numeric_code(s: &str) -> bool {
    let digits = s.replace('.', "");
    !digits.is_empty()
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || ('０'..='９').contains(&c))
}

/// The weighbridge cargo name to compare against the gate.
///
/// Some ledgers put an inventory code in 存货名称 and the readable name in
/// 规格型号, so a blank, "nan" or numeric primary name falls back to the
/// secondary one.
pub fn effective_name(primary: &str, secondary: &str) -> String {
    let primary = primary.trim();
    if primary.is_empty() || primary.eq_ignore_ascii_case("nan") || is_numeric_code(primary) {
        secondary.trim().to_string()
    } else {
        primary.to_string()
    }
}

pub fn normalize_weigh_table(table: &RawTable, fields: &WeighFieldIndex) -> Vec<WeighRecord> {
    (0..table.len())
        .map(|row| {
            let plate_raw = table.cell(row, fields.plate).trim().to_string();
            let primary = table.cell_opt(row, fields.name).trim().to_string();
            let secondary = table.cell_opt(row, fields.spec).trim().to_string();
            WeighRecord {
                row,
                plate_key: plate_key(&plate_raw),
                plate_raw,
                weigh_time: parse_timestamp(table.cell(row, fields.time)),
                net_weight: parse_weight(table.cell(row, fields.weight)),
                effective_name: effective_name(&primary, &secondary),
                declared_name_primary: primary,
                declared_name_secondary: secondary,
            }
        })
        .collect()
}

pub fn normalize_gate_table(table: &RawTable, fields: &GateFieldIndex) -> Vec<GateRecord> {
    (0..table.len())
        .map(|row| {
            let plate_raw = table.cell(row, fields.plate).trim().to_string();
            let exit_time_raw = table.cell(row, fields.time).trim().to_string();
            GateRecord {
                row,
                plate_key: plate_key(&plate_raw),
                plate_raw,
                exit_time: parse_timestamp(&exit_time_raw),
                exit_time_raw,
                net_weight: parse_weight(table.cell(row, fields.weight)),
                cargo_name: table.cell(row, fields.name).trim().to_string(),
            }
        })
        .collect()
}
