//! Reconciliation summary and console report

use serde::{Deserialize, Serialize};

use crate::model::{MatchResult, NameStatus, PlateStatus, UnmatchedReason, WeightStatus};

/// Counts over one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub total: usize,
    pub matched: usize,
    pub clean: usize,
    pub stale: usize,
    pub weight_mismatch: usize,
    pub name_mismatch: usize,
    pub name_fuzzy: usize,
    pub invalid_weigh_time: usize,
    pub plate_not_found: usize,
    pub no_subsequent_exit: usize,
    pub too_late: usize,
}

impl ReconcileSummary {
    pub fn from_results(results: &[MatchResult<'_>]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            if result.is_clean() {
                summary.clean += 1;
            }
            match result.unmatched_reason() {
                Some(UnmatchedReason::InvalidWeighTime) => summary.invalid_weigh_time += 1,
                Some(UnmatchedReason::PlateNotFound) => summary.plate_not_found += 1,
                Some(UnmatchedReason::NoSubsequentExit) => summary.no_subsequent_exit += 1,
                Some(UnmatchedReason::TooLate) => summary.too_late += 1,
                None => {}
            }
            if !result.is_matched() {
                continue;
            }
            summary.matched += 1;
            if result.plate_status == PlateStatus::Stale {
                summary.stale += 1;
            }
            if result.weight_status == WeightStatus::Mismatch {
                summary.weight_mismatch += 1;
            }
            if result.name_status == NameStatus::Mismatch {
                summary.name_mismatch += 1;
            }
            if result.name_match.as_ref().is_some_and(|m| m.is_fuzzy()) {
                summary.name_fuzzy += 1;
            }
        }
        summary
    }

    pub fn unmatched(&self) -> usize {
        self.total - self.matched
    }

    /// Rows with at least one non-ok status
    pub fn issues(&self) -> usize {
        self.total - self.clean
    }
}

pub fn generate_reconcile_report(results: &[MatchResult<'_>]) -> String {
    let summary = ReconcileSummary::from_results(results);

    let mut report = String::new();
    report.push_str("==================================================\n");
    report.push_str("                 磅单门禁对账报告                  \n");
    report.push_str("          Weighbridge / Gate Reconciliation        \n");
    report.push_str("==================================================\n\n");
    report.push_str("【汇总 / Summary】\n");
    report.push_str(&format!("  磅单总数 / Total rows:          {}\n", summary.total));
    report.push_str(&format!("  匹配成功 / Matched:             {}\n", summary.matched));
    report.push_str(&format!("  全部正常 / Clean:               {}\n", summary.clean));
    report.push_str(&format!("  超时(>48h) / Stale:             {}\n", summary.stale));
    report.push_str(&format!("  净重不符 / Weight mismatch:     {}\n", summary.weight_mismatch));
    report.push_str(&format!("  货名不符 / Name mismatch:       {}\n", summary.name_mismatch));
    report.push_str(&format!("  货名模糊匹配 / Fuzzy names:     {}\n", summary.name_fuzzy));
    report.push_str(&format!("  未匹配 / Unmatched:             {}\n", summary.unmatched()));
    if summary.unmatched() > 0 {
        report.push_str(&format!("    磅单时间无效 / Invalid time:  {}\n", summary.invalid_weigh_time));
        report.push_str(&format!("    门禁无此车牌 / No plate:      {}\n", summary.plate_not_found));
        report.push_str(&format!("    无后续出厂 / No later exit:   {}\n", summary.no_subsequent_exit));
        if summary.too_late > 0 {
            report.push_str(&format!("    间隔过长 / Too late:          {}\n", summary.too_late));
        }
    }
    if summary.total > 0 {
        let match_rate = (summary.matched as f64 / summary.total as f64) * 100.0;
        report.push_str(&format!("  匹配率 / Match rate:            {:.1}%\n", match_rate));
    }
    report.push('\n');

    if summary.issues() > 0 {
        report.push_str("【异常明细 / Issues】\n");
        report.push_str("-".repeat(78).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:>5} {:<12} {:>8} {:>8} {:<6} {:<6} {:<8} {}\n",
            "Row", "Plate", "Weigh", "Gate", "车牌", "净重", "货名", "Remark"
        ));
        report.push_str("-".repeat(78).as_str());
        report.push('\n');
        for result in results.iter().filter(|r| !r.is_clean()) {
            let gate_weight = result
                .matched_gate
                .map(|g| format!("{:.2}", g.net_weight))
                .unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "{:>5} {:<12} {:>8.2} {:>8} {:<6} {:<6} {:<8} {}\n",
                result.weigh.row + 1,
                truncate_str(&result.weigh.plate_raw, 11),
                result.weigh.net_weight,
                gate_weight,
                result.plate_status.label(),
                result.weight_status.label(),
                result.name_label(),
                result.remark_zh()
            ));
        }
        report.push('\n');
    } else if summary.total > 0 {
        report.push_str("【全部正常 / All Clear】\n");
        report.push_str("  所有磅单均与门禁记录一致。\n");
        report.push_str("  Every weighbridge row agrees with the gate log.\n\n");
    }

    report.push_str("==================================================\n");
    report
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(2)).collect();
        format!("{}..", truncated)
    } else {
        s.to_string()
    }
}
