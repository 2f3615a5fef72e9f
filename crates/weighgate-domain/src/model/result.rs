//! Per-row reconciliation outcome

use serde::Serialize;

use super::record::{GateRecord, WeighRecord};
use super::status::{NameMatch, NameStatus, PlateStatus, WeightStatus};

/// Why a weighbridge row ended up without a gate match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    InvalidWeighTime,
    PlateNotFound,
    NoSubsequentExit,
    /// Only produced under `StalePolicy::Reject`
    TooLate,
}

impl UnmatchedReason {
    pub fn message(&self) -> &'static str {
        match self {
            UnmatchedReason::InvalidWeighTime => "invalid weigh time",
            UnmatchedReason::PlateNotFound => "plate not found in gate log",
            UnmatchedReason::NoSubsequentExit => "no subsequent exit record",
            UnmatchedReason::TooLate => "exit more than 48h after weighing",
        }
    }

    pub fn message_zh(&self) -> &'static str {
        match self {
            UnmatchedReason::InvalidWeighTime => "磅单时间无效",
            UnmatchedReason::PlateNotFound => "门禁无此车牌",
            UnmatchedReason::NoSubsequentExit => "无后续出厂记录",
            UnmatchedReason::TooLate => "时间间隔过长(>48h)",
        }
    }
}

/// A single diagnostic attached to a result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    Unmatched { reason: UnmatchedReason },
    Stale { dwell_minutes: f64 },
    WeightMismatch { weigh: f64, gate: f64 },
    NameMismatch { weigh: String, gate: String },
}

impl Finding {
    pub fn message(&self) -> String {
        match self {
            Finding::Unmatched { reason } => reason.message().to_string(),
            Finding::Stale { dwell_minutes } => {
                format!("exit {:.1}h after weighing (>48h)", dwell_minutes / 60.0)
            }
            Finding::WeightMismatch { weigh, gate } => {
                format!("net weight differs by {:.3} ({} vs {})", (weigh - gate).abs(), weigh, gate)
            }
            Finding::NameMismatch { weigh, gate } => {
                format!("name mismatch: weighbridge '{}' vs gate '{}'", weigh, gate)
            }
        }
    }

    pub fn message_zh(&self) -> String {
        match self {
            Finding::Unmatched { reason } => reason.message_zh().to_string(),
            Finding::Stale { dwell_minutes } => {
                format!("出厂间隔{:.1}小时(>48h)", dwell_minutes / 60.0)
            }
            Finding::WeightMismatch { weigh, gate } => {
                format!("净重相差{:.3}", (weigh - gate).abs())
            }
            Finding::NameMismatch { weigh, gate } => {
                format!("货名不符: 磅单[{}] 门禁[{}]", weigh, gate)
            }
        }
    }
}

/// Annotated outcome for one weighbridge record.
///
/// Borrows both the weighbridge record it describes and, when matched, the
/// chosen gate record; neither is copied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult<'a> {
    pub weigh: &'a WeighRecord,
    pub matched_gate: Option<&'a GateRecord>,
    pub dwell_minutes: Option<f64>,
    pub plate_status: PlateStatus,
    pub weight_status: WeightStatus,
    pub name_status: NameStatus,
    pub name_match: Option<NameMatch>,
    pub findings: Vec<Finding>,
}

impl<'a> MatchResult<'a> {
    /// Terminal result for a row that never reached rule evaluation
    pub fn unmatched(weigh: &'a WeighRecord, reason: UnmatchedReason) -> Self {
        Self {
            weigh,
            matched_gate: None,
            dwell_minutes: None,
            plate_status: PlateStatus::Anomaly,
            weight_status: WeightStatus::Anomaly,
            name_status: NameStatus::Anomaly,
            name_match: None,
            findings: vec![Finding::Unmatched { reason }],
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched_gate.is_some()
    }

    pub fn unmatched_reason(&self) -> Option<UnmatchedReason> {
        self.findings.iter().find_map(|f| match f {
            Finding::Unmatched { reason } => Some(*reason),
            _ => None,
        })
    }

    /// True when every status is ok
    pub fn is_clean(&self) -> bool {
        self.plate_status == PlateStatus::Ok
            && self.weight_status == WeightStatus::Ok
            && self.name_status == NameStatus::Ok
    }

    /// Name status label, distinguishing keyword matches (模糊匹配)
    pub fn name_label(&self) -> &'static str {
        match (&self.name_status, &self.name_match) {
            (NameStatus::Ok, Some(m)) => m.label(),
            (status, _) => status.label(),
        }
    }

    /// English remark, empty when there is nothing to report
    pub fn remark(&self) -> String {
        self.findings
            .iter()
            .map(Finding::message)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn remark_zh(&self) -> String {
        self.findings
            .iter()
            .map(Finding::message_zh)
            .collect::<Vec<_>>()
            .join("；")
    }
}
