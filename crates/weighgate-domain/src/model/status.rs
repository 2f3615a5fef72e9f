//! Verification outcome labels

use serde::{Deserialize, Serialize};

/// Traffic-light grouping shared by all statuses, used for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Warn,
    Bad,
}

impl Severity {
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Good => "🟢",
            Severity::Warn => "🟡",
            Severity::Bad => "🔴",
        }
    }
}

/// Plate identity outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateStatus {
    Ok,
    /// Matched, but the truck left more than 48h after weighing
    Stale,
    Anomaly,
}

impl PlateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlateStatus::Ok => "ok",
            PlateStatus::Stale => "stale",
            PlateStatus::Anomaly => "anomaly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlateStatus::Ok => "正常",
            PlateStatus::Stale => "超时",
            PlateStatus::Anomaly => "异常",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PlateStatus::Ok => Severity::Good,
            PlateStatus::Stale => Severity::Warn,
            PlateStatus::Anomaly => Severity::Bad,
        }
    }

    pub fn badge(&self) -> String {
        format!("{}{}", self.severity().emoji(), self.label())
    }
}

/// Net weight outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightStatus {
    Ok,
    Mismatch,
    Anomaly,
}

impl WeightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightStatus::Ok => "ok",
            WeightStatus::Mismatch => "mismatch",
            WeightStatus::Anomaly => "anomaly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeightStatus::Ok => "正常",
            WeightStatus::Mismatch => "不符",
            WeightStatus::Anomaly => "异常",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            WeightStatus::Ok => Severity::Good,
            WeightStatus::Mismatch => Severity::Warn,
            WeightStatus::Anomaly => Severity::Bad,
        }
    }

    pub fn badge(&self) -> String {
        format!("{}{}", self.severity().emoji(), self.label())
    }
}

/// Cargo name outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStatus {
    Ok,
    Mismatch,
    Anomaly,
}

impl NameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameStatus::Ok => "ok",
            NameStatus::Mismatch => "mismatch",
            NameStatus::Anomaly => "anomaly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NameStatus::Ok => "正常",
            NameStatus::Mismatch => "不符",
            NameStatus::Anomaly => "异常",
        }
    }

    /// A name mismatch is a hard disagreement, unlike a weight drift
    pub fn severity(&self) -> Severity {
        match self {
            NameStatus::Ok => Severity::Good,
            NameStatus::Mismatch | NameStatus::Anomaly => Severity::Bad,
        }
    }

    pub fn badge(&self) -> String {
        format!("{}{}", self.severity().emoji(), self.label())
    }
}

/// Which part of the name rule accepted the pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "keyword")]
pub enum NameMatch {
    Exact,
    Contains,
    /// Both names share this material keyword
    Keyword(String),
}

impl NameMatch {
    pub fn is_fuzzy(&self) -> bool {
        matches!(self, NameMatch::Keyword(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            NameMatch::Exact | NameMatch::Contains => "正常",
            NameMatch::Keyword(_) => "模糊匹配",
        }
    }
}
