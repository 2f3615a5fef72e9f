//! Weighbridge to gate matching and verification

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::{
    Finding, GateRecord, MatchResult, NameMatch, NameStatus, PlateStatus, UnmatchedReason,
    WeighRecord, WeightStatus,
};

/// Largest accepted net weight difference, in ledger units (tonnes)
pub const WEIGHT_TOLERANCE: f64 = 0.02;

/// Dwell time beyond which a match is considered stale (48h)
pub const STALE_AFTER_MINUTES: f64 = 2880.0;

/// Absorbs binary rounding so that a 0.02 difference between decimal inputs
/// stays on the inclusive side of the tolerance
const WEIGHT_EPSILON: f64 = 1e-9;

/// Material-category keywords: coke, coal, oil, acid, alkali, salt, benzene
pub const DEFAULT_KEYWORDS: [&str; 7] = ["焦", "煤", "油", "酸", "碱", "盐", "苯"];

/// What to do with a match whose dwell time exceeds the staleness cutoff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Keep the match, mark the plate status stale
    #[default]
    Flag,
    /// Drop the match and report the row as unmatched
    Reject,
}

impl std::fmt::Display for StalePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StalePolicy::Flag => write!(f, "flag"),
            StalePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Tunable inputs of the matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Fuzzy name vocabulary, checked in order
    pub keywords: Vec<String>,
    pub stale_policy: StalePolicy,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            stale_policy: StalePolicy::default(),
        }
    }
}

impl MatchPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stale_policy(mut self, stale_policy: StalePolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }
}

/// Gate records grouped by plate key, table order preserved.
///
/// Records with an invalid exit time are left out; they can never be chosen.
/// A blank plate is an ordinary key and matches other blank plates.
#[derive(Debug, Default)]
pub struct GateIndex<'a> {
    by_plate: HashMap<&'a str, Vec<&'a GateRecord>>,
}

impl<'a> GateIndex<'a> {
    pub fn build(gates: &'a [GateRecord]) -> Self {
        let mut by_plate: HashMap<&'a str, Vec<&'a GateRecord>> = HashMap::new();
        for gate in gates {
            if is_candidate(gate) {
                by_plate.entry(gate.plate_key.as_str()).or_default().push(gate);
            }
        }
        Self { by_plate }
    }

    pub fn candidates(&self, plate_key: &str) -> &[&'a GateRecord] {
        self.by_plate
            .get(plate_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct plates with at least one usable exit
    pub fn plate_count(&self) -> usize {
        self.by_plate.len()
    }
}

fn is_candidate(gate: &GateRecord) -> bool {
    gate.exit_time.is_some()
}

/// Weight rule, inclusive at the tolerance
pub fn check_weight(weigh: f64, gate: f64) -> WeightStatus {
    if (weigh - gate).abs() <= WEIGHT_TOLERANCE + WEIGHT_EPSILON {
        WeightStatus::Ok
    } else {
        WeightStatus::Mismatch
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Default)]
pub struct Matcher {
    policy: MatchPolicy,
}

impl Matcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Match one weighbridge record against the whole gate table
    pub fn match_one<'a>(&self, weigh: &'a WeighRecord, gate_pool: &'a [GateRecord]) -> MatchResult<'a> {
        let Some(weigh_time) = weigh.weigh_time else {
            return MatchResult::unmatched(weigh, UnmatchedReason::InvalidWeighTime);
        };
        let same_plate = gate_pool
            .iter()
            .filter(|g| is_candidate(g) && g.plate_key == weigh.plate_key);
        self.resolve(weigh, weigh_time, same_plate)
    }

    /// Same as [`Matcher::match_one`], using a prebuilt plate index
    pub fn match_indexed<'a>(&self, weigh: &'a WeighRecord, index: &GateIndex<'a>) -> MatchResult<'a> {
        let Some(weigh_time) = weigh.weigh_time else {
            return MatchResult::unmatched(weigh, UnmatchedReason::InvalidWeighTime);
        };
        self.resolve(weigh, weigh_time, index.candidates(&weigh.plate_key).iter().copied())
    }

    /// Pick the earliest exit at or after the weighing, then run the rules.
    ///
    /// `same_plate` must only yield records with the weigh plate key and a
    /// valid exit time, in gate table order.
    fn resolve<'a, I>(&self, weigh: &'a WeighRecord, weigh_time: NaiveDateTime, same_plate: I) -> MatchResult<'a>
    where
        I: IntoIterator<Item = &'a GateRecord>,
    {
        let mut plate_seen = false;
        let mut best: Option<(&'a GateRecord, chrono::Duration)> = None;

        for gate in same_plate {
            plate_seen = true;
            let Some(exit_time) = gate.exit_time else {
                continue;
            };
            if exit_time < weigh_time {
                continue;
            }
            let diff = exit_time - weigh_time;
            // strict comparison keeps the first record on ties
            if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                best = Some((gate, diff));
            }
        }

        if !plate_seen {
            return MatchResult::unmatched(weigh, UnmatchedReason::PlateNotFound);
        }
        let Some((gate, diff)) = best else {
            return MatchResult::unmatched(weigh, UnmatchedReason::NoSubsequentExit);
        };

        let dwell_minutes = round_one_decimal(diff.num_milliseconds() as f64 / 60_000.0);
        let mut findings = Vec::new();

        let plate_status = if dwell_minutes > STALE_AFTER_MINUTES {
            if self.policy.stale_policy == StalePolicy::Reject {
                return MatchResult::unmatched(weigh, UnmatchedReason::TooLate);
            }
            findings.push(Finding::Stale { dwell_minutes });
            PlateStatus::Stale
        } else {
            PlateStatus::Ok
        };

        let weight_status = check_weight(weigh.net_weight, gate.net_weight);
        if weight_status == WeightStatus::Mismatch {
            findings.push(Finding::WeightMismatch {
                weigh: weigh.net_weight,
                gate: gate.net_weight,
            });
        }

        let name_match = self.check_name(&weigh.effective_name, &gate.cargo_name);
        let name_status = if name_match.is_some() {
            NameStatus::Ok
        } else {
            findings.push(Finding::NameMismatch {
                weigh: weigh.effective_name.clone(),
                gate: gate.cargo_name.clone(),
            });
            NameStatus::Mismatch
        };

        MatchResult {
            weigh,
            matched_gate: Some(gate),
            dwell_minutes: Some(dwell_minutes),
            plate_status,
            weight_status,
            name_status,
            name_match,
            findings,
        }
    }

    /// Name rule: equality, containment either way, then shared keyword.
    ///
    /// An empty name only matches another empty name; containment is not
    /// taken from the empty string.
    pub fn check_name(&self, p_name: &str, m_name: &str) -> Option<NameMatch> {
        if p_name == m_name {
            return Some(NameMatch::Exact);
        }
        if p_name.is_empty() || m_name.is_empty() {
            return None;
        }
        if p_name.contains(m_name) || m_name.contains(p_name) {
            return Some(NameMatch::Contains);
        }
        self.policy
            .keywords
            .iter()
            .find(|kw| !kw.is_empty() && p_name.contains(kw.as_str()) && m_name.contains(kw.as_str()))
            .map(|kw| NameMatch::Keyword(kw.clone()))
    }
}

/// Match every weighbridge record; `results[i]` describes `weighs[i]`
pub fn reconcile<'a>(
    weighs: &'a [WeighRecord],
    gates: &'a [GateRecord],
    policy: &MatchPolicy,
) -> Vec<MatchResult<'a>> {
    let index = GateIndex::build(gates);
    let matcher = Matcher::new(policy.clone());
    weighs.iter().map(|w| matcher.match_indexed(w, &index)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::normalizer::{effective_name, parse_timestamp, plate_key};

    fn weigh(plate: &str, time: &str, weight: f64, name: &str) -> WeighRecord {
        WeighRecord {
            row: 0,
            plate_raw: plate.to_string(),
            plate_key: plate_key(plate),
            weigh_time: parse_timestamp(time),
            net_weight: weight,
            declared_name_primary: name.to_string(),
            declared_name_secondary: String::new(),
            effective_name: effective_name(name, ""),
        }
    }

    fn gate(row: usize, plate: &str, time: &str, weight: f64, name: &str) -> GateRecord {
        GateRecord {
            row,
            plate_raw: plate.to_string(),
            plate_key: plate_key(plate),
            exit_time_raw: time.to_string(),
            exit_time: parse_timestamp(time),
            net_weight: weight,
            cargo_name: name.to_string(),
        }
    }

    fn matcher() -> Matcher {
        Matcher::new(MatchPolicy::default())
    }

    #[test]
    fn test_worked_example_substring_match() {
        let w = weigh("京A123 ", "2024-01-01 08:00", 30.00, "焦炭");
        let gates = vec![gate(0, "京A123", "2024-01-01 10:00", 30.01, "焦炭粉")];
        let result = matcher().match_one(&w, &gates);

        assert_eq!(result.matched_gate.map(|g| g.row), Some(0));
        assert_eq!(result.dwell_minutes, Some(120.0));
        assert_eq!(result.plate_status, PlateStatus::Ok);
        assert_eq!(result.weight_status, WeightStatus::Ok);
        assert_eq!(result.name_status, NameStatus::Ok);
        assert_eq!(result.name_match, Some(NameMatch::Contains));
        assert_eq!(result.remark(), "");
        assert!(result.is_clean());
    }

    #[test]
    fn test_exit_before_weighing_is_no_subsequent_exit() {
        let w = weigh("京A123 ", "2024-01-01 08:00", 30.00, "焦炭");
        let gates = vec![gate(0, "京A123", "2023-12-30 08:00", 30.01, "焦炭粉")];
        let result = matcher().match_one(&w, &gates);

        assert!(!result.is_matched());
        assert_eq!(result.unmatched_reason(), Some(UnmatchedReason::NoSubsequentExit));
        assert_eq!(result.remark(), "no subsequent exit record");
        assert_eq!(result.plate_status, PlateStatus::Anomaly);
        assert_eq!(result.weight_status, WeightStatus::Anomaly);
        assert_eq!(result.name_status, NameStatus::Anomaly);
    }

    #[test]
    fn test_invalid_weigh_time_is_terminal() {
        let w = weigh("京A123", "not a time", 30.0, "焦炭");
        let gates = vec![gate(0, "京A123", "2024-01-01 10:00", 30.0, "焦炭")];
        let result = matcher().match_one(&w, &gates);

        assert!(!result.is_matched());
        assert_eq!(result.remark(), "invalid weigh time");
        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn test_plate_not_found_regardless_of_other_gates() {
        let w = weigh("京B999", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![
            gate(0, "京A123", "2024-01-01 09:00", 30.0, "焦炭"),
            gate(1, "京C456", "2024-01-01 09:30", 30.0, "焦炭"),
        ];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.unmatched_reason(), Some(UnmatchedReason::PlateNotFound));
        assert_eq!(result.remark(), "plate not found in gate log");
    }

    #[test]
    fn test_same_plate_with_only_invalid_exit_times_is_not_found() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![gate(0, "京A123", "", 30.0, "焦炭")];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.unmatched_reason(), Some(UnmatchedReason::PlateNotFound));
    }

    #[test]
    fn test_blank_plates_match_each_other() {
        let w = weigh(" ", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![
            gate(0, "京A123", "2024-01-01 08:30", 30.0, "焦炭"),
            gate(1, "", "2024-01-01 09:00", 30.0, "焦炭"),
        ];
        assert_eq!(w.plate_key, gates[1].plate_key);

        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.matched_gate.map(|g| g.row), Some(1));
        assert_eq!(result.dwell_minutes, Some(60.0));
        assert_eq!(result.remark(), "");

        let index = GateIndex::build(&gates);
        assert_eq!(matcher().match_indexed(&w, &index), result);
    }

    #[test]
    fn test_blank_plate_without_blank_gate_is_not_found() {
        let w = weigh("", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![gate(0, "京A123", "2024-01-01 09:00", 30.0, "焦炭")];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.unmatched_reason(), Some(UnmatchedReason::PlateNotFound));
    }

    #[test]
    fn test_chooses_minimum_difference() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![
            gate(0, "京A123", "2024-01-01 07:59", 30.0, "焦炭"),
            gate(1, "京A123", "2024-01-01 12:00", 30.0, "焦炭"),
            gate(2, "京A123", "2024-01-01 09:15", 30.0, "焦炭"),
            gate(3, "京A123", "2024-01-02 08:00", 30.0, "焦炭"),
        ];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.matched_gate.map(|g| g.row), Some(2));
        assert_eq!(result.dwell_minutes, Some(75.0));
    }

    #[test]
    fn test_tie_goes_to_first_gate_row() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![
            gate(0, "京A123", "2024-01-01 11:00", 30.0, "焦炭"),
            gate(1, "京A123", "2024-01-01 10:00", 29.0, "焦炭"),
            gate(2, "京A123", "2024-01-01 10:00", 30.0, "焦炭"),
        ];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.matched_gate.map(|g| g.row), Some(1));
        assert_eq!(result.weight_status, WeightStatus::Mismatch);
    }

    #[test]
    fn test_exit_at_weigh_time_is_eligible() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![gate(0, "京A123", "2024-01-01 08:00", 30.0, "焦炭")];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.dwell_minutes, Some(0.0));
        assert_eq!(result.plate_status, PlateStatus::Ok);
    }

    #[test]
    fn test_dwell_rounded_to_one_decimal() {
        let w = weigh("京A123", "2024-01-01 08:00:00", 30.0, "焦炭");
        let gates = vec![gate(0, "京A123", "2024-01-01 08:01:20", 30.0, "焦炭")];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.dwell_minutes, Some(1.3));
    }

    #[test]
    fn test_stale_threshold() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭");

        let at_limit = vec![gate(0, "京A123", "2024-01-03 08:00", 30.0, "焦炭")];
        let result = matcher().match_one(&w, &at_limit);
        assert_eq!(result.dwell_minutes, Some(2880.0));
        assert_eq!(result.plate_status, PlateStatus::Ok);

        let past_limit = vec![gate(0, "京A123", "2024-01-03 08:01", 30.0, "焦炭")];
        let result = matcher().match_one(&w, &past_limit);
        assert!(result.is_matched());
        assert_eq!(result.plate_status, PlateStatus::Stale);
        // rules still run on a stale match
        assert_eq!(result.weight_status, WeightStatus::Ok);
        assert_eq!(result.name_status, NameStatus::Ok);
        assert_eq!(result.remark(), "exit 48.0h after weighing (>48h)");
    }

    #[test]
    fn test_stale_reject_policy_drops_match() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭");
        let gates = vec![gate(0, "京A123", "2024-01-04 08:00", 30.0, "焦炭")];
        let matcher = Matcher::new(MatchPolicy::new().with_stale_policy(StalePolicy::Reject));
        let result = matcher.match_one(&w, &gates);
        assert!(!result.is_matched());
        assert_eq!(result.unmatched_reason(), Some(UnmatchedReason::TooLate));
        assert_eq!(result.plate_status, PlateStatus::Anomaly);
        assert_eq!(result.dwell_minutes, None);
    }

    #[test]
    fn test_weight_tolerance_is_inclusive() {
        assert_eq!(check_weight(30.00, 30.02), WeightStatus::Ok);
        assert_eq!(check_weight(30.05, 30.03), WeightStatus::Ok);
        assert_eq!(check_weight(30.00, 29.98), WeightStatus::Ok);
        assert_eq!(check_weight(30.00, 30.05), WeightStatus::Mismatch);
        assert_eq!(check_weight(30.00, 30.021), WeightStatus::Mismatch);
    }

    #[test]
    fn test_weight_mismatch_example() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.00, "焦炭");
        let gates = vec![gate(0, "京A123", "2024-01-01 10:00", 30.05, "焦炭")];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.weight_status, WeightStatus::Mismatch);
        assert_eq!(result.plate_status, PlateStatus::Ok);
        assert!(result.remark().contains("net weight differs by 0.050"));
    }

    #[test]
    fn test_name_mismatch_example() {
        let w = weigh("京A123", "2024-01-01 08:00", 30.00, "铁矿石");
        let gates = vec![gate(0, "京A123", "2024-01-01 10:00", 30.00, "焦炭")];
        let result = matcher().match_one(&w, &gates);
        assert_eq!(result.name_status, NameStatus::Mismatch);
        assert_eq!(result.name_match, None);
        assert_eq!(
            result.remark(),
            "name mismatch: weighbridge '铁矿石' vs gate '焦炭'"
        );
    }

    #[test]
    fn test_name_rule() {
        let m = matcher();
        assert_eq!(m.check_name("焦炭", "焦炭"), Some(NameMatch::Exact));
        assert_eq!(m.check_name("焦炭粉", "焦炭"), Some(NameMatch::Contains));
        assert_eq!(m.check_name("冶金焦", "焦粒"), Some(NameMatch::Keyword("焦".to_string())));
        assert_eq!(m.check_name("原煤", "洗精煤"), Some(NameMatch::Keyword("煤".to_string())));
        assert_eq!(m.check_name("铁矿石", "焦炭"), None);
        assert_eq!(m.check_name("", ""), Some(NameMatch::Exact));
        assert_eq!(m.check_name("", "焦炭"), None);
        assert_eq!(m.check_name("焦炭", ""), None);
    }

    #[test]
    fn test_name_rule_is_case_sensitive() {
        assert_eq!(matcher().check_name("abc", "ABC"), None);
    }

    #[test]
    fn test_injected_keywords_replace_defaults() {
        let m = Matcher::new(MatchPolicy::new().with_keywords(["矿"]));
        assert_eq!(m.check_name("铁矿石", "矿粉"), Some(NameMatch::Keyword("矿".to_string())));
        assert_eq!(m.check_name("冶金焦", "焦粒"), None);
    }

    #[test]
    fn test_keyword_order_decides_reported_keyword() {
        let m = matcher();
        assert_eq!(m.check_name("焦煤A", "焦煤B"), Some(NameMatch::Keyword("焦".to_string())));
    }

    #[test]
    fn test_reconcile_preserves_cardinality_and_order() {
        let weighs = vec![
            weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭"),
            weigh("京B999", "2024-01-01 08:00", 30.0, "焦炭"),
            weigh("京A123", "", 30.0, "焦炭"),
            weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭"),
        ];
        let gates = vec![gate(0, "京A123", "2024-01-01 09:00", 30.0, "焦炭")];
        let results = reconcile(&weighs, &gates, &MatchPolicy::default());

        assert_eq!(results.len(), weighs.len());
        for (result, w) in results.iter().zip(&weighs) {
            assert!(std::ptr::eq(result.weigh, w));
        }
        // one gate record may serve several weighbridge rows
        assert!(results[0].is_matched());
        assert_eq!(results[1].unmatched_reason(), Some(UnmatchedReason::PlateNotFound));
        assert_eq!(results[2].unmatched_reason(), Some(UnmatchedReason::InvalidWeighTime));
        assert!(results[3].is_matched());
    }

    #[test]
    fn test_index_agrees_with_linear_scan() {
        let weighs = vec![
            weigh("京A123", "2024-01-01 08:00", 30.0, "焦炭"),
            weigh("京A123", "2024-01-02 08:00", 30.0, "原煤"),
            weigh("京B456", "2024-01-01 08:00", 12.0, "硫酸"),
            weigh("京C789", "2024-01-01 08:00", 12.0, "盐"),
            weigh("京B456", "2024-01-05 08:00", 12.0, "硫酸"),
        ];
        let gates = vec![
            gate(0, "京A123", "2024-01-01 09:00", 30.0, "焦炭"),
            gate(1, "京B456", "2024-01-01 07:00", 12.0, "硫酸"),
            gate(2, "京A123", "2024-01-02 09:00", 30.1, "洗煤"),
            gate(3, "京B456", "bad", 12.0, "硫酸"),
            gate(4, "京B456", "2024-01-01 13:00", 12.0, "浓硫酸"),
        ];
        let m = matcher();
        let index = GateIndex::build(&gates);
        assert_eq!(index.plate_count(), 2);
        for w in &weighs {
            assert_eq!(m.match_one(w, &gates), m.match_indexed(w, &index));
        }
    }
}
