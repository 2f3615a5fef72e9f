//! Domain services

pub mod matcher;
pub mod normalizer;
pub mod report;

pub use matcher::{
    check_weight, reconcile, GateIndex, MatchPolicy, Matcher, StalePolicy, DEFAULT_KEYWORDS,
    STALE_AFTER_MINUTES, WEIGHT_TOLERANCE,
};
pub use normalizer::{
    effective_name, normalize_gate_table, normalize_weigh_table, parse_timestamp, parse_weight,
    plate_key, GateFieldIndex, WeighFieldIndex,
};
pub use report::{generate_reconcile_report, ReconcileSummary};
