//! Domain model types

pub mod record;
pub mod result;
pub mod status;
pub mod table;

pub use record::{GateRecord, WeighRecord};
pub use result::{Finding, MatchResult, UnmatchedReason};
pub use status::{NameMatch, NameStatus, PlateStatus, Severity, WeightStatus};
pub use table::RawTable;
