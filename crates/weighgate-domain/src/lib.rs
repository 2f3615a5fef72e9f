//! Weighbridge / gate reconciliation core
//!
//! Pure crate: receives already-loaded tables, returns annotated results.
//! No file or console IO happens here.

pub mod model;
pub mod service;

pub use model::{GateRecord, MatchResult, RawTable, WeighRecord};
pub use service::matcher::{reconcile, GateIndex, MatchPolicy, Matcher, StalePolicy};
