//! Normalized weighbridge and gate records

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One weighing event from the weighbridge ledger (磅单)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeighRecord {
    pub row: usize,                          // source row position
    pub plate_raw: String,                   // 车号
    pub plate_key: String,                   // join key
    pub weigh_time: Option<NaiveDateTime>,   // 毛重过磅时间, None = invalid
    pub net_weight: f64,                     // 净重
    pub declared_name_primary: String,       // 存货名称
    pub declared_name_secondary: String,     // 规格型号
    pub effective_name: String,
}

/// One exit event from the gate log (门禁)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRecord {
    pub row: usize,
    pub plate_raw: String,                   // 车牌号
    pub plate_key: String,
    pub exit_time_raw: String,               // 出厂时间 as recorded
    pub exit_time: Option<NaiveDateTime>,
    pub net_weight: f64,                     // 运输货物净重
    pub cargo_name: String,                  // 运输货物名称
}
