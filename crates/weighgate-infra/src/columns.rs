//! Column name mapping for both source tables

use serde::{Deserialize, Serialize};
use weighgate_domain::service::{GateFieldIndex, WeighFieldIndex};
use weighgate_domain::RawTable;
use weighgate_types::{Error, Result};

use crate::csv_table::clean_header;

/// Header names in the weighbridge ledger (磅单列表)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeighColumns {
    pub plate: String,
    pub name: String,
    pub spec: String,
    pub weight: String,
    pub time: String,
}

impl Default for WeighColumns {
    fn default() -> Self {
        Self {
            plate: "车号".to_string(),
            name: "存货名称".to_string(),
            spec: "规格型号".to_string(),
            weight: "净重".to_string(),
            time: "毛重过磅时间".to_string(),
        }
    }
}

impl WeighColumns {
    /// Plate, weight and time are required; the two name columns may be absent
    pub fn resolve(&self, table: &RawTable) -> Result<WeighFieldIndex> {
        Ok(WeighFieldIndex {
            plate: require(table, &self.plate)?,
            time: require(table, &self.time)?,
            weight: require(table, &self.weight)?,
            name: table.column_index(&clean_header(&self.name)),
            spec: table.column_index(&clean_header(&self.spec)),
        })
    }
}

/// Header names in the gate log (门禁数据)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateColumns {
    pub plate: String,
    pub name: String,
    pub weight: String,
    pub time: String,
}

impl Default for GateColumns {
    fn default() -> Self {
        Self {
            plate: "车牌号".to_string(),
            name: "运输货物名称".to_string(),
            weight: "运输货物净重".to_string(),
            time: "出厂时间".to_string(),
        }
    }
}

impl GateColumns {
    pub fn resolve(&self, table: &RawTable) -> Result<GateFieldIndex> {
        Ok(GateFieldIndex {
            plate: require(table, &self.plate)?,
            time: require(table, &self.time)?,
            weight: require(table, &self.weight)?,
            name: require(table, &self.name)?,
        })
    }
}

fn require(table: &RawTable, column: &str) -> Result<usize> {
    table
        .column_index(&clean_header(column))
        .ok_or_else(|| Error::MissingColumn {
            table: table.name.clone(),
            column: column.to_string(),
        })
}
