//! Source loading for weighbridge and gate tables

pub mod columns;
pub mod csv_table;
pub mod encoding;

pub use columns::{GateColumns, WeighColumns};
pub use csv_table::{clean_header, load_table, parse_table};
pub use encoding::decode_bytes;
