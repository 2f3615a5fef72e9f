//! Application service layer - config, source discovery, matching runs, export

pub mod app;
pub mod config;
pub mod export;
pub mod sources;
