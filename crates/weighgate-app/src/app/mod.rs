//! Application use cases

mod reconcile_service;

pub use reconcile_service::{effective_jobs, load_sources, match_parallel, LoadedSources};
