//! Reconciliation use case: load, normalize, match

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::{debug, info};
use weighgate_domain::service::{normalize_gate_table, normalize_weigh_table};
use weighgate_domain::{GateIndex, GateRecord, MatchPolicy, MatchResult, Matcher, RawTable, WeighRecord};
use weighgate_infra::load_table;
use weighgate_types::Result;

use crate::config::Config;
use crate::sources::SourcePaths;

/// Both source tables, raw and normalized
#[derive(Debug, Clone)]
pub struct LoadedSources {
    pub weigh_table: RawTable,
    pub gate_table: RawTable,
    pub weighs: Vec<WeighRecord>,
    pub gates: Vec<GateRecord>,
}

/// Load and normalize both tables.
///
/// Missing columns are reported here, before any matching starts.
pub fn load_sources(paths: &SourcePaths, config: &Config) -> Result<LoadedSources> {
    let weigh_table = load_table(&paths.weigh)?;
    let gate_table = load_table(&paths.gate)?;

    let weigh_fields = config.weigh_columns.resolve(&weigh_table)?;
    let gate_fields = config.gate_columns.resolve(&gate_table)?;
    debug!(?weigh_fields, ?gate_fields, "resolved columns");

    let weighs = normalize_weigh_table(&weigh_table, &weigh_fields);
    let gates = normalize_gate_table(&gate_table, &gate_fields);

    let invalid_weigh = weighs.iter().filter(|w| w.weigh_time.is_none()).count();
    let invalid_gate = gates.iter().filter(|g| g.exit_time.is_none()).count();
    info!(
        weighs = weighs.len(),
        gates = gates.len(),
        invalid_weigh_times = invalid_weigh,
        invalid_exit_times = invalid_gate,
        "normalized sources"
    );

    Ok(LoadedSources {
        weigh_table,
        gate_table,
        weighs,
        gates,
    })
}

/// Worker count for a `jobs` setting; 0 means one per CPU
pub fn effective_jobs(jobs: usize) -> usize {
    if jobs == 0 {
        num_cpus::get()
    } else {
        jobs
    }
}

/// Match every weighbridge record on a pool of worker threads.
///
/// Workers pull row indices from a shared counter; results are put back in
/// input order before returning, so `results[i]` always describes
/// `weighs[i]`. `on_progress` is called once per finished row.
pub fn match_parallel<'a, F>(
    weighs: &'a [WeighRecord],
    gates: &'a [GateRecord],
    policy: &MatchPolicy,
    jobs: usize,
    on_progress: F,
) -> Vec<MatchResult<'a>>
where
    F: Fn() + Sync,
{
    let index = GateIndex::build(gates);
    let matcher = Matcher::new(policy.clone());
    let jobs = effective_jobs(jobs).min(weighs.len()).max(1);
    debug!(jobs, plates = index.plate_count(), "matching");

    if jobs == 1 {
        return weighs
            .iter()
            .map(|w| {
                let result = matcher.match_indexed(w, &index);
                on_progress();
                result
            })
            .collect();
    }

    let next_index = AtomicUsize::new(0);
    let collected: Mutex<Vec<(usize, MatchResult<'a>)>> = Mutex::new(Vec::with_capacity(weighs.len()));

    thread::scope(|scope| {
        let (index, matcher, next_index, collected, on_progress) =
            (&index, &matcher, &next_index, &collected, &on_progress);
        for _ in 0..jobs {
            scope.spawn(move || {
                let mut local = Vec::new();
                loop {
                    let idx = next_index.fetch_add(1, Ordering::SeqCst);
                    if idx >= weighs.len() {
                        break;
                    }
                    local.push((idx, matcher.match_indexed(&weighs[idx], index)));
                    on_progress();
                }
                collected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(local);
            });
        }
    });

    let mut collected = collected.into_inner().unwrap_or_else(PoisonError::into_inner);
    collected.sort_by_key(|(idx, _)| *idx);
    collected.into_iter().map(|(_, result)| result).collect()
}
