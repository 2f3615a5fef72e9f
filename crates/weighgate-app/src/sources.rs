//! Source file discovery and report naming

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use weighgate_types::{Error, Result};

use crate::config::Config;

/// Paths of the two source tables for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub weigh: PathBuf,
    pub gate: PathBuf,
}

const WEIGH_KEYWORD: &str = "磅单";
const GATE_KEYWORD: &str = "门禁";

/// Pick the two source files for a run.
///
/// Explicit paths win. Otherwise the configured file names are looked up in
/// `dir`, and as a last resort the first `.csv` in `dir` whose name contains
/// 磅单 / 门禁.
pub fn resolve_sources(
    weigh: Option<PathBuf>,
    gate: Option<PathBuf>,
    dir: &Path,
    config: &Config,
) -> Result<SourcePaths> {
    let weigh = match weigh {
        Some(path) => path,
        None => locate(dir, &config.weigh_file, WEIGH_KEYWORD)?,
    };
    let gate = match gate {
        Some(path) => path,
        None => locate(dir, &config.gate_file, GATE_KEYWORD)?,
    };

    for path in [&weigh, &gate] {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
    }
    Ok(SourcePaths { weigh, gate })
}

/// Both sources from `dir` alone
pub fn discover_sources(dir: &Path, config: &Config) -> Result<SourcePaths> {
    resolve_sources(None, None, dir, config)
}

fn locate(dir: &Path, file_name: &str, keyword: &str) -> Result<PathBuf> {
    let preferred = dir.join(file_name);
    if preferred.is_file() {
        return Ok(preferred);
    }

    match find_by_keyword(dir, keyword) {
        Some(found) => {
            warn!(
                expected = %preferred.display(),
                found = %found.display(),
                "configured source file missing, using closest match"
            );
            Ok(found)
        }
        None => Err(Error::FileNotFound(preferred.display().to_string())),
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// First CSV directly inside `dir` whose file name contains `keyword`
pub fn find_by_keyword(dir: &Path, keyword: &str) -> Option<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_csv(p))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.contains(keyword))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    debug!(dir = %dir.display(), keyword, candidates = found.len(), "searched for source file");
    found.into_iter().next()
}

/// `path` if nothing exists there yet, else `stem_1.ext`, `stem_2.ext`, ...
///
/// A report left open in Excel is locked on Windows, so a run never
/// overwrites an earlier report.
pub fn next_available_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report")
        .to_string();
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_string);

    (1..)
        .map(|n| {
            let name = match &extension {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            };
            path.with_file_name(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
