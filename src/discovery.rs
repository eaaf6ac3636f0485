//! Locating the run and snapshot the training framework produced last.
//!
//! Both lookups mirror the conventions of the framework's existing tooling:
//! run ids are compared by the integer formed from *all* digits in the
//! directory name, and snapshots are compared by plain lexicographic order of
//! their entry names. Snapshot names are expected to be zero-padded; a warning
//! is logged when a listing mixes digit widths.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Concatenation of every ASCII digit in `name`, in order.
pub fn digits_of(name: &str) -> String {
    name.chars().filter(char::is_ascii_digit).collect()
}

/// Returns `<prefix>-<n>` for the run subdirectory with the largest numeric id.
pub fn latest_run(models_root: &Path, prefix: &str) -> Result<String> {
    let names = list_names(models_root, true)?;
    let id = max_run_id(&names).ok_or_else(|| PipelineError::EmptyListing(models_root.to_path_buf()))?;
    let run = format!("{prefix}-{id}");
    debug!(root = %models_root.display(), candidates = names.len(), %run, "latest run");
    Ok(run)
}

/// Returns the digits of the lexicographically last entry in `run_dir`.
pub fn latest_snapshot(run_dir: &Path) -> Result<String> {
    let names = list_names(run_dir, false)?;
    let last = last_lexicographic(&names)
        .ok_or_else(|| PipelineError::EmptyListing(run_dir.to_path_buf()))?;
    let snapshot = digits_of(last);
    if snapshot.is_empty() {
        return Err(PipelineError::MalformedName(last.to_string()));
    }
    debug!(run_dir = %run_dir.display(), entry = %last, %snapshot, "latest snapshot");
    Ok(snapshot)
}

/// Largest numeric id among `names`; names without digits are skipped.
pub fn max_run_id<S: AsRef<str>>(names: &[S]) -> Option<u128> {
    let mut best: Option<u128> = None;
    for name in names {
        let name = name.as_ref();
        let digits = digits_of(name);
        let Ok(id) = digits.parse::<u128>() else {
            warn!(entry = %name, "skip run dir without numeric id");
            continue;
        };
        best = Some(best.map_or(id, |b| b.max(id)));
    }
    best
}

/// Last name in byte-wise lexicographic order.
pub fn last_lexicographic<S: AsRef<str>>(names: &[S]) -> Option<&str> {
    let widths: std::collections::BTreeSet<usize> = names
        .iter()
        .map(|n| digits_of(n.as_ref()).len())
        .collect();
    if widths.len() > 1 {
        warn!(
            ?widths,
            "snapshot names have mixed digit widths; lexicographic order may not be numeric order"
        );
    }
    names.iter().map(|n| n.as_ref()).max()
}

fn list_names(dir: &Path, dirs_only: bool) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingPath(dir.to_path_buf()));
    }
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if dirs_only && !entry.file_type()?.is_dir() {
            continue;
        }
        out.push(entry.file_name().to_string_lossy().to_string());
    }
    Ok(out)
}
