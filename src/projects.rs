use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::workspace::check_project_name;

/// One line of the restorer input: `project,from_scratch_run,fine_tuned_run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreEntry {
    pub project: String,
    pub from_scratch_run: String,
    pub fine_tuned_run: String,
}

/// One project name per line; surrounding whitespace is trimmed and blank
/// lines are skipped.
pub fn read_project_names(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)?;
    parse_project_names(&raw)
}

pub fn parse_project_names(raw: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for line in raw.lines() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        check_project_name(name)?;
        out.push(name.to_string());
    }
    Ok(out)
}

pub fn read_restore_entries(path: &Path) -> Result<Vec<RestoreEntry>> {
    let raw = std::fs::read_to_string(path)?;
    parse_restore_entries(&raw)
}

pub fn parse_restore_entries(raw: &str) -> Result<Vec<RestoreEntry>> {
    let mut out = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let &[project, from_scratch_run, fine_tuned_run] = fields.as_slice() else {
            return Err(PipelineError::MalformedInput {
                line: idx + 1,
                reason: format!("expected 3 comma-separated fields, got {}", fields.len()),
            });
        };
        for v in [project, from_scratch_run, fine_tuned_run] {
            check_project_name(v).map_err(|_| PipelineError::MalformedInput {
                line: idx + 1,
                reason: format!("invalid field `{v}`"),
            })?;
        }
        out.push(RestoreEntry {
            project: project.to_string(),
            from_scratch_run: from_scratch_run.to_string(),
            fine_tuned_run: fine_tuned_run.to_string(),
        });
    }
    Ok(out)
}
