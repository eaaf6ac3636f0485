use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::schema::SUMMARY_HEADER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing project.
    #[default]
    FailFast,
    /// Record the failure and continue with the next project.
    KeepGoing,
}

impl FailurePolicy {
    pub fn from_keep_going(keep_going: bool) -> Self {
        if keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::FailFast
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryStatus {
    Ok,
    Failed,
}

impl EntryStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Ok => "ok",
            EntryStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub project: String,
    pub status: EntryStatus,
    pub from_scratch_run: Option<String>,
    pub fine_tuned_run: Option<String>,
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn ok(project: &str) -> Self {
        Self {
            project: project.to_string(),
            status: EntryStatus::Ok,
            from_scratch_run: None,
            fine_tuned_run: None,
            error: None,
        }
    }

    pub fn with_runs(mut self, from_scratch_run: &str, fine_tuned_run: Option<&str>) -> Self {
        self.from_scratch_run = Some(from_scratch_run.to_string());
        self.fine_tuned_run = fine_tuned_run.map(str::to_string);
        self
    }

    fn failed(project: &str, err: &PipelineError) -> Self {
        Self {
            project: project.to_string(),
            status: EntryStatus::Failed,
            from_scratch_run: None,
            fine_tuned_run: None,
            error: Some(format!("{}: {err}", err.kind())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn ok_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Ok)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.ok_count()
    }
}

/// Processes `items` one after another. Under [`FailurePolicy::FailFast`] the
/// report ends with the first failed entry and later items are not attempted.
pub fn run_batch<T, L, F>(items: &[T], policy: FailurePolicy, label: L, mut f: F) -> BatchReport
where
    L: Fn(&T) -> &str,
    F: FnMut(&T) -> Result<BatchEntry, PipelineError>,
{
    let mut report = BatchReport::default();
    for (i, item) in items.iter().enumerate() {
        let project = label(item);
        info!(project, index = i + 1, total = items.len(), "processing");
        match f(item) {
            Ok(entry) => report.entries.push(entry),
            Err(e) => {
                report.entries.push(BatchEntry::failed(project, &e));
                match policy {
                    FailurePolicy::FailFast => {
                        error!(project, error = %e, "project failed; stopping batch");
                        break;
                    }
                    FailurePolicy::KeepGoing => {
                        warn!(project, error = %e, "project failed; continuing");
                    }
                }
            }
        }
    }
    info!(
        ok = report.ok_count(),
        failed = report.failed_count(),
        skipped = items.len() - report.entries.len(),
        "batch done"
    );
    report
}

pub fn write_summary_csv(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    wtr.write_record(SUMMARY_HEADER).context("write header")?;
    for e in &report.entries {
        wtr.write_record([
            e.project.as_str(),
            e.status.as_str(),
            e.from_scratch_run.as_deref().unwrap_or(""),
            e.fine_tuned_run.as_deref().unwrap_or(""),
            e.error.as_deref().unwrap_or(""),
        ])
        .context("write row")?;
    }
    wtr.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
