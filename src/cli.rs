use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::batch::{write_summary_csv, BatchReport, FailurePolicy};
use crate::config::Config;
use crate::process::SystemRunner;
use crate::run_context::RunContext;

/// Options shared by every batch binary.
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Orchestrator config (TOML). Built-in defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Workspace root holding `data/`, `preprocessed/`, `models/` and `results/`.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Continue with the next project after a failure instead of stopping.
    #[arg(long)]
    pub keep_going: bool,

    /// Write a per-project CSV summary here.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl BatchArgs {
    pub fn policy(&self) -> FailurePolicy {
        FailurePolicy::from_keep_going(self.keep_going)
    }

    pub fn context(&self) -> anyhow::Result<RunContext<SystemRunner>> {
        let cfg = Config::load_or_default(self.config.as_deref()).context("load config")?;
        Ok(RunContext::new(self.root.clone(), cfg, SystemRunner))
    }

    /// Writes the summary (when requested) and turns failures into an error exit.
    pub fn finish(&self, report: &BatchReport) -> anyhow::Result<()> {
        if let Some(path) = &self.summary {
            write_summary_csv(path, report)
                .with_context(|| format!("write summary {}", path.display()))?;
            println!("summary={}", path.display());
        }
        println!("ok={}", report.ok_count());
        println!("failed={}", report.failed_count());
        if report.failed_count() > 0 {
            let first = report
                .entries
                .iter()
                .find_map(|e| e.error.as_deref())
                .unwrap_or("unknown error");
            anyhow::bail!("{} project(s) failed; first: {first}", report.failed_count());
        }
        Ok(())
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
