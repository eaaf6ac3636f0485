use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use finetune_orchestrator::batch::{run_batch, BatchEntry};
use finetune_orchestrator::cli::{init_tracing, BatchArgs};
use finetune_orchestrator::projects::read_restore_entries;
use finetune_orchestrator::restore::restore_project;

#[derive(Debug, Parser)]
#[command(
    name = "restore_metrics",
    about = "Recompute result bundles for already trained runs"
)]
struct Args {
    /// File with `project,from_scratch_run,fine_tuned_run` lines.
    projects: PathBuf,

    #[command(flatten)]
    batch: BatchArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let ctx = args.batch.context()?;
    let entries = read_restore_entries(&args.projects)
        .with_context(|| format!("read {}", args.projects.display()))?;

    let report = run_batch(&entries, args.batch.policy(), |e| e.project.as_str(), |e| {
        let bundle = restore_project(&ctx, e)?;
        println!("out_dir={}", bundle.dir().display());
        Ok(BatchEntry::ok(&e.project).with_runs(&e.from_scratch_run, Some(&e.fine_tuned_run)))
    });

    args.batch.finish(&report)
}
