use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use finetune_orchestrator::batch::{run_batch, BatchEntry};
use finetune_orchestrator::cli::{init_tracing, BatchArgs};
use finetune_orchestrator::fine_tune::fine_tune_project;
use finetune_orchestrator::projects::read_project_names;

#[derive(Debug, Parser)]
#[command(
    name = "fine_tune_projects",
    about = "Train from scratch and fine-tune on each listed project, then save metrics"
)]
struct Args {
    /// File with one project name per line.
    project_names: PathBuf,

    #[command(flatten)]
    batch: BatchArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let ctx = args.batch.context()?;
    let projects = read_project_names(&args.project_names)
        .with_context(|| format!("read {}", args.project_names.display()))?;

    let report = run_batch(&projects, args.batch.policy(), |p| p.as_str(), |p| {
        let out = fine_tune_project(&ctx, p)?;
        for f in &out.bundle_files {
            println!("result={}", f.display());
        }
        Ok(BatchEntry::ok(p).with_runs(&out.from_scratch_run, out.fine_tuned_run.as_deref()))
    });

    args.batch.finish(&report)
}
