use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use finetune_orchestrator::batch::{run_batch, BatchEntry};
use finetune_orchestrator::cli::{init_tracing, BatchArgs};
use finetune_orchestrator::preprocess::process_project;
use finetune_orchestrator::projects::read_project_names;

#[derive(Debug, Parser)]
#[command(
    name = "preprocess_projects",
    about = "Run extraction and both preprocessing stages for each listed project"
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
        process_project(&ctx, p)?;
        Ok(BatchEntry::ok(p))
    });

    args.batch.finish(&report)
}
