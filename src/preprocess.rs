use tracing::info;

use crate::error::Result;
use crate::process::CommandRunner;
use crate::run_context::RunContext;
use crate::stage::{archive_processed, reset_raw_layout};

/// Raw splits → extraction → stage1 → stage2 → `preprocessed/<project>`.
pub fn process_project<R: CommandRunner>(ctx: &RunContext<R>, project: &str) -> Result<()> {
    info!(project, "preprocessing");
    reset_raw_layout(&ctx.ws, project)?;

    let dataset = ctx.config.layout.dataset.as_str();
    let commands = &ctx.config.commands;
    ctx.run(&commands.extract, &[("dataset", dataset)])?;

    for stage in [&commands.preprocess_stage1, &commands.preprocess_stage2] {
        for split in &ctx.config.layout.preprocess_splits {
            ctx.run(stage, &[("dataset", dataset), ("split", split.as_str())])?;
        }
    }

    archive_processed(&ctx.ws, project)?;
    info!(project, "preprocessing finished");
    Ok(())
}
