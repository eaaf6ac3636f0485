use tracing::info;

use crate::error::Result;
use crate::process::CommandRunner;
use crate::projects::RestoreEntry;
use crate::results::ResultBundle;
use crate::run_context::RunContext;
use crate::stage::stage_preprocessed;

/// Recomputes the result bundle for runs that already exist, without training.
pub fn restore_project<R: CommandRunner>(
    ctx: &RunContext<R>,
    entry: &RestoreEntry,
) -> Result<ResultBundle> {
    stage_preprocessed(&ctx.ws, &entry.project)?;
    let mut bundle = ResultBundle::create(&ctx.ws, &entry.project)?;
    ctx.evaluate_all(&mut bundle, &entry.from_scratch_run, &entry.fine_tuned_run)?;
    info!(
        project = %entry.project,
        from_scratch_run = %entry.from_scratch_run,
        fine_tuned_run = %entry.fine_tuned_run,
        files = bundle.files().len(),
        "restored metrics"
    );
    Ok(bundle)
}
