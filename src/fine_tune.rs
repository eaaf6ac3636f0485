use std::path::PathBuf;

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::process::CommandRunner;
use crate::results::ResultBundle;
use crate::run_context::RunContext;
use crate::splits::SplitSizes;
use crate::stage::stage_preprocessed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineTuneOutcome {
    pub project: String,
    pub from_scratch_run: String,
    /// `None` when only the from-scratch config is trained.
    pub fine_tuned_run: Option<String>,
    pub bundle_files: Vec<PathBuf>,
}

/// Stages the project's stage2 data, trains each configured training config
/// on it and writes the three evaluations.
pub fn fine_tune_project<R: CommandRunner>(
    ctx: &RunContext<R>,
    project: &str,
) -> Result<FineTuneOutcome> {
    let fine_tuning = ctx.config.training.fine_tuning();

    // Checked up front so a conflict is reported before hours of training.
    let results_dir = ctx.ws.results_dir(project)?;
    if fine_tuning.is_some() && results_dir.exists() {
        return Err(PipelineError::PathConflict(results_dir));
    }

    stage_preprocessed(&ctx.ws, project)?;
    let sizes = SplitSizes::read(&ctx.ws.stats_path())?;

    let from_scratch_run = ctx.train(&ctx.config.training.from_scratch_config, &sizes)?;

    let Some(fine_tuning) = fine_tuning else {
        info!(project, %from_scratch_run, "from-scratch training finished");
        return Ok(FineTuneOutcome {
            project: project.to_string(),
            from_scratch_run,
            fine_tuned_run: None,
            bundle_files: Vec::new(),
        });
    };

    let fine_tuned_run = ctx.train(fine_tuning, &sizes)?;

    let mut bundle = ResultBundle::create(&ctx.ws, project)?;
    ctx.evaluate_all(&mut bundle, &from_scratch_run, &fine_tuned_run)?;
    info!(
        project,
        %from_scratch_run,
        %fine_tuned_run,
        dir = %bundle.dir().display(),
        "fine-tuning finished"
    );

    Ok(FineTuneOutcome {
        project: project.to_string(),
        from_scratch_run,
        fine_tuned_run: Some(fine_tuned_run),
        bundle_files: bundle.files().to_vec(),
    })
}
