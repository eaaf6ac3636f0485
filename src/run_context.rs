use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::config_patch::patch_config_file;
use crate::discovery::{latest_run, latest_snapshot};
use crate::error::Result;
use crate::metrics::{CommandMetrics, MetricsSource};
use crate::process::{CommandRunner, CommandTemplate};
use crate::results::{ResultBundle, ResultKind};
use crate::splits::SplitSizes;
use crate::workspace::Workspace;

/// Everything one batch needs: the workspace it mutates, the orchestrator
/// config and the process runner used for the external framework.
pub struct RunContext<R: CommandRunner> {
    pub ws: Workspace,
    pub config: Config,
    pub runner: R,
}

impl<R: CommandRunner> RunContext<R> {
    pub fn new(root: impl Into<PathBuf>, config: Config, runner: R) -> Self {
        let ws = Workspace::new(root, config.layout.clone(), &config.models.group);
        Self { ws, config, runner }
    }

    pub fn metrics(&self) -> CommandMetrics<'_, R> {
        CommandMetrics::new(&self.runner, &self.config.commands.metrics, &self.ws)
    }

    /// Renders `template` against the workspace root and runs it to completion.
    pub fn run(&self, template: &CommandTemplate, vars: &[(&str, &str)]) -> Result<()> {
        let cmd = template.render(vars, self.ws.root())?;
        self.runner.run(&cmd)
    }

    /// Patches the training config at `config` (workspace-relative), runs
    /// training on it and returns the id of the run it produced.
    pub fn train(&self, config: &Path, sizes: &SplitSizes) -> Result<String> {
        patch_config_file(&self.ws.resolve(config), sizes)?;
        let config_arg = config.to_string_lossy();
        self.run(&self.config.commands.train, &[("config", &*config_arg)])?;
        let run = latest_run(&self.ws.models_root(), &self.config.models.run_prefix)?;
        info!(config = %config.display(), %run, "training finished");
        Ok(run)
    }

    /// Evaluates the latest snapshot of `run_id` and writes it as `kind`.
    pub fn evaluate_into(
        &self,
        bundle: &mut ResultBundle,
        kind: ResultKind,
        run_id: &str,
    ) -> Result<()> {
        let snapshot = latest_snapshot(&self.ws.run_dir(run_id)?)?;
        let eval = self.metrics().calculate(run_id, &snapshot, true)?;
        bundle.write(kind, &eval)
    }

    /// Writes `new_after`, `trained_before` and `trained_after` in that order.
    pub fn evaluate_all(
        &self,
        bundle: &mut ResultBundle,
        from_scratch_run: &str,
        fine_tuned_run: &str,
    ) -> Result<()> {
        for kind in ResultKind::ALL {
            let run = match kind {
                ResultKind::NewAfter => from_scratch_run,
                ResultKind::TrainedBefore => self.config.models.pretrained_run.as_str(),
                ResultKind::TrainedAfter => fine_tuned_run,
            };
            self.evaluate_into(bundle, kind, run)?;
        }
        Ok(())
    }
}
