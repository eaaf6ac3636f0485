use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::process::{CommandRunner, CommandTemplate};
use crate::workspace::Workspace;

/// Metrics computed for one snapshot plus the example names they refer to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub metrics: serde_json::Map<String, serde_json::Value>,
    pub names: Vec<String>,
}

impl Evaluation {
    /// Array-valued metrics must have one entry per example name.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (key, value) in &self.metrics {
            if let Some(values) = value.as_array() {
                if values.len() != self.names.len() {
                    return Err(format!(
                        "metric `{key}` has {} values for {} names",
                        values.len(),
                        self.names.len()
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Evaluates a trained snapshot on the currently staged data.
pub trait MetricsSource {
    fn calculate(&self, run_id: &str, snapshot: &str, save_predictions: bool)
        -> Result<Evaluation>;
}

/// Runs the framework's evaluation entry point and reads its JSON from stdout.
pub struct CommandMetrics<'a, R: CommandRunner> {
    runner: &'a R,
    template: &'a CommandTemplate,
    ws: &'a Workspace,
}

impl<'a, R: CommandRunner> CommandMetrics<'a, R> {
    pub fn new(runner: &'a R, template: &'a CommandTemplate, ws: &'a Workspace) -> Self {
        Self {
            runner,
            template,
            ws,
        }
    }
}

impl<R: CommandRunner> MetricsSource for CommandMetrics<'_, R> {
    fn calculate(
        &self,
        run_id: &str,
        snapshot: &str,
        save_predictions: bool,
    ) -> Result<Evaluation> {
        let mut cmd = self.template.render(
            &[("run_id", run_id), ("snapshot", snapshot)],
            self.ws.root(),
        )?;
        if save_predictions {
            cmd = cmd.with_arg("--save-predictions");
        }
        let stdout = self.runner.run_captured(&cmd)?;
        let eval = parse_evaluation(&stdout, run_id, snapshot)?;
        info!(
            run_id,
            snapshot,
            metrics = eval.metrics.len(),
            examples = eval.names.len(),
            "evaluated snapshot"
        );
        Ok(eval)
    }
}

/// Parses `{"metrics": {...}, "names": [...]}`. Only the last non-empty line
/// is considered so that the evaluator may log progress above it.
pub fn parse_evaluation(stdout: &str, run_id: &str, snapshot: &str) -> Result<Evaluation> {
    let malformed = |reason: String| PipelineError::MalformedEvaluation {
        run_id: run_id.to_string(),
        snapshot: snapshot.to_string(),
        reason,
    };

    let line = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| malformed("empty output".to_string()))?;
    let eval: Evaluation = serde_json::from_str(line.trim()).map_err(|e| malformed(e.to_string()))?;
    eval.validate().map_err(malformed)?;
    Ok(eval)
}
