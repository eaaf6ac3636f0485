use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Argv template. Each element is one argument; `{name}` placeholders are
/// replaced verbatim, so substituted values never go through a shell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CommandTemplate(Vec<String>);

impl CommandTemplate {
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(args.into_iter().map(Into::into).collect())
    }

    pub fn args(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn render(&self, vars: &[(&str, &str)], cwd: &Path) -> Result<CommandSpec> {
        let mut rendered = self.0.iter().map(|arg| substitute(arg, vars));
        let program = rendered
            .next()
            .ok_or_else(|| PipelineError::MalformedConfig {
                path: PathBuf::from("<commands>"),
                reason: "empty command template".to_string(),
            })?;
        Ok(CommandSpec {
            program,
            args: rendered.collect(),
            cwd: cwd.to_path_buf(),
        })
    }
}

fn substitute(arg: &str, vars: &[(&str, &str)]) -> String {
    let mut out = arg.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// Blocking invocation of external programs.
pub trait CommandRunner {
    /// Runs to completion with inherited stdio.
    fn run(&self, cmd: &CommandSpec) -> Result<()>;

    /// Runs to completion and returns captured stdout.
    fn run_captured(&self, cmd: &CommandSpec) -> Result<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(cmd: &CommandSpec) -> Command {
        let mut c = Command::new(&cmd.program);
        c.args(&cmd.args).current_dir(&cmd.cwd);
        c
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<()> {
        info!(command = %cmd, "run");
        let status = Self::command(cmd)
            .status()
            .map_err(|e| spawn_failed(cmd, &e))?;
        if !status.success() {
            return Err(PipelineError::Subprocess {
                command: cmd.to_string(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn run_captured(&self, cmd: &CommandSpec) -> Result<String> {
        info!(command = %cmd, "run (captured)");
        let output = Self::command(cmd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_failed(cmd, &e))?;
        if !output.status.success() {
            return Err(PipelineError::Subprocess {
                command: cmd.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        debug!(command = %cmd, stdout_bytes = output.stdout.len(), "captured");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn spawn_failed(cmd: &CommandSpec, e: &std::io::Error) -> PipelineError {
    PipelineError::Subprocess {
        command: cmd.to_string(),
        code: None,
        stderr: format!("spawn: {e}"),
    }
}
