use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing source tree: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("missing path: {}", .0.display())]
    MissingPath(PathBuf),

    #[error("path already exists: {}", .0.display())]
    PathConflict(PathBuf),

    #[error("command `{command}` failed (exit code {code:?}): {stderr}")]
    Subprocess {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("malformed config {}: {reason}", .path.display())]
    MalformedConfig { path: PathBuf, reason: String },

    #[error("malformed stats {}: {reason}", .path.display())]
    MalformedStats { path: PathBuf, reason: String },

    #[error("split `{0}` missing from stats")]
    MissingSplit(String),

    #[error("nothing to select in {}", .0.display())]
    EmptyListing(PathBuf),

    #[error("no digits in entry name `{0}`")]
    MalformedName(String),

    #[error("malformed evaluation for {run_id}/{snapshot}: {reason}")]
    MalformedEvaluation {
        run_id: String,
        snapshot: String,
        reason: String,
    },

    #[error("malformed input line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("invalid project name `{0}`")]
    InvalidProjectName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    /// Short machine-readable kind, used in batch summaries.
    pub const fn kind(&self) -> &'static str {
        match self {
            PipelineError::MissingSource(_) => "MISSING_SOURCE",
            PipelineError::MissingPath(_) => "MISSING_PATH",
            PipelineError::PathConflict(_) => "PATH_CONFLICT",
            PipelineError::Subprocess { .. } => "SUBPROCESS_FAILED",
            PipelineError::MalformedConfig { .. } => "MALFORMED_CONFIG",
            PipelineError::MalformedStats { .. } => "MALFORMED_STATS",
            PipelineError::MissingSplit(_) => "MISSING_SPLIT",
            PipelineError::EmptyListing(_) => "EMPTY_LISTING",
            PipelineError::MalformedName(_) => "MALFORMED_NAME",
            PipelineError::MalformedEvaluation { .. } => "MALFORMED_EVALUATION",
            PipelineError::MalformedInput { .. } => "MALFORMED_INPUT",
            PipelineError::InvalidProjectName(_) => "INVALID_PROJECT_NAME",
            PipelineError::Io(_) => "IO",
            PipelineError::Json(_) => "JSON",
            PipelineError::Yaml(_) => "YAML",
        }
    }
}
