use std::path::Path;

use serde_yaml::Value;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::schema::{SPLIT_TRAIN, SPLIT_VAL};
use crate::splits::SplitSizes;

const TRAINING: &str = "training";
const BATCH_SIZE: &str = "batch_size";
const SIMULATED_BATCH_SIZE_VALID: &str = "simulated_batch_size_valid";
const PERSISTENT_SNAPSHOT_EVERY: &str = "persistent_snapshot_every";

/// Values written into the `training` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigPatch {
    pub batch_size: f64,
    pub simulated_batch_size_valid: u64,
    pub persistent_snapshot_every: u64,
}

/// Overwrites `training.simulated_batch_size_valid` with the validation split
/// size and `training.persistent_snapshot_every` with one epoch's worth of
/// steps. Everything else in the document is left untouched.
pub fn patch_training_section(doc: &mut Value, sizes: &SplitSizes) -> Result<ConfigPatch> {
    patch_document(doc, sizes).map_err(|e| e.at(Path::new("<document>")))
}

/// Loads the YAML document at `path`, patches it and writes it back in place.
pub fn patch_config_file(path: &Path, sizes: &SplitSizes) -> Result<ConfigPatch> {
    let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::MalformedConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut doc: Value = serde_yaml::from_str(&raw).map_err(|e| PipelineError::MalformedConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let patch = patch_document(&mut doc, sizes).map_err(|e| e.at(path))?;

    std::fs::write(path, serde_yaml::to_string(&doc)?)?;
    info!(
        config = %path.display(),
        simulated_batch_size_valid = patch.simulated_batch_size_valid,
        persistent_snapshot_every = patch.persistent_snapshot_every,
        "patched training config"
    );
    Ok(patch)
}

enum PatchError {
    Config(String),
    Pipeline(PipelineError),
}

impl PatchError {
    fn at(self, path: &Path) -> PipelineError {
        match self {
            PatchError::Config(reason) => PipelineError::MalformedConfig {
                path: path.to_path_buf(),
                reason,
            },
            PatchError::Pipeline(e) => e,
        }
    }
}

impl From<PipelineError> for PatchError {
    fn from(e: PipelineError) -> Self {
        PatchError::Pipeline(e)
    }
}

fn patch_document(doc: &mut Value, sizes: &SplitSizes) -> std::result::Result<ConfigPatch, PatchError> {
    let training = doc
        .get_mut(TRAINING)
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| PatchError::Config(format!("missing `{TRAINING}` section")))?;

    let batch_size = training
        .get(BATCH_SIZE)
        .ok_or_else(|| PatchError::Config(format!("missing `{TRAINING}.{BATCH_SIZE}`")))?;
    let batch = BatchSize::parse(batch_size).ok_or_else(|| {
        PatchError::Config(format!(
            "`{TRAINING}.{BATCH_SIZE}` must be a positive number"
        ))
    })?;

    let val = sizes.get(SPLIT_VAL)?;
    let train = sizes.get(SPLIT_TRAIN)?;
    let every = batch.steps_for(train);

    training.insert(Value::from(SIMULATED_BATCH_SIZE_VALID), Value::from(val));
    training.insert(Value::from(PERSISTENT_SNAPSHOT_EVERY), Value::from(every));

    Ok(ConfigPatch {
        batch_size: batch.as_f64(),
        simulated_batch_size_valid: val,
        persistent_snapshot_every: every,
    })
}

#[derive(Debug, Clone, Copy)]
enum BatchSize {
    Int(u64),
    Float(f64),
}

impl BatchSize {
    fn parse(v: &Value) -> Option<Self> {
        if let Some(n) = v.as_u64() {
            return (n > 0).then_some(BatchSize::Int(n));
        }
        let f = v.as_f64()?;
        (f.is_finite() && f > 0.0).then_some(BatchSize::Float(f))
    }

    /// `ceil(examples / batch_size)`.
    fn steps_for(self, examples: u64) -> u64 {
        match self {
            BatchSize::Int(b) => examples.div_ceil(b),
            BatchSize::Float(b) => (examples as f64 / b).ceil() as u64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            BatchSize::Int(b) => b as f64,
            BatchSize::Float(b) => b,
        }
    }
}
