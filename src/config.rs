use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::process::CommandTemplate;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let cfg: Config =
            toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
        cfg.validate()
            .with_context(|| format!("validate {}", path.display()))?;
        Ok(cfg)
    }

    /// Loads `path` when given, otherwise falls back to the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        fn check_rel(name: &str, v: &Path) -> anyhow::Result<()> {
            if v.as_os_str().is_empty() {
                anyhow::bail!("{name} must not be empty");
            }
            if v.is_absolute() {
                anyhow::bail!("{name} must be relative to the workspace root, got {}", v.display());
            }
            Ok(())
        }

        check_rel("layout.data_dir", &self.layout.data_dir)?;
        check_rel("layout.raw_projects_dir", &self.layout.raw_projects_dir)?;
        check_rel("layout.preprocessed_dir", &self.layout.preprocessed_dir)?;
        check_rel("layout.results_dir", &self.layout.results_dir)?;
        check_rel("layout.models_dir", &self.layout.models_dir)?;
        check_rel("training.from_scratch_config", &self.training.from_scratch_config)?;
        check_rel("training.fine_tuning_config", &self.training.fine_tuning_config)?;

        for (name, v) in [
            ("layout.raw_format", &self.layout.raw_format),
            ("layout.dataset", &self.layout.dataset),
            ("models.group", &self.models.group),
            ("models.run_prefix", &self.models.run_prefix),
            ("models.pretrained_run", &self.models.pretrained_run),
        ] {
            if v.trim().is_empty() {
                anyhow::bail!("{name} must not be empty");
            }
        }

        for (name, t) in [
            ("commands.extract", &self.commands.extract),
            ("commands.preprocess_stage1", &self.commands.preprocess_stage1),
            ("commands.preprocess_stage2", &self.commands.preprocess_stage2),
            ("commands.train", &self.commands.train),
            ("commands.metrics", &self.commands.metrics),
        ] {
            if t.is_empty() {
                anyhow::bail!("{name} must have at least a program name");
            }
        }

        if self.layout.preprocess_splits.is_empty() {
            anyhow::bail!("layout.preprocess_splits must not be empty");
        }

        Ok(())
    }
}

/// Directory names relative to the workspace root.
#[derive(Clone, Debug, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_raw_projects_dir")]
    pub raw_projects_dir: PathBuf,
    #[serde(default = "default_preprocessed_dir")]
    pub preprocessed_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Subdirectory of `data/raw` the extraction stage reads from.
    #[serde(default = "default_raw_format")]
    pub raw_format: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// Split names passed to the preprocessing stages.
    #[serde(default = "default_preprocess_splits")]
    pub preprocess_splits: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            raw_projects_dir: default_raw_projects_dir(),
            preprocessed_dir: default_preprocessed_dir(),
            results_dir: default_results_dir(),
            models_dir: default_models_dir(),
            raw_format: default_raw_format(),
            dataset: default_dataset(),
            preprocess_splits: default_preprocess_splits(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_raw_projects_dir() -> PathBuf {
    PathBuf::from("raw_java")
}

fn default_preprocessed_dir() -> PathBuf {
    PathBuf::from("preprocessed")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_raw_format() -> String {
    "code2seq".to_string()
}

fn default_dataset() -> String {
    "java-small".to_string()
}

fn default_preprocess_splits() -> Vec<String> {
    vec!["train".to_string(), "valid".to_string(), "test".to_string()]
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModelsConfig {
    /// Directory under `models/` the training framework writes runs to.
    #[serde(default = "default_model_group")]
    pub group: String,
    #[serde(default = "default_run_prefix")]
    pub run_prefix: String,
    /// Baseline evaluated as `trained_before`.
    #[serde(default = "default_pretrained_run")]
    pub pretrained_run: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            group: default_model_group(),
            run_prefix: default_run_prefix(),
            pretrained_run: default_pretrained_run(),
        }
    }
}

fn default_model_group() -> String {
    "ct_code_summarization".to_string()
}

fn default_run_prefix() -> String {
    "CT".to_string()
}

fn default_pretrained_run() -> String {
    "CT-20".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_from_scratch_config")]
    pub from_scratch_config: PathBuf,
    #[serde(default = "default_fine_tuning_config")]
    pub fine_tuning_config: PathBuf,
    /// Train only the from-scratch config; no result bundle is written.
    #[serde(default)]
    pub from_scratch_only: bool,
}

impl TrainingConfig {
    pub fn fine_tuning(&self) -> Option<&Path> {
        if self.from_scratch_only {
            None
        } else {
            Some(&self.fine_tuning_config)
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            from_scratch_config: default_from_scratch_config(),
            fine_tuning_config: default_fine_tuning_config(),
            from_scratch_only: false,
        }
    }
}

fn default_from_scratch_config() -> PathBuf {
    PathBuf::from("fine-tuning-experiments/from_scratch_config.yaml")
}

fn default_fine_tuning_config() -> PathBuf {
    PathBuf::from("fine-tuning-experiments/fine_tuning_config.yaml")
}

/// Argv templates for the external framework. `{name}` placeholders are
/// substituted per argument.
#[derive(Clone, Debug, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_extract_cmd")]
    pub extract: CommandTemplate,
    #[serde(default = "default_preprocess_stage1_cmd")]
    pub preprocess_stage1: CommandTemplate,
    #[serde(default = "default_preprocess_stage2_cmd")]
    pub preprocess_stage2: CommandTemplate,
    #[serde(default = "default_train_cmd")]
    pub train: CommandTemplate,
    #[serde(default = "default_metrics_cmd")]
    pub metrics: CommandTemplate,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            extract: default_extract_cmd(),
            preprocess_stage1: default_preprocess_stage1_cmd(),
            preprocess_stage2: default_preprocess_stage2_cmd(),
            train: default_train_cmd(),
            metrics: default_metrics_cmd(),
        }
    }
}

fn default_extract_cmd() -> CommandTemplate {
    CommandTemplate::from_args(["python", "-m", "scripts.extract-java-methods", "{dataset}"])
}

fn default_preprocess_stage1_cmd() -> CommandTemplate {
    CommandTemplate::from_args([
        "python",
        "-m",
        "scripts.run-preprocessing",
        "code_transformer/experiments/preprocessing/preprocess-1-code2seq.yaml",
        "{dataset}",
        "{split}",
    ])
}

fn default_preprocess_stage2_cmd() -> CommandTemplate {
    CommandTemplate::from_args([
        "python",
        "-m",
        "scripts.run-preprocessing",
        "code_transformer/experiments/preprocessing/preprocess-2.yaml",
        "{dataset}",
        "{split}",
    ])
}

fn default_train_cmd() -> CommandTemplate {
    CommandTemplate::from_args(["python", "-m", "scripts.run-experiment", "{config}"])
}

fn default_metrics_cmd() -> CommandTemplate {
    CommandTemplate::from_args([
        "python",
        "-m",
        "scripts.calculate-metrics",
        "{run_id}",
        "{snapshot}",
    ])
}
