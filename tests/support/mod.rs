#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use finetune_orchestrator::config::Config;
use finetune_orchestrator::error::{PipelineError, Result};
use finetune_orchestrator::process::{CommandRunner, CommandSpec, CommandTemplate};
use finetune_orchestrator::run_context::RunContext;

pub const MODEL_GROUP: &str = "ct_code_summarization";
pub const EXAMPLES_PER_EVAL: usize = 3;

/// Stands in for the training framework: training creates the next `CT-<n>`
/// run with two zero-padded snapshots, evaluation prints a JSON line.
pub struct FakeFramework {
    pub calls: RefCell<Vec<CommandSpec>>,
    /// `(config, simulated_batch_size_valid, persistent_snapshot_every)` seen by training.
    pub trained: RefCell<Vec<(String, u64, u64)>>,
    next_run: Cell<u64>,
    fail_program: Option<String>,
}

impl FakeFramework {
    pub fn new(first_run: u64) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            trained: RefCell::new(Vec::new()),
            next_run: Cell::new(first_run),
            fail_program: None,
        }
    }

    pub fn failing(program: &str) -> Self {
        Self {
            fail_program: Some(program.to_string()),
            ..Self::new(21)
        }
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.program.clone()).collect()
    }

    fn check_fail(&self, cmd: &CommandSpec) -> Result<()> {
        if self.fail_program.as_deref() == Some(cmd.program.as_str()) {
            return Err(PipelineError::Subprocess {
                command: cmd.to_string(),
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

impl CommandRunner for FakeFramework {
    fn run(&self, cmd: &CommandSpec) -> Result<()> {
        self.calls.borrow_mut().push(cmd.clone());
        self.check_fail(cmd)?;
        let data = cmd.cwd.join("data");
        match cmd.program.as_str() {
            "fake-train" => {
                let config = &cmd.args[0];
                let doc: serde_yaml::Value =
                    serde_yaml::from_str(&std::fs::read_to_string(cmd.cwd.join(config))?)?;
                let t = &doc["training"];
                self.trained.borrow_mut().push((
                    config.clone(),
                    t["simulated_batch_size_valid"].as_u64().unwrap_or(0),
                    t["persistent_snapshot_every"].as_u64().unwrap_or(0),
                ));
                let id = self.next_run.get();
                self.next_run.set(id + 1);
                let run = cmd.cwd.join("models").join(MODEL_GROUP).join(format!("CT-{id}"));
                std::fs::create_dir_all(&run)?;
                std::fs::write(run.join("snapshot-000050.p"), b"")?;
                std::fs::write(run.join("snapshot-000100.p"), b"")?;
            }
            "fake-extract" => {
                assert!(data.join("raw/code2seq").join(&cmd.args[0]).join("training").is_dir());
            }
            "fake-pre1" => {
                std::fs::write(data.join("stage1").join(format!("{}.done", cmd.args[1])), b"")?;
            }
            "fake-pre2" => {
                let stage2 = data.join("stage2");
                std::fs::write(stage2.join(format!("{}.done", cmd.args[1])), b"")?;
                std::fs::write(stage2.join("stats.json"), br#"{"train": 100, "val": 10, "test": 5}"#)?;
            }
            other => panic!("unexpected program {other}"),
        }
        Ok(())
    }

    fn run_captured(&self, cmd: &CommandSpec) -> Result<String> {
        self.calls.borrow_mut().push(cmd.clone());
        self.check_fail(cmd)?;
        assert_eq!(cmd.program, "fake-metrics");
        assert_eq!(cmd.args.last().map(String::as_str), Some("--save-predictions"));
        let (run, snapshot) = (&cmd.args[0], &cmd.args[1]);
        let names: Vec<String> = (0..EXAMPLES_PER_EVAL)
            .map(|i| format!("{run}/{snapshot}/Example{i}.method"))
            .collect();
        let scores: Vec<f64> = (0..EXAMPLES_PER_EVAL).map(|i| i as f64 / 10.0).collect();
        let payload = serde_json::json!({
            "metrics": { "bleu": scores, "f1": scores, "n": EXAMPLES_PER_EVAL },
            "names": names,
        });
        Ok(format!("evaluating {run} @ {snapshot}\n{payload}\n"))
    }
}

pub fn fake_config() -> Config {
    let mut cfg = Config::default();
    cfg.commands.train = CommandTemplate::from_args(["fake-train", "{config}"]);
    cfg.commands.metrics = CommandTemplate::from_args(["fake-metrics", "{run_id}", "{snapshot}"]);
    cfg.commands.extract = CommandTemplate::from_args(["fake-extract", "{dataset}"]);
    cfg.commands.preprocess_stage1 =
        CommandTemplate::from_args(["fake-pre1", "{dataset}", "{split}"]);
    cfg.commands.preprocess_stage2 =
        CommandTemplate::from_args(["fake-pre2", "{dataset}", "{split}"]);
    cfg
}

pub fn tmp_root(name: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "finetune_it_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));
    let _ = std::fs::remove_dir_all(&p);
    std::fs::create_dir_all(&p).expect("create tmp root");
    p
}

/// Working tree, pretrained run `CT-20`, both training configs and
/// preprocessed stage2 data for `projects`.
pub fn seed_workspace(root: &Path, projects: &[&str]) {
    std::fs::create_dir_all(root.join("data/stage2")).unwrap();

    let pretrained = root.join("models").join(MODEL_GROUP).join("CT-20");
    std::fs::create_dir_all(&pretrained).unwrap();
    std::fs::write(pretrained.join("snapshot-000900.p"), b"").unwrap();

    let cfg_dir = root.join("fine-tuning-experiments");
    std::fs::create_dir_all(&cfg_dir).unwrap();
    std::fs::write(
        cfg_dir.join("from_scratch_config.yaml"),
        "training:\n  batch_size: 32\n  simulated_batch_size_valid: 1\n  persistent_snapshot_every: 1\n",
    )
    .unwrap();
    std::fs::write(
        cfg_dir.join("fine_tuning_config.yaml"),
        "training:\n  batch_size: 16\ntransfer_learning:\n  model_id: CT-20\n",
    )
    .unwrap();

    for p in projects {
        let stage2 = root.join("preprocessed").join(p).join("stage2");
        std::fs::create_dir_all(stage2.join("train")).unwrap();
        std::fs::write(stage2.join("stats.json"), br#"{"train": 100, "val": 10, "test": 5}"#)
            .unwrap();
        std::fs::write(stage2.join("train/0.p"), p.as_bytes()).unwrap();
    }
}

pub fn context(root: &Path, runner: FakeFramework) -> RunContext<FakeFramework> {
    RunContext::new(root, fake_config(), runner)
}

pub fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
