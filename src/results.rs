use std::fmt;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::metrics::Evaluation;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// Model trained from scratch on the project, evaluated after training.
    NewAfter,
    /// Pretrained baseline before fine-tuning.
    TrainedBefore,
    /// Pretrained baseline after fine-tuning on the project.
    TrainedAfter,
}

impl ResultKind {
    pub const ALL: [ResultKind; 3] = [
        ResultKind::NewAfter,
        ResultKind::TrainedBefore,
        ResultKind::TrainedAfter,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ResultKind::NewAfter => "new_after",
            ResultKind::TrainedBefore => "trained_before",
            ResultKind::TrainedAfter => "trained_after",
        }
    }

    pub fn json_file(self) -> String {
        format!("{}.json", self.as_str())
    }

    pub fn names_file(self) -> String {
        format!("{}_names.txt", self.as_str())
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-once result directory for one project.
#[derive(Debug)]
pub struct ResultBundle {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ResultBundle {
    /// Creates `results/<project>`. An existing directory is a conflict and is
    /// left untouched.
    pub fn create(ws: &Workspace, project: &str) -> Result<Self> {
        let dir = ws.results_dir(project)?;
        std::fs::create_dir_all(ws.results_root())?;
        match std::fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(PipelineError::PathConflict(dir));
            }
            Err(e) => return Err(e.into()),
        }
        info!(project, dir = %dir.display(), "created result bundle");
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn write(&mut self, kind: ResultKind, eval: &Evaluation) -> Result<()> {
        let json_path = self.dir.join(kind.json_file());
        let json = serde_json::to_vec_pretty(&eval.metrics)?;
        write_new(&json_path, &json)?;
        self.written.push(json_path);

        let names_path = self.dir.join(kind.names_file());
        write_new(&names_path, eval.names.join("\n").as_bytes())?;
        self.written.push(names_path);

        info!(
            dir = %self.dir.display(),
            kind = %kind,
            examples = eval.names.len(),
            "wrote result"
        );
        Ok(())
    }
}

fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(PipelineError::PathConflict(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    f.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    fn tmp_ws(name: &str) -> Workspace {
        let root = std::env::temp_dir().join(format!(
            "finetune_results_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::create_dir_all(&root).unwrap();
        Workspace::new(root, LayoutConfig::default(), "g")
    }

    fn eval() -> Evaluation {
        let mut metrics = serde_json::Map::new();
        metrics.insert("bleu".to_string(), serde_json::json!([0.5, 0.25]));
        Evaluation {
            metrics,
            names: vec!["Foo.bar".to_string(), "Foo.baz".to_string()],
        }
    }

    #[test]
    fn file_names_are_frozen() {
        let names: Vec<String> = ResultKind::ALL
            .iter()
            .flat_map(|k| [k.json_file(), k.names_file()])
            .collect();
        assert_eq!(
            names,
            vec![
                "new_after.json",
                "new_after_names.txt",
                "trained_before.json",
                "trained_before_names.txt",
                "trained_after.json",
                "trained_after_names.txt",
            ]
        );
    }

    #[test]
    fn writes_json_and_names() {
        let ws = tmp_ws("write");
        let mut b = ResultBundle::create(&ws, "p").unwrap();
        b.write(ResultKind::NewAfter, &eval()).unwrap();

        let names = std::fs::read_to_string(b.dir().join("new_after_names.txt")).unwrap();
        assert_eq!(names, "Foo.bar\nFoo.baz");
        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(b.dir().join("new_after.json")).unwrap())
                .unwrap();
        assert_eq!(json["bleu"][1], 0.25);
        assert_eq!(b.files().len(), 2);

        assert!(matches!(
            b.write(ResultKind::NewAfter, &eval()),
            Err(PipelineError::PathConflict(_))
        ));
        let _ = std::fs::remove_dir_all(ws.root());
    }

    #[test]
    fn existing_directory_is_not_touched() {
        let ws = tmp_ws("conflict");
        let dir = ws.results_dir("p").unwrap();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("new_after.json"), b"old").unwrap();

        let err = ResultBundle::create(&ws, "p").unwrap_err();
        assert!(matches!(err, PipelineError::PathConflict(_)));
        assert_eq!(std::fs::read(dir.join("new_after.json")).unwrap(), b"old");
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
        let _ = std::fs::remove_dir_all(ws.root());
    }
}
