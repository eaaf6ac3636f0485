use std::path::{Component, Path, PathBuf};

use crate::config::LayoutConfig;
use crate::error::{PipelineError, Result};
use crate::schema::FILE_STATS_JSON;

/// Filesystem layout of one orchestration workspace.
///
/// Every stage takes the workspace explicitly; the `data/` tree under it is
/// reset and repopulated per project, so a workspace must not be shared by
/// concurrent batches.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    layout: LayoutConfig,
    models_group: String,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, layout: LayoutConfig, models_group: &str) -> Self {
        Self {
            root: root.into(),
            layout,
            models_group: models_group.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.layout.data_dir)
    }

    pub fn stage1_dir(&self) -> PathBuf {
        self.data_dir().join("stage1")
    }

    pub fn stage2_dir(&self) -> PathBuf {
        self.data_dir().join("stage2")
    }

    /// `data/raw/<format>/<dataset>`, the input of the extraction stage.
    pub fn raw_dataset_dir(&self) -> PathBuf {
        self.data_dir()
            .join("raw")
            .join(&self.layout.raw_format)
            .join(&self.layout.dataset)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.stage2_dir().join(FILE_STATS_JSON)
    }

    pub fn raw_project_dir(&self, project: &str) -> Result<PathBuf> {
        check_project_name(project)?;
        Ok(self.root.join(&self.layout.raw_projects_dir).join(project))
    }

    pub fn preprocessed_dir(&self, project: &str) -> Result<PathBuf> {
        check_project_name(project)?;
        Ok(self.root.join(&self.layout.preprocessed_dir).join(project))
    }

    pub fn preprocessed_stage2_dir(&self, project: &str) -> Result<PathBuf> {
        Ok(self.preprocessed_dir(project)?.join("stage2"))
    }

    pub fn results_root(&self) -> PathBuf {
        self.root.join(&self.layout.results_dir)
    }

    pub fn results_dir(&self, project: &str) -> Result<PathBuf> {
        check_project_name(project)?;
        Ok(self.results_root().join(project))
    }

    pub fn models_root(&self) -> PathBuf {
        self.root
            .join(&self.layout.models_dir)
            .join(&self.models_group)
    }

    pub fn run_dir(&self, run_id: &str) -> Result<PathBuf> {
        check_project_name(run_id)?;
        Ok(self.models_root().join(run_id))
    }

    /// Resolves a workspace-relative path (e.g. a training config).
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}

/// A project (or run) name must address exactly one directory level.
pub fn check_project_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => Ok(()),
        _ => Err(PipelineError::InvalidProjectName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws() -> Workspace {
        Workspace::new("/w", LayoutConfig::default(), "ct_code_summarization")
    }

    #[test]
    fn default_layout_paths() {
        let ws = ws();
        assert_eq!(ws.stage2_dir(), PathBuf::from("/w/data/stage2"));
        assert_eq!(
            ws.raw_dataset_dir(),
            PathBuf::from("/w/data/raw/code2seq/java-small")
        );
        assert_eq!(ws.stats_path(), PathBuf::from("/w/data/stage2/stats.json"));
        assert_eq!(
            ws.preprocessed_stage2_dir("guava").unwrap(),
            PathBuf::from("/w/preprocessed/guava/stage2")
        );
        assert_eq!(
            ws.results_dir("guava").unwrap(),
            PathBuf::from("/w/results/guava")
        );
        assert_eq!(
            ws.run_dir("CT-21").unwrap(),
            PathBuf::from("/w/models/ct_code_summarization/CT-21")
        );
    }

    #[test]
    fn project_names_stay_in_their_subtree() {
        for bad in ["", ".", "..", "a/b", "../x", "/abs", "a/"] {
            assert!(check_project_name(bad).is_err(), "{bad:?} accepted");
        }
        for ok in ["guava", "spring-boot", "proj.v2"] {
            assert!(check_project_name(ok).is_ok(), "{ok:?} rejected");
        }
    }
}
