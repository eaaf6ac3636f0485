use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{PipelineError, Result};
use crate::schema::RAW_SPLIT_DIRS;
use crate::workspace::Workspace;

/// Replaces `data/stage2` with the project's preprocessed stage2 tree.
///
/// The working tree must exist beforehand; it is deleted unconditionally.
pub fn stage_preprocessed(ws: &Workspace, project: &str) -> Result<()> {
    let src = ws.preprocessed_stage2_dir(project)?;
    if !src.is_dir() {
        return Err(PipelineError::MissingSource(src));
    }
    let dst = ws.stage2_dir();
    remove_existing_tree(&dst)?;
    copy_tree(&src, &dst)?;
    info!(project, src = %src.display(), dst = %dst.display(), "staged preprocessed data");
    Ok(())
}

/// Resets `data/` to an empty preprocessing layout and copies the project's
/// raw splits into `data/raw/<fmt>/<dataset>`.
pub fn reset_raw_layout(ws: &Workspace, project: &str) -> Result<()> {
    let project_dir = ws.raw_project_dir(project)?;
    for (split, _) in RAW_SPLIT_DIRS {
        let src = project_dir.join(split);
        if !src.is_dir() {
            return Err(PipelineError::MissingSource(src));
        }
    }

    remove_existing_tree(&ws.data_dir())?;
    let raw = ws.raw_dataset_dir();
    std::fs::create_dir_all(&raw)?;
    std::fs::create_dir(ws.stage1_dir())?;
    std::fs::create_dir(ws.stage2_dir())?;

    for (split, target) in RAW_SPLIT_DIRS {
        copy_tree(&project_dir.join(split), &raw.join(target))?;
    }
    info!(project, raw = %raw.display(), "reset data layout");
    Ok(())
}

/// Copies the whole `data/` tree to `preprocessed/<project>`.
pub fn archive_processed(ws: &Workspace, project: &str) -> Result<()> {
    let dst = ws.preprocessed_dir(project)?;
    if dst.exists() {
        return Err(PipelineError::PathConflict(dst));
    }
    let src = ws.data_dir();
    if !src.is_dir() {
        return Err(PipelineError::MissingSource(src));
    }
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    copy_tree(&src, &dst)?;
    info!(project, dst = %dst.display(), "archived processed data");
    Ok(())
}

fn remove_existing_tree(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(PipelineError::MissingPath(path.to_path_buf()));
    }
    std::fs::remove_dir_all(path)?;
    Ok(())
}

/// Recursive copy of `src` into a not-yet-existing `dst`.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(PipelineError::MissingSource(src.to_path_buf()));
    }
    if dst.exists() {
        return Err(PipelineError::PathConflict(dst.to_path_buf()));
    }

    let mut files = 0usize;
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| PipelineError::Io(e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| PipelineError::MissingSource(entry.path().to_path_buf()))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    debug!(src = %src.display(), dst = %dst.display(), files, "copied tree");
    Ok(())
}
