use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Example counts per dataset split, as reported by `stats.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSizes(BTreeMap<String, u64>);

impl SplitSizes {
    pub fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|e| PipelineError::MalformedStats {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let value: serde_json::Value =
            serde_json::from_slice(&raw).map_err(|e| PipelineError::MalformedStats {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let obj = value
            .as_object()
            .ok_or_else(|| PipelineError::MalformedStats {
                path: path.to_path_buf(),
                reason: "expected a JSON object".to_string(),
            })?;

        // Non-count entries (e.g. vocabulary stats) are not split sizes.
        Ok(Self(
            obj.iter()
                .filter_map(|(k, v)| v.as_u64().map(|n| (k.clone(), n)))
                .collect(),
        ))
    }

    pub fn get(&self, split: &str) -> Result<u64> {
        self.0
            .get(split)
            .copied()
            .ok_or_else(|| PipelineError::MissingSplit(split.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for SplitSizes {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
