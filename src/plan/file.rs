//! Plan files on disk: YAML, one plan per file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Plan, Result};

/// Reads and writes a plan at a fixed path.
#[derive(Debug, Clone)]
pub struct FilePlanner {
    path: PathBuf,
}

impl FilePlanner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a plan file exists at the path.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn read(&self) -> Result<Plan> {
        debug!(path = %self.path.display(), "reading plan");
        let yaml = fs::read_to_string(&self.path)?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Write the plan, creating parent directories as needed.
    pub fn write(&self, plan: &Plan) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(plan)?;
        fs::write(&self.path, yaml)?;
        debug!(path = %self.path.display(), "wrote plan");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::plan::PlanError;
    use crate::plan::tests::sample_plan;

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let planner = FilePlanner::new(dir.path().join("nested").join("cluster.yaml"));
        assert!(!planner.exists());

        let plan = sample_plan();
        planner.write(&plan).unwrap();

        assert!(planner.exists());
        assert_eq!(planner.read().unwrap(), plan);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let planner = FilePlanner::new(dir.path().join("missing.yaml"));
        assert!(matches!(planner.read().unwrap_err(), PlanError::Io(_)));
    }

    #[test]
    fn read_garbage_is_yaml_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "etcd: [unclosed").unwrap();

        let err = FilePlanner::new(path).read().unwrap_err();
        assert!(matches!(err, PlanError::Yaml(_)));
    }

    #[test]
    fn directory_is_not_a_plan() {
        let dir = TempDir::new().unwrap();
        assert!(!FilePlanner::new(dir.path()).exists());
    }
}
