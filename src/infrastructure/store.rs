//! TOML workspace file
//!
//! Loads a workspace snapshot from disk and writes it back atomically
//! (temp file in the same directory, then rename).

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::infrastructure::workspace::WorkspaceSnapshot;
use crate::infrastructure::{InfraError, InfraResult};

/// A workspace snapshot stored as TOML.
#[derive(Debug, Clone)]
pub struct WorkspaceFile {
    path: PathBuf,
}

impl WorkspaceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the snapshot.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> InfraResult<WorkspaceSnapshot> {
        if !self.path.exists() {
            return Err(InfraError::WorkspaceMissing(self.path.clone()));
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| InfraError::io(format!("read {}", self.path.display()), e))?;
        let snapshot: WorkspaceSnapshot =
            toml::from_str(&content).map_err(|e| InfraError::workspace(&self.path, e))?;
        snapshot
            .validate()
            .map_err(|e| InfraError::workspace(&self.path, e))?;
        debug!(
            "load: {} branches, {} frames",
            snapshot.branches.len(),
            snapshot.frames.len()
        );
        Ok(snapshot)
    }

    /// Replace the file content with `snapshot`.
    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    pub fn save(&self, snapshot: &WorkspaceSnapshot) -> InfraResult<()> {
        let content =
            toml::to_string_pretty(snapshot).map_err(|e| InfraError::workspace(&self.path, e))?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| InfraError::io(format!("create temp file in {}", dir.display()), e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| InfraError::io("write temp workspace file", e))?;
        tmp.persist(&self.path)
            .map_err(|e| InfraError::io(format!("replace {}", self.path.display()), e.error))?;

        debug!("save: wrote {} bytes", content.len());
        Ok(())
    }
}
