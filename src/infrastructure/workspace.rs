//! In-memory workspace registries
//!
//! A point-in-time snapshot of branches and frames, shared behind a lock so
//! position updates can be written concurrently.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Branch, BranchId, DomainError, Frame, FrameId, Point};
use crate::infrastructure::traits::{
    BranchRegistry, FrameRegistry, RegistryError, RegistryResult,
};

/// A frame plus its UI selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl From<Frame> for FrameRecord {
    fn from(frame: Frame) -> Self {
        Self {
            frame,
            selected: false,
        }
    }
}

/// Serializable content of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSnapshot {
    pub branches: Vec<Branch>,
    pub frames: Vec<FrameRecord>,
}

/// Structural problem in a workspace snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("duplicate branch id: {0}")]
    DuplicateBranch(BranchId),

    #[error("duplicate frame id: {0}")]
    DuplicateFrame(FrameId),

    #[error("frame {frame} references unknown branch {branch}")]
    UnknownBranch { frame: FrameId, branch: BranchId },

    #[error(transparent)]
    Geometry(#[from] DomainError),
}

impl WorkspaceSnapshot {
    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame.into());
        self
    }

    pub fn with_selected_frame(mut self, frame: Frame) -> Self {
        self.frames.push(FrameRecord {
            frame,
            selected: true,
        });
        self
    }

    /// Check ids are unique, frames belong to known branches and geometry is finite.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut branch_ids = HashSet::new();
        for branch in &self.branches {
            if !branch_ids.insert(&branch.id) {
                return Err(SnapshotError::DuplicateBranch(branch.id.clone()));
            }
        }
        let mut frame_ids = HashSet::new();
        for FrameRecord { frame, .. } in &self.frames {
            if !frame_ids.insert(&frame.id) {
                return Err(SnapshotError::DuplicateFrame(frame.id.clone()));
            }
            if !branch_ids.contains(&frame.branch_id) {
                return Err(SnapshotError::UnknownBranch {
                    frame: frame.id.clone(),
                    branch: frame.branch_id.clone(),
                });
            }
            frame.validate()?;
        }
        Ok(())
    }
}

/// Branch and frame registries backed by one in-memory snapshot.
#[derive(Debug, Default)]
pub struct InMemoryWorkspace {
    state: RwLock<WorkspaceSnapshot>,
}

impl InMemoryWorkspace {
    pub fn new(snapshot: WorkspaceSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Copy of the current state, including positions written so far.
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn frame(&self, id: &FrameId) -> Option<Frame> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .frames
            .iter()
            .find(|r| &r.frame.id == id)
            .map(|r| r.frame.clone())
    }
}

impl BranchRegistry for InMemoryWorkspace {
    fn list(&self) -> Vec<Branch> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .branches
            .clone()
    }

    fn get(&self, id: &BranchId) -> Option<Branch> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .branches
            .iter()
            .find(|b| &b.id == id)
            .cloned()
    }
}

impl FrameRegistry for InMemoryWorkspace {
    fn list(&self) -> Vec<Frame> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .frames
            .iter()
            .map(|r| r.frame.clone())
            .collect()
    }

    fn selected(&self) -> Vec<Frame> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .frames
            .iter()
            .filter(|r| r.selected)
            .map(|r| r.frame.clone())
            .collect()
    }

    fn update_position(&self, frame_id: &FrameId, position: Point) -> RegistryResult<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let record = state
            .frames
            .iter_mut()
            .find(|r| &r.frame.id == frame_id)
            .ok_or_else(|| RegistryError::FrameNotFound(frame_id.clone()))?;
        debug!(
            "update_position: frame={} {} -> {}",
            frame_id, record.frame.position, position
        );
        record.frame.position = position;
        Ok(())
    }
}
