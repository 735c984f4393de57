//! Registry boundary traits for testability
//!
//! Branches and frames are owned outside this crate. These traits are the only
//! way the arrangement service reads them and writes frame positions back,
//! allowing services to be tested against in-memory registries.

use std::io;

use thiserror::Error;

use crate::domain::{Branch, BranchId, Frame, FrameId, Point};

/// Failure reported by a registry when writing a frame position.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("frame not found: {0}")]
    FrameNotFound(FrameId),

    #[error("update of frame {frame_id} rejected: {message}")]
    Rejected { frame_id: FrameId, message: String },

    #[error("registry I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Result type for registry writes.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Read-only view of the branch registry.
pub trait BranchRegistry: Send + Sync {
    /// All branches, in registry order.
    fn list(&self) -> Vec<Branch>;

    /// Look up one branch by id.
    fn get(&self, id: &BranchId) -> Option<Branch>;
}

/// Frame registry: reads frames, persists new positions.
pub trait FrameRegistry: Send + Sync {
    /// All frames across all branches, in registry order.
    fn list(&self) -> Vec<Frame>;

    /// Frames owned by one branch, in registry order.
    fn list_by_branch(&self, branch_id: &BranchId) -> Vec<Frame> {
        self.list()
            .into_iter()
            .filter(|f| &f.branch_id == branch_id)
            .collect()
    }

    /// Frames currently selected by the user.
    fn selected(&self) -> Vec<Frame>;

    /// Update and persist the position of one frame.
    fn update_position(&self, frame_id: &FrameId, position: Point) -> RegistryResult<()>;
}
