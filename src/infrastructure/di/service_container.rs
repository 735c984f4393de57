//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::ArrangeService;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{BranchRegistry, FrameRegistry};
use crate::infrastructure::workspace::InMemoryWorkspace;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Branch lookup
    pub branches: Arc<dyn BranchRegistry>,

    /// Frame lookup and position writes
    pub frames: Arc<dyn FrameRegistry>,
}

impl ServiceContainer {
    /// Create a container backed by one in-memory workspace.
    pub fn new(settings: Settings, workspace: Arc<InMemoryWorkspace>) -> Self {
        Self::with_deps(settings, workspace.clone(), workspace)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        branches: Arc<dyn BranchRegistry>,
        frames: Arc<dyn FrameRegistry>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            branches,
            frames,
        }
    }

    /// Arrange service configured from settings.
    pub fn arrange_service(&self) -> ApplicationResult<ArrangeService> {
        let resolver = self.settings.fuzzy_resolver()?;
        Ok(
            ArrangeService::new(self.branches.clone(), self.frames.clone())
                .with_resolver(resolver)
                .with_row_tolerance(self.settings.arrange.row_tolerance),
        )
    }
}
