//! Shared helpers for tests: logging setup and workspace fixtures

use std::env;
use std::sync::{Arc, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Branch, Frame, Point, Size};
use crate::infrastructure::workspace::{InMemoryWorkspace, WorkspaceSnapshot};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let noisy_modules = ["rayon"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // RUST_LOG wins, otherwise debug
    let env_filter = match env::var("RUST_LOG") {
        Ok(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        Err(_) => EnvFilter::new("debug"),
    };

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Frame of the given size at (x, y).
pub fn frame(id: &str, branch: &str, x: f64, y: f64, width: f64, height: f64) -> Frame {
    Frame::new(id, branch, Point::new(x, y), Size::new(width, height))
}

/// Workspace with one branch per `(id, name)` pair and the given frames.
pub fn workspace(branches: &[(&str, &str)], frames: Vec<Frame>) -> Arc<InMemoryWorkspace> {
    let snapshot = branches
        .iter()
        .fold(WorkspaceSnapshot::default(), |s, (id, name)| {
            s.with_branch(Branch::new(*id, *name))
        });
    let snapshot = frames.into_iter().fold(snapshot, WorkspaceSnapshot::with_frame);
    Arc::new(InMemoryWorkspace::new(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::FrameRegistry;

    #[test]
    fn given_fixture_when_building_workspace_then_frames_are_listed() {
        init_test_setup();
        let ws = workspace(
            &[("a", "A")],
            vec![frame("a1", "a", 0.0, 0.0, 10.0, 10.0)],
        );
        assert_eq!(FrameRegistry::list(ws.as_ref()).len(), 1);
    }
}
