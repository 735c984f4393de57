//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Tests pass explicit global/local paths to `Settings::load_from`, so neither
//! the real XDG config nor CANVAS_* environment variables take part.

use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use canvas_arrange::application::ApplicationError;
use canvas_arrange::config::{local_config_path, Settings};
use canvas_arrange::domain::{Direction, MatchPolicy};

#[test]
fn given_global_and_local_config_when_loading_then_local_wins_per_field() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("global.toml");
    let local = local_config_path(dir.path());
    fs::write(
        &global,
        r#"
workspace = "/tmp/canvas/global.toml"

[arrange]
spacing = 40.0
direction = "vertical"

[fuzzy]
policy = "unique"
"#,
    )
    .unwrap();
    fs::write(
        &local,
        r#"
[arrange]
spacing = 60.0
"#,
    )
    .unwrap();

    let settings = Settings::load_from(Some(&global), Some(&local)).expect("load");

    assert_eq!(settings.arrange.spacing, 60.0, "local overrides global");
    assert_eq!(settings.arrange.direction, Direction::Vertical, "global kept");
    assert_eq!(settings.fuzzy.policy, MatchPolicy::Unique);
    assert_eq!(settings.fuzzy.threshold, 0.7, "default kept");
    assert_eq!(
        settings.workspace,
        std::path::PathBuf::from("/tmp/canvas/global.toml")
    );
}

#[test]
fn given_missing_files_when_loading_then_defaults() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");

    let settings = Settings::load_from(Some(&absent), Some(&absent)).expect("load");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_path_when_computing_then_hidden_file_in_project_dir() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        local_config_path(dir.path()),
        dir.path().join(".canvas-arrange.toml")
    );
}

#[rstest]
#[case("[arrange]\nspacing = -5.0\n")]
#[case("[arrange]\nrow_tolerance = -1.0\n")]
#[case("[fuzzy]\nthreshold = 0.0\n")]
#[case("[fuzzy]\nthreshold = 1.5\n")]
#[case("[arrange]\ndirection = \"diagonal\"\n")]
#[case("[fuzzy]\npolicy = \"sometimes\"\n")]
#[case("[arrange\n")]
fn given_invalid_local_config_when_loading_then_config_error(#[case] content: &str) {
    let dir = TempDir::new().unwrap();
    let local = local_config_path(dir.path());
    fs::write(&local, content).unwrap();

    let err = Settings::load_from(None, Some(&local)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }), "{err}");
}

#[test]
fn given_settings_when_serializing_then_loads_back_identically() {
    let dir = TempDir::new().unwrap();
    let local = local_config_path(dir.path());
    let mut settings = Settings::default();
    settings.arrange.spacing = 25.0;
    settings.arrange.direction = Direction::Vertical;
    settings.fuzzy.max_candidates = 3;
    fs::write(&local, settings.to_toml().expect("to_toml")).unwrap();

    let loaded = Settings::load_from(None, Some(&local)).expect("load");

    assert_eq!(loaded, settings);
}

#[test]
fn given_settings_when_building_resolver_then_policy_and_threshold_apply() {
    let mut settings = Settings::default();
    settings.fuzzy.threshold = 0.5;
    settings.fuzzy.policy = MatchPolicy::Unique;

    let resolver = settings.fuzzy_resolver().expect("resolver");

    assert_eq!(resolver.threshold(), 0.5);
    assert_eq!(resolver.policy(), MatchPolicy::Unique);
}
