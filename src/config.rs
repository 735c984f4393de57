//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/canvas-arrange/canvas-arrange.toml`
//! 3. Local config: `<project_dir>/.canvas-arrange.toml`
//! 4. Environment variables: `CANVAS_*` prefix, `__` for nesting
//!    (e.g. `CANVAS_ARRANGE__SPACING=80`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::layout::DEFAULT_ROW_TOLERANCE;
use crate::application::services::DEFAULT_SPACING;
use crate::application::ApplicationError;
use crate::domain::fuzzy::{DEFAULT_MAX_CANDIDATES, DEFAULT_THRESHOLD};
use crate::domain::{Direction, FuzzyResolver, MatchPolicy};

const APP_NAME: &str = "canvas-arrange";
const ENV_PREFIX: &str = "CANVAS";

/// Layout defaults applied when a request does not say otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArrangeConfig {
    /// Minimum gap between frames in canvas units
    pub spacing: f64,
    /// Layout axis
    pub direction: Direction,
    /// Vertical band within which groups count as one row
    pub row_tolerance: f64,
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            direction: Direction::Horizontal,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
        }
    }
}

/// Fuzzy branch matching settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Minimum normalized score to accept a match
    pub threshold: f64,
    /// Candidates reported per ambiguous term
    pub max_candidates: usize,
    /// Handling of terms tied between several branches
    pub policy: MatchPolicy,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            policy: MatchPolicy::Independent,
        }
    }
}

/// Raw arrange config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawArrangeConfig {
    pub spacing: Option<f64>,
    pub direction: Option<Direction>,
    pub row_tolerance: Option<f64>,
}

/// Raw fuzzy config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFuzzyConfig {
    pub threshold: Option<f64>,
    pub max_candidates: Option<usize>,
    pub policy: Option<MatchPolicy>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub workspace: Option<PathBuf>,
    pub arrange: RawArrangeConfig,
    pub fuzzy: RawFuzzyConfig,
}

/// Unified configuration for canvas-arrange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Workspace file used when none is given on the command line
    pub workspace: PathBuf,
    pub arrange: ArrangeConfig,
    pub fuzzy: FuzzyConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("workspace.toml"),
            arrange: ArrangeConfig::default(),
            fuzzy: FuzzyConfig::default(),
        }
    }
}

/// Get the XDG config directory for canvas-arrange.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(format!(".{APP_NAME}.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with full precedence for the given project directory.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        let local = project_dir.map(local_config_path);
        let settings = Self::load_from(global.as_deref(), local.as_deref())?;
        let mut settings = Self::apply_env_overrides(settings)?;
        settings.workspace = expand_path(&settings.workspace);
        settings.validate()?;
        Ok(settings)
    }

    /// Merge defaults with the given config files (missing files are skipped).
    ///
    /// Does not read environment variables.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();
        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }
        current.validate()?;
        Ok(current)
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            workspace: overlay
                .workspace
                .clone()
                .unwrap_or_else(|| self.workspace.clone()),
            arrange: ArrangeConfig {
                spacing: overlay.arrange.spacing.unwrap_or(self.arrange.spacing),
                direction: overlay.arrange.direction.unwrap_or(self.arrange.direction),
                row_tolerance: overlay
                    .arrange
                    .row_tolerance
                    .unwrap_or(self.arrange.row_tolerance),
            },
            fuzzy: FuzzyConfig {
                threshold: overlay.fuzzy.threshold.unwrap_or(self.fuzzy.threshold),
                max_candidates: overlay
                    .fuzzy
                    .max_candidates
                    .unwrap_or(self.fuzzy.max_candidates),
                policy: overlay.fuzzy.policy.unwrap_or(self.fuzzy.policy),
            },
        }
    }

    /// Apply CANVAS_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("workspace") {
            settings.workspace = PathBuf::from(val);
        }
        if let Ok(val) = config.get_float("arrange.spacing") {
            settings.arrange.spacing = val;
        }
        if let Ok(val) = config.get_string("arrange.direction") {
            settings.arrange.direction = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_float("arrange.row_tolerance") {
            settings.arrange.row_tolerance = val;
        }
        if let Ok(val) = config.get_float("fuzzy.threshold") {
            settings.fuzzy.threshold = val;
        }
        if let Ok(val) = config.get_int("fuzzy.max_candidates") {
            settings.fuzzy.max_candidates = usize::try_from(val).unwrap_or(1);
        }
        if let Ok(val) = config.get_string("fuzzy.policy") {
            settings.fuzzy.policy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if !self.arrange.spacing.is_finite() || self.arrange.spacing < 0.0 {
            return Err(ApplicationError::Config {
                message: format!("arrange.spacing must be >= 0, got {}", self.arrange.spacing),
            });
        }
        if !self.arrange.row_tolerance.is_finite() || self.arrange.row_tolerance < 0.0 {
            return Err(ApplicationError::Config {
                message: format!(
                    "arrange.row_tolerance must be >= 0, got {}",
                    self.arrange.row_tolerance
                ),
            });
        }
        self.fuzzy_resolver().map(|_| ())
    }

    /// Build the fuzzy resolver described by these settings.
    pub fn fuzzy_resolver(&self) -> Result<FuzzyResolver, ApplicationError> {
        let resolver = FuzzyResolver::new(self.fuzzy.threshold).map_err(|e| {
            ApplicationError::Config {
                message: format!("fuzzy.threshold: {e}"),
            }
        })?;
        Ok(resolver
            .with_max_candidates(self.fuzzy.max_candidates)
            .with_policy(self.fuzzy.policy))
    }

    /// Serialize settings to TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {e}"),
        })
    }

    /// Commented template for a new config file.
    pub fn template() -> String {
        r#"# canvas-arrange configuration
#
# Global: $XDG_CONFIG_HOME/canvas-arrange/canvas-arrange.toml
# Local:  <project>/.canvas-arrange.toml
# Env:    CANVAS_ARRANGE__SPACING=80, CANVAS_FUZZY__POLICY=unique, ...

# Workspace file used when --workspace is not given
# workspace = "workspace.toml"

[arrange]
# Minimum gap between frames in canvas units
# spacing = 100.0
# horizontal | vertical
# direction = "horizontal"
# Groups whose primary frames are within this vertical band form one row
# row_tolerance = 50.0

[fuzzy]
# Minimum normalized score (0..1] to accept a name match
# threshold = 0.7
# Candidates listed per ambiguous term
# max_candidates = 5
# independent: each term picks its best branch
# unique: a term tied between branches is ambiguous
# policy = "independent"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.arrange.spacing, 100.0);
        assert_eq!(settings.fuzzy.threshold, 0.7);
    }

    #[test]
    fn given_template_when_parsing_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(raw.arrange.spacing.is_none());
    }

    #[test]
    fn given_overlay_when_merging_then_only_specified_fields_change() {
        let overlay = RawSettings {
            arrange: RawArrangeConfig {
                spacing: Some(40.0),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.arrange.spacing, 40.0);
        assert_eq!(merged.arrange.direction, Direction::Horizontal);
        assert_eq!(merged.fuzzy, FuzzyConfig::default());
    }

    #[test]
    fn given_tilde_in_workspace_when_expanding_then_expands_to_home() {
        let expanded = expand_path(Path::new("~/canvas/workspace.toml"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("canvas/workspace.toml"));
    }
}
