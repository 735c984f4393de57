//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::Direction;

/// Collision-free arrangement of canvas branches
#[derive(Parser, Debug)]
#[command(name = "canvas-arrange")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Workspace file (default: from settings)
    #[arg(short, long, global = true, env = "CANVAS_WORKSPACE", value_hint = ValueHint::FilePath)]
    pub workspace: Option<PathBuf>,

    /// Project directory for the local config file (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Arrange branches side by side without overlaps
    ///
    /// Targets come from the first non-empty source: the frames selected in
    /// the workspace, --id, then --name.
    Arrange {
        /// Branch id (repeatable)
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,

        /// Branch name or description, matched fuzzily (repeatable)
        #[arg(short, long = "name", value_name = "NAME")]
        names: Vec<String>,

        /// Lay out next to this branch (id or name); it does not move
        #[arg(short, long, value_name = "BRANCH")]
        relative_to: Option<String>,

        /// Layout axis (default: from settings)
        #[arg(long, value_parser = parse_direction)]
        direction: Option<Direction>,

        /// Minimum gap between frames (default: from settings)
        #[arg(short, long)]
        spacing: Option<f64>,

        /// Ignore the frame selection stored in the workspace
        #[arg(long)]
        ignore_selection: bool,

        /// Show the plan without writing the workspace
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which branches free-text terms resolve to
    Resolve {
        /// Terms to resolve
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Show the workspace bounds derived from all frames
    Bounds,

    /// List branches with their frames
    List,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    s.parse()
}
