//! Command dispatch
//!
//! Loads settings and the workspace file, wires the service container and
//! renders results. Only `arrange` writes the workspace back.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{ArrangeOutcome, ArrangeRequest, ArrangementPlan};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Direction, FuzzyResolution, WorkspaceBounds};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::store::WorkspaceFile;
use crate::infrastructure::traits::{BranchRegistry, FrameRegistry};
use crate::infrastructure::workspace::InMemoryWorkspace;

/// Options of the `arrange` command after parsing.
#[derive(Debug, Default)]
pub struct ArrangeArgs<'a> {
    pub ids: &'a [String],
    pub names: &'a [String],
    pub relative_to: Option<&'a str>,
    pub direction: Option<Direction>,
    pub spacing: Option<f64>,
    pub ignore_selection: bool,
    pub dry_run: bool,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Arrange {
            ids,
            names,
            relative_to,
            direction,
            spacing,
            ignore_selection,
            dry_run,
        } => {
            let args = ArrangeArgs {
                ids,
                names,
                relative_to: relative_to.as_deref(),
                direction: *direction,
                spacing: *spacing,
                ignore_selection: *ignore_selection,
                dry_run: *dry_run,
            };
            let (container, workspace, file) = open_workspace(cli)?;
            cmd_arrange(&container, &workspace, &file, &args)
        }
        Commands::Resolve { terms } => {
            let (container, _, _) = open_workspace(cli)?;
            cmd_resolve(&container, terms)
        }
        Commands::Bounds => {
            let (container, _, _) = open_workspace(cli)?;
            cmd_bounds(&container)
        }
        Commands::List => {
            let (container, _, _) = open_workspace(cli)?;
            cmd_list(&container)
        }
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| crate::infrastructure::InfraError::io("get current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = project_dir(cli)?;
    Ok(Settings::load(Some(&dir))?)
}

/// Load settings and the workspace file, then wire the registries.
#[instrument(skip(cli))]
fn open_workspace(
    cli: &Cli,
) -> CliResult<(ServiceContainer, Arc<InMemoryWorkspace>, WorkspaceFile)> {
    let settings = load_settings(cli)?;
    let path = cli
        .workspace
        .clone()
        .unwrap_or_else(|| settings.workspace.clone());
    debug!("workspace file: {}", path.display());

    let file = WorkspaceFile::new(path);
    let workspace = Arc::new(InMemoryWorkspace::new(file.load()?));
    let container = ServiceContainer::new(settings, workspace.clone());
    Ok((container, workspace, file))
}

#[instrument(skip(container, workspace, file))]
pub fn cmd_arrange(
    container: &ServiceContainer,
    workspace: &InMemoryWorkspace,
    file: &WorkspaceFile,
    args: &ArrangeArgs<'_>,
) -> CliResult<()> {
    let settings = &container.settings;

    let selected = if args.ignore_selection {
        Vec::new()
    } else {
        container.frames.selected()
    };

    let mut request = ArrangeRequest::default()
        .with_selected_frames(selected.into_iter().map(|f| f.id))
        .with_branch_ids(args.ids.iter().cloned())
        .with_branch_names(args.names.iter().cloned())
        .with_direction(args.direction.unwrap_or(settings.arrange.direction))
        .with_spacing(args.spacing.unwrap_or(settings.arrange.spacing));
    if let Some(reference) = args.relative_to {
        request = request.relative_to(reference);
    }
    debug!("{}", request.label());

    let service = container.arrange_service()?;
    let outcome = if args.dry_run {
        service.plan(&request)?
    } else {
        service.arrange(&request)?
    };

    match &outcome {
        ArrangeOutcome::NothingToArrange(message) => output::warning(message),
        ArrangeOutcome::Arranged(plan) => {
            output::info(&plan_tree(plan));
            if args.dry_run {
                output::action("Dry run", "workspace not modified");
            } else {
                file.save(&workspace.snapshot())?;
                output::success(&plan.summary());
            }
        }
    }
    Ok(())
}

/// Render a plan as a tree: branch → frame moves.
pub fn plan_tree(plan: &ArrangementPlan) -> Tree<String> {
    let root = match &plan.reference {
        Some(reference) => format!("{} (relative to {})", plan.direction, reference.name),
        None => plan.direction.to_string(),
    };
    let mut tree = Tree::new(root);
    for placement in &plan.placements {
        let leaves = placement
            .frames
            .iter()
            .map(|f| Tree::new(format!("{}: {} -> {}", f.frame_id, f.from, f.to)));
        tree.push(Tree::new(placement.branch.name.clone()).with_leaves(leaves));
    }
    tree
}

fn cmd_resolve(container: &ServiceContainer, terms: &[String]) -> CliResult<()> {
    let resolver = *container.arrange_service()?.resolver();
    let branches = container.branches.list();

    for term in terms {
        let FuzzyResolution {
            matches, ambiguous, ..
        } = resolver.resolve(&[term], &branches);
        let outcome = match (matches.first(), ambiguous.is_empty()) {
            (Some(branch), _) => format!("{term:?} -> {} ({})", branch.name, branch.id),
            (None, false) => format!("{term:?} is ambiguous"),
            (None, true) => format!("{term:?} matches nothing"),
        };

        let candidates = resolver
            .rank(term, &branches)
            .into_iter()
            .filter(|c| c.score > 0)
            .take(container.settings.fuzzy.max_candidates)
            .map(|c| Tree::new(format!("{} ({}) score {}", c.branch.name, c.branch.id, c.score)));
        let tree = Tree::new(outcome).with_leaves(candidates);

        match (matches.is_empty(), ambiguous.is_empty()) {
            (false, _) => output::success(&tree),
            (true, false) => output::warning(&tree),
            (true, true) => output::failure(&tree),
        }
    }
    Ok(())
}

fn cmd_bounds(container: &ServiceContainer) -> CliResult<()> {
    let frames = container.frames.list();
    let bounds = WorkspaceBounds::from_frames(&frames);
    output::action("Bounds", &bounds);
    output::action("Size", &format!("{} x {}", bounds.width(), bounds.height()));
    Ok(())
}

fn cmd_list(container: &ServiceContainer) -> CliResult<()> {
    let selected: Vec<_> = container
        .frames
        .selected()
        .into_iter()
        .map(|f| f.id)
        .collect();

    let mut tree = Tree::new("branches".to_string());
    for branch in container.branches.list() {
        let leaves = container.frames.list_by_branch(&branch.id).into_iter().map(|f| {
            let marker = if selected.contains(&f.id) { " *" } else { "" };
            Tree::new(format!("{} {} {}{}", f.id, f.position, f.dimension, marker))
        });
        let label = match &branch.description {
            Some(d) => format!("{} [{}] {}", branch.name, branch.id, d),
            None => format!("{} [{}]", branch.name, branch.id),
        };
        tree.push(Tree::new(label).with_leaves(leaves));
    }
    output::info(&tree);
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let dir = project_dir(cli)?;
            show_path("Global", global_config_path().as_deref());
            show_path("Local", Some(&local_config_path(&dir)));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn show_path(label: &str, path: Option<&Path>) {
    match path {
        Some(p) if p.exists() => output::action(label, &p.display()),
        Some(p) => output::action(label, &format!("{} (not found)", p.display())),
        None => output::action(label, "(unavailable)"),
    }
}
