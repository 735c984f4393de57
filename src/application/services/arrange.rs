//! Branch arrangement service
//!
//! Runs the arrangement pipeline: identify branches, aggregate their frames,
//! resolve the optional reference, compute workspace bounds, assign positions
//! and persist them. Every stage fails fast with a message an automated caller
//! can act on.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::services::layout::{GroupPlacement, Layout, DEFAULT_ROW_TOLERANCE};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    Branch, BranchGroup, BranchId, Direction, DomainError, Frame, FrameId, FuzzyResolver,
    Placed, WorkspaceBounds,
};
use crate::infrastructure::traits::{BranchRegistry, FrameRegistry, RegistryResult};

pub const DEFAULT_SPACING: f64 = 100.0;

/// What to arrange and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangeRequest {
    /// Frames selected by the user; their branches win over every other source
    pub selected_frames: Vec<FrameId>,
    pub branch_ids: Vec<BranchId>,
    /// Free-text names or descriptions, resolved fuzzily
    pub branch_names: Vec<String>,
    /// Branch id or fuzzy name to lay out next to
    pub relative_to: Option<String>,
    pub direction: Direction,
    pub spacing: f64,
}

impl Default for ArrangeRequest {
    fn default() -> Self {
        Self {
            selected_frames: Vec::new(),
            branch_ids: Vec::new(),
            branch_names: Vec::new(),
            relative_to: None,
            direction: Direction::default(),
            spacing: DEFAULT_SPACING,
        }
    }
}

impl ArrangeRequest {
    pub fn with_selected_frames(mut self, frames: impl IntoIterator<Item = FrameId>) -> Self {
        self.selected_frames = frames.into_iter().collect();
        self
    }

    pub fn with_branch_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branch_ids = ids.into_iter().map(BranchId::new).collect();
        self
    }

    pub fn with_branch_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branch_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn relative_to(mut self, reference: impl Into<String>) -> Self {
        self.relative_to = Some(reference.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Short progress label, e.g. "Arranging 3 branches".
    pub fn label(&self) -> String {
        let count = if !self.branch_ids.is_empty() {
            self.branch_ids.len()
        } else {
            self.branch_names.len()
        };
        match count {
            0 => "Arranging selected branches".to_string(),
            1 => "Arranging 1 branch".to_string(),
            n => format!("Arranging {n} branches"),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(DomainError::InvalidSpacing(self.spacing));
        }
        Ok(())
    }
}

/// Computed positions for one arrangement call.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangementPlan {
    pub bounds: WorkspaceBounds,
    pub direction: Direction,
    pub reference: Option<Branch>,
    /// Groups in the order they were placed
    pub placements: Vec<GroupPlacement>,
}

impl ArrangementPlan {
    pub fn branch_names(&self) -> Vec<&str> {
        self.placements
            .iter()
            .map(|p| p.branch.name.as_str())
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.placements.iter().map(|p| p.frames.len()).sum()
    }

    pub fn summary(&self) -> String {
        let n = self.placements.len();
        format!(
            "Successfully arranged {} branch{}: {}. All frames moved together maintaining relative positions, with no overlaps.",
            n,
            if n == 1 { "" } else { "es" },
            self.branch_names().join(", ")
        )
    }
}

/// Result of a request that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrangeOutcome {
    /// Fewer than two branches: valid, nothing moved
    NothingToArrange(String),
    Arranged(ArrangementPlan),
}

impl ArrangeOutcome {
    pub fn plan(&self) -> Option<&ArrangementPlan> {
        match self {
            ArrangeOutcome::Arranged(plan) => Some(plan),
            ArrangeOutcome::NothingToArrange(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ArrangeOutcome::NothingToArrange(message) => message.clone(),
            ArrangeOutcome::Arranged(plan) => plan.summary(),
        }
    }
}

impl fmt::Display for ArrangeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Service arranging branches on the canvas.
pub struct ArrangeService {
    branches: Arc<dyn BranchRegistry>,
    frames: Arc<dyn FrameRegistry>,
    resolver: FuzzyResolver,
    row_tolerance: f64,
}

impl ArrangeService {
    /// Create a new arrange service.
    pub fn new(branches: Arc<dyn BranchRegistry>, frames: Arc<dyn FrameRegistry>) -> Self {
        Self {
            branches,
            frames,
            resolver: FuzzyResolver::default(),
            row_tolerance: DEFAULT_ROW_TOLERANCE,
        }
    }

    pub fn with_resolver(mut self, resolver: FuzzyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_row_tolerance(mut self, row_tolerance: f64) -> Self {
        self.row_tolerance = row_tolerance;
        self
    }

    pub fn resolver(&self) -> &FuzzyResolver {
        &self.resolver
    }

    /// Plan and persist an arrangement.
    #[instrument(skip(self), fields(label = %request.label()))]
    pub fn arrange(&self, request: &ArrangeRequest) -> ApplicationResult<ArrangeOutcome> {
        let outcome = self.plan(request)?;
        if let ArrangeOutcome::Arranged(plan) = &outcome {
            self.persist(plan)?;
            info!("arrange: {}", plan.summary());
        }
        Ok(outcome)
    }

    /// Compute an arrangement without writing anything.
    pub fn plan(&self, request: &ArrangeRequest) -> ApplicationResult<ArrangeOutcome> {
        request.validate()?;

        let all_frames = self.frames.list();
        for frame in &all_frames {
            frame.validate()?;
        }

        let targets = match self.identify(request, &all_frames)? {
            Identified::Branches(branches) => branches,
            Identified::Nothing(message) => {
                info!("plan: {}", message);
                return Ok(ArrangeOutcome::NothingToArrange(message));
            }
        };

        let groups = self.aggregate(targets)?;

        let reference = request
            .relative_to
            .as_deref()
            .map(|r| self.resolve_reference(r))
            .transpose()?;

        let bounds = WorkspaceBounds::from_frames(&all_frames);
        debug!("plan: workspace bounds {}", bounds);

        let moving: HashSet<&FrameId> = groups
            .iter()
            .filter(|g| !reference.as_ref().is_some_and(|r| r.branch().id == g.branch().id))
            .flat_map(BranchGroup::frame_ids)
            .collect();
        let obstacles: Vec<Placed> = all_frames
            .iter()
            .filter(|f| !moving.contains(&f.id))
            .map(Placed::from)
            .collect();

        let layout = Layout {
            bounds,
            direction: request.direction,
            spacing: request.spacing,
            row_tolerance: self.row_tolerance,
        };
        let placements = layout.assign(&groups, reference.as_ref(), obstacles);

        if placements.is_empty() {
            return Ok(ArrangeOutcome::NothingToArrange(
                "Only the reference branch was specified. Nothing to arrange.".to_string(),
            ));
        }

        Ok(ArrangeOutcome::Arranged(ArrangementPlan {
            bounds,
            direction: request.direction,
            reference: reference.map(|r| r.branch().clone()),
            placements,
        }))
    }

    /// Stage A: first non-empty source wins (selection, ids, fuzzy names).
    fn identify(
        &self,
        request: &ArrangeRequest,
        all_frames: &[Frame],
    ) -> ApplicationResult<Identified> {
        let mut ids: Vec<BranchId> = Vec::new();

        for frame_id in &request.selected_frames {
            let frame = all_frames
                .iter()
                .find(|f| &f.id == frame_id)
                .ok_or_else(|| ApplicationError::SelectedFrameNotFound(frame_id.clone()))?;
            ids.push(frame.branch_id.clone());
        }

        if ids.is_empty() {
            ids = request.branch_ids.clone();
        }

        if ids.is_empty() && !request.branch_names.is_empty() {
            let all_branches = self.branches.list();
            let resolution = self.resolver.resolve(&request.branch_names, &all_branches);

            if !resolution.ambiguous.is_empty() {
                return Err(ApplicationError::AmbiguousMatch(resolution.ambiguous));
            }
            if !resolution.unmatched.is_empty() || resolution.matches.is_empty() {
                let terms = if resolution.unmatched.is_empty() {
                    request.branch_names.clone()
                } else {
                    resolution.unmatched
                };
                return Err(ApplicationError::NoBranchMatch {
                    terms,
                    available: names(&all_branches),
                });
            }
            ids = resolution.matches.into_iter().map(|b| b.id).collect();
        }

        let ids: Vec<BranchId> = ids.into_iter().unique().collect();
        debug!("identify: {} target branches", ids.len());

        let mut branches = Vec::with_capacity(ids.len());
        for id in ids {
            let branch = self
                .branches
                .get(&id)
                .ok_or(ApplicationError::BranchNotFound(id))?;
            branches.push(branch);
        }

        Ok(match branches.len() {
            0 => Identified::Nothing(
                "No branches selected or specified. Nothing to arrange.".to_string(),
            ),
            1 => Identified::Nothing("Only one branch specified. Nothing to arrange.".to_string()),
            _ => Identified::Branches(branches),
        })
    }

    /// Stage B: one rigid group per branch that has frames.
    fn aggregate(&self, branches: Vec<Branch>) -> ApplicationResult<Vec<BranchGroup>> {
        let groups: Vec<BranchGroup> = branches
            .into_iter()
            .filter_map(|branch| {
                let frames = self.frames.list_by_branch(&branch.id);
                if frames.is_empty() {
                    debug!("aggregate: skipping {} (no frames)", branch.name);
                }
                BranchGroup::new(branch, frames)
            })
            .collect();

        if groups.is_empty() {
            return Err(ApplicationError::NoFrames);
        }
        debug!("aggregate: {} groups with frames", groups.len());
        Ok(groups)
    }

    /// Stage C: exact id first, then fuzzy match over all branches.
    fn resolve_reference(&self, reference: &str) -> ApplicationResult<BranchGroup> {
        let by_id = self
            .branches
            .get(&BranchId::new(reference))
            .and_then(|branch| self.group_for(branch));
        if let Some(group) = by_id {
            debug!("resolve_reference: {:?} matched by id", reference);
            return Ok(group);
        }

        let all_branches = self.branches.list();
        let resolution = self.resolver.resolve(&[reference], &all_branches);
        if let Some(group) = resolution
            .matches
            .into_iter()
            .next()
            .and_then(|branch| self.group_for(branch))
        {
            debug!(
                "resolve_reference: {:?} matched {}",
                reference,
                group.branch().name
            );
            return Ok(group);
        }

        if !resolution.ambiguous.is_empty() {
            return Err(ApplicationError::AmbiguousMatch(resolution.ambiguous));
        }
        Err(ApplicationError::ReferenceNotFound {
            reference: reference.to_string(),
            available: names(&all_branches),
        })
    }

    fn group_for(&self, branch: Branch) -> Option<BranchGroup> {
        let frames = self.frames.list_by_branch(&branch.id);
        BranchGroup::new(branch, frames)
    }

    /// Stage F: one update per frame, issued in parallel. Fails on the first
    /// rejected update; updates already applied stay applied.
    fn persist(&self, plan: &ArrangementPlan) -> ApplicationResult<()> {
        let updates: Vec<_> = plan
            .placements
            .iter()
            .flat_map(|p| p.frames.iter())
            .collect();

        let results: Vec<RegistryResult<()>> = updates
            .par_iter()
            .map(|f| self.frames.update_position(&f.frame_id, f.to))
            .collect();

        for result in results {
            result?;
        }

        debug!("persist: updated {} frames", updates.len());
        Ok(())
    }
}

enum Identified {
    Branches(Vec<Branch>),
    Nothing(String),
}

fn names(branches: &[Branch]) -> Vec<String> {
    branches.iter().map(|b| b.name.clone()).collect()
}
