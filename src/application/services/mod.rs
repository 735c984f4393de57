//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on registry boundary traits (BranchRegistry, FrameRegistry)
//! but are themselves concrete structs, not traits.

mod arrange;
pub mod layout;

pub use arrange::{
    ArrangeOutcome, ArrangeRequest, ArrangeService, ArrangementPlan, DEFAULT_SPACING,
};
pub use layout::{FramePlacement, GroupPlacement, Layout};
