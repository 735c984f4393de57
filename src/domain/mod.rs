//! Domain layer: entities and layout algorithms
//!
//! This layer is independent of external concerns (no registries, no I/O, no config loading).

pub mod bounds;
pub mod collision;
pub mod entities;
pub mod error;
pub mod fuzzy;

pub use bounds::WorkspaceBounds;
pub use collision::{is_free, resolve_collision, resolve_group};
pub use entities::*;
pub use error::DomainError;
pub use fuzzy::{AmbiguousTerm, FuzzyResolution, FuzzyResolver, MatchPolicy, ScoredBranch};
