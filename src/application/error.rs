//! Application-level errors (wraps domain errors)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::{AmbiguousTerm, BranchId, DomainError, FrameId};
use crate::infrastructure::traits::RegistryError;

/// Application errors wrap domain errors and add resolution and persistence failures.
///
/// Messages are meant for an automated caller: they carry candidate scores and
/// known branch names so the request can be retried with more specific input.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error(
        "Could not uniquely identify branches. {}. Please provide more specific names or use branch IDs.",
        describe_ambiguous(.0)
    )]
    AmbiguousMatch(Vec<AmbiguousTerm>),

    #[error("Branch with ID {0} not found.")]
    BranchNotFound(BranchId),

    #[error("Selected frame {0} not found.")]
    SelectedFrameNotFound(FrameId),

    #[error(
        "No branches found matching: {}. Available branches: {}",
        list(.terms),
        list(.available)
    )]
    NoBranchMatch {
        terms: Vec<String>,
        available: Vec<String>,
    },

    #[error(
        "Reference branch \"{reference}\" not found or has no frames. Available branches: {}",
        list(.available)
    )]
    ReferenceNotFound {
        reference: String,
        available: Vec<String>,
    },

    #[error("No branches with frames found to arrange.")]
    NoFrames,

    #[error(transparent)]
    Persistence(#[from] RegistryError),

    #[error("config error: {message}")]
    Config { message: String },
}

fn list(items: &[String]) -> String {
    items.join(", ")
}

fn describe_ambiguous(terms: &[AmbiguousTerm]) -> String {
    terms
        .iter()
        .map(|t| {
            format!(
                "Ambiguous match for \"{}\": {}",
                t.term,
                t.candidates
                    .iter()
                    .map(|c| format!("\"{}\" (score: {})", c.branch.name, c.score))
                    .join(", ")
            )
        })
        .join("; ")
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
