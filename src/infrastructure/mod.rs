//! Infrastructure layer: registry implementations and DI container
//!
//! This layer implements the registry boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod store;
pub mod traits;
pub mod workspace;

pub use error::{InfraError, InfraResult};
