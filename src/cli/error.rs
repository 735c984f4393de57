//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::WorkspaceMissing(_) => crate::exitcode::NOINPUT,
                InfraError::Workspace { .. } => crate::exitcode::DATAERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Persistence(_) => crate::exitcode::IOERR,
                    ApplicationError::Domain(_) => crate::exitcode::USAGE,
                    _ => crate::exitcode::DATAERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_unresolved_branch_when_mapping_exit_code_then_dataerr() {
        let err: CliError = ApplicationError::NoFrames.into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_invalid_spacing_when_mapping_exit_code_then_usage() {
        let err: CliError = ApplicationError::Domain(DomainError::InvalidSpacing(-1.0)).into();
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }

    #[test]
    fn given_missing_command_when_mapping_exit_code_then_usage() {
        let err = CliError::Usage("no command given, see --help".to_string());
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }
}
