use crate::lifecycle::domain::{BuildEventId, BuildStatus};
use crate::ports::outbound::StoreError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow automation to distinguish a request the lifecycle
/// rejected from an infrastructure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// The lifecycle rejected the request (validation, not found, invalid transition)
    Rejected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (storage, configuration, file I/O, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Picks the exit code for an error surfaced by the CLI.
    pub fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<LifecycleError>() {
            Some(lifecycle) if lifecycle.is_rejection() => ExitCode::Rejected,
            _ => ExitCode::ApplicationError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::Rejected => write!(f, "Rejected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors surfaced by the build lifecycle core.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid state transition for build event {build_event_id}: {from} -> {to}\n\n💡 Hint: only pending build events can be completed or failed")]
    InvalidStateTransition {
        build_event_id: BuildEventId,
        from: BuildStatus,
        to: BuildStatus,
    },

    #[error("Persistence failure during {operation}: {details}")]
    Persistence { operation: String, details: String },

    #[error("Build trigger failed for build event {build_event_id}: {details}")]
    Trigger {
        build_event_id: BuildEventId,
        details: String,
    },
}

impl LifecycleError {
    pub fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        LifecycleError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wraps a storage failure with the name of the step that produced it.
    pub fn persistence(operation: impl fmt::Display, source: StoreError) -> Self {
        LifecycleError::Persistence {
            operation: operation.to_string(),
            details: source.to_string(),
        }
    }

    /// True for errors caused by the request rather than by infrastructure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LifecycleError::Validation { .. }
                | LifecycleError::NotFound { .. }
                | LifecycleError::InvalidStateTransition { .. }
        )
    }
}

/// Errors from the CLI's own I/O surface.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read completion payload: {source_name}\nDetails: {details}\n\n💡 Hint: The payload must be a JSON object with image_digest, tags, slsa_level, sboms and cves")]
    PayloadReadError { source_name: String, details: String },

    #[error("Operation timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },
}
