use crate::shared::error::LifecycleError;

/// Type alias for Result with anyhow::Error as the error type.
/// Used by the CLI, configuration and output layers.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Result of a build lifecycle operation.
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;
