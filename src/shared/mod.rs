/// Shared error types and result aliases used across all layers
pub mod error;
pub mod result;

pub use error::{AppError, ExitCode, LifecycleError};
pub use result::{LifecycleResult, Result};
