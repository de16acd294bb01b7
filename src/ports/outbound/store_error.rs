use thiserror::Error;

/// Failures reported by persistence adapters
///
/// Use cases attach the name of the failing step when converting these
/// into `LifecycleError::Persistence`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored data is inconsistent: {0}")]
    Corrupt(String),

    #[error("storage connection lock was poisoned by a panicked task")]
    LockPoisoned,

    #[error("storage task did not complete: {0}")]
    TaskFailed(String),

    #[error("caller stopped waiting before the write was applied")]
    Abandoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
