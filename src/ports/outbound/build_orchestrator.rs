use crate::lifecycle::domain::BuildEvent;
use crate::shared::Result;
use async_trait::async_trait;

/// BuildOrchestrator port for notifying the external builder
///
/// A successful call only means the builder accepted the request; the build
/// result arrives later as a completion or failure report.
#[async_trait]
pub trait BuildOrchestrator: Send + Sync {
    /// Signals the external builder to start a build
    ///
    /// # Errors
    /// Returns an error if the builder could not be reached or refused the
    /// request. Callers log the failure and do not retry.
    async fn trigger_build(&self, event: &BuildEvent) -> Result<()>;
}

#[async_trait]
impl<T: BuildOrchestrator + ?Sized> BuildOrchestrator for Box<T> {
    async fn trigger_build(&self, event: &BuildEvent) -> Result<()> {
        (**self).trigger_build(event).await
    }
}
