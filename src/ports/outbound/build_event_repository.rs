use super::StoreResult;
use crate::lifecycle::domain::{
    BuildEvent, BuildEventId, BuildStatus, BuildTransition, NewBuildEvent, TenantNamespace,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of a conditional status update
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The stored status matched and the event was updated
    Applied(BuildEvent),
    /// No event exists with the given id
    Missing,
    /// The event exists but its status differed from the expected one
    Conflict(BuildStatus),
}

/// BuildEventRepository port for build event persistence
///
/// Build events are never deleted. The only mutation is `transition`, a
/// compare-and-set on the stored status.
#[async_trait]
pub trait BuildEventRepository: Send + Sync {
    /// Persists a new build event in `pending` state
    ///
    /// # Returns
    /// The stored event with its generated id and timestamps
    async fn create(&self, event: NewBuildEvent, now: DateTime<Utc>) -> StoreResult<BuildEvent>;

    async fn find_by_id(&self, id: BuildEventId) -> StoreResult<Option<BuildEvent>>;

    /// Lists a tenant's build events, newest first
    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<BuildEvent>>;

    /// Applies `transition` only if the stored status equals `expected`
    ///
    /// # Arguments
    /// * `id` - Build event to update
    /// * `expected` - Status the event must currently have
    /// * `transition` - Target state (with image reference for completions)
    /// * `now` - Update timestamp
    ///
    /// # Returns
    /// Which of applied / missing / conflicting the update turned out to be
    async fn transition(
        &self,
        id: BuildEventId,
        expected: BuildStatus,
        transition: BuildTransition,
        now: DateTime<Utc>,
    ) -> StoreResult<TransitionOutcome>;
}
