use super::{StoreResult, TransitionOutcome};
use crate::lifecycle::domain::{
    BuildEvent, BuildEventId, BuildStatus, BuildTransition, CveDescriptor, CveFinding, Image,
    ImageId, NewImage, SbomDescriptor, SbomRecord,
};
use crate::shared::LifecycleResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Writes available inside one atomic completion scope
///
/// Every call sees the writes of earlier calls in the same scope, and none
/// of them are visible outside it until the scope commits.
pub trait CompletionUnit {
    fn find_build_event(&mut self, id: BuildEventId) -> StoreResult<Option<BuildEvent>>;

    fn insert_image(&mut self, image: &NewImage, now: DateTime<Utc>) -> StoreResult<Image>;

    fn insert_sbom_records(
        &mut self,
        image_id: ImageId,
        sboms: &[SbomDescriptor],
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<SbomRecord>>;

    /// Inserts the whole batch or fails; a malformed or duplicate row rejects the batch
    fn insert_cve_findings(
        &mut self,
        image_id: ImageId,
        cves: &[CveDescriptor],
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<CveFinding>>;

    fn transition_build_event(
        &mut self,
        id: BuildEventId,
        expected: BuildStatus,
        transition: BuildTransition,
        now: DateTime<Utc>,
    ) -> StoreResult<TransitionOutcome>;
}

/// UnitOfWork port for all-or-nothing multi-record writes
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Runs `work` in a single atomic scope
    ///
    /// The scope commits only when `work` returns `Ok`. An `Err` (or a
    /// failure to commit) leaves no trace of any write made by `work`.
    /// Dropping the returned future before it resolves also rolls the scope
    /// back, unless the commit had already started.
    ///
    /// # Errors
    /// Returns the error produced by `work`, or `LifecycleError::Persistence`
    /// if the scope could not be opened or committed
    async fn transaction<T, F>(&self, work: F) -> LifecycleResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn CompletionUnit) -> LifecycleResult<T> + Send + 'static;
}
