use crate::application::dto::{BuildRequest, CompletionPayload};
use crate::lifecycle::domain::{BuildEvent, BuildEventId, CveFinding, Image, SbomRecord};
use crate::shared::LifecycleResult;
use async_trait::async_trait;
use serde::Serialize;

/// Everything materialized by a successful completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedBuild {
    /// The build event, now `completed` and linked to `image`
    pub build_event: BuildEvent,
    pub image: Image,
    pub sbom_records: Vec<SbomRecord>,
    pub cve_findings: Vec<CveFinding>,
}

/// BuildLifecyclePort - Inbound port for the build state machine
///
/// This port defines the interface transports (CLI, webhook receivers, etc.)
/// use to drive a build from request to completion or failure.
#[async_trait]
pub trait BuildLifecyclePort: Send + Sync {
    /// Records a new `pending` build and signals the external builder
    ///
    /// Returns as soon as the event is stored. The builder is notified on a
    /// detached task whose failure is logged and audited, never returned.
    ///
    /// # Errors
    /// Returns `Persistence` if the build event could not be stored
    async fn request_build(&self, request: BuildRequest) -> LifecycleResult<BuildEvent>;

    /// Applies a completion report as one atomic unit
    ///
    /// # Errors
    /// - `Validation` if the payload is malformed
    /// - `NotFound` if no build event has the given id
    /// - `InvalidStateTransition` if the event is not `pending`
    /// - `Persistence` naming the step that failed; nothing is left behind
    async fn complete_build(
        &self,
        build_event_id: BuildEventId,
        payload: CompletionPayload,
    ) -> LifecycleResult<CompletedBuild>;

    /// Marks a `pending` build as failed
    ///
    /// # Errors
    /// `NotFound` or `InvalidStateTransition` as for `complete_build`
    async fn fail_build(
        &self,
        build_event_id: BuildEventId,
        reason: &str,
    ) -> LifecycleResult<BuildEvent>;
}
