use crate::application::dto::{BuildRequest, CompletionPayload, DEFAULT_ACTOR};
use crate::application::services::AuditRecorder;
use crate::lifecycle::domain::{
    AuditAction, BuildEvent, BuildEventId, BuildStatus, BuildTransition, NewAuditLogEntry,
    NewBuildEvent, NewImage, ValidatedCompletion,
};
use crate::ports::inbound::{BuildLifecyclePort, CompletedBuild};
use crate::ports::outbound::{
    AuditLogRepository, BuildEventRepository, BuildOrchestrator, CompletionUnit,
    TransitionOutcome, UnitOfWork,
};
use crate::shared::{LifecycleError, LifecycleResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// BuildLifecycleUseCase - owner of the build event state machine
///
/// Uses generic dependency injection for its infrastructure; the same
/// store instance may be passed for several type parameters.
///
/// # Type Parameters
/// * `B` - BuildEventRepository implementation
/// * `U` - UnitOfWork implementation used for atomic completion
/// * `O` - BuildOrchestrator implementation
/// * `A` - AuditLogRepository implementation
pub struct BuildLifecycleUseCase<B, U, O, A> {
    build_events: Arc<B>,
    unit_of_work: Arc<U>,
    orchestrator: Arc<O>,
    audit: AuditRecorder<A>,
    actor: String,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<B, U, O, A> BuildLifecycleUseCase<B, U, O, A>
where
    B: BuildEventRepository + 'static,
    U: UnitOfWork + 'static,
    O: BuildOrchestrator + 'static,
    A: AuditLogRepository + 'static,
{
    /// Creates a new BuildLifecycleUseCase with injected dependencies
    pub fn new(
        build_events: Arc<B>,
        unit_of_work: Arc<U>,
        orchestrator: Arc<O>,
        audit: AuditRecorder<A>,
    ) -> Self {
        Self {
            build_events,
            unit_of_work,
            orchestrator,
            audit,
            actor: DEFAULT_ACTOR.to_string(),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Sets the actor recorded for completion and failure audit entries
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Waits up to `grace` for detached trigger calls to finish
    ///
    /// Only meant for process shutdown; request handling never waits on
    /// triggers.
    ///
    /// # Returns
    /// True if every outstanding trigger finished within the grace period
    pub async fn drain_triggers(&self, grace: Duration) -> bool {
        let handles = std::mem::take(&mut *self.in_flight.lock().await);
        if handles.is_empty() {
            return true;
        }

        let outstanding = handles.len();
        let drained = tokio::time::timeout(grace, async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "build trigger task did not finish cleanly");
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                outstanding,
                grace_ms = grace.as_millis() as u64,
                "build triggers still running after grace period"
            );
        }
        drained.is_ok()
    }

    /// Starts the trigger call on its own task and keeps the handle for draining
    async fn spawn_trigger(&self, event: BuildEvent, actor: String, request_id: Uuid) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let audit = self.audit.clone();

        let handle = tokio::spawn(async move {
            match orchestrator.trigger_build(&event).await {
                Ok(()) => tracing::debug!(
                    build_event_id = %event.id,
                    request_id = %request_id,
                    "build trigger delivered"
                ),
                Err(e) => {
                    let failure = LifecycleError::Trigger {
                        build_event_id: event.id,
                        details: format!("{:#}", e),
                    };
                    tracing::warn!(
                        build_event_id = %event.id,
                        tenant = %event.tenant_namespace,
                        request_id = %request_id,
                        error = %failure,
                        "build trigger failed"
                    );
                    audit
                        .log(
                            NewAuditLogEntry::new(
                                event.tenant_namespace.clone(),
                                AuditAction::BUILD_TRIGGER_FAILED,
                                actor,
                            )
                            .with_detail("build_event_id", event.id.get())
                            .with_detail("request_id", request_id.to_string())
                            .with_detail("error", format!("{:#}", e)),
                        )
                        .await;
                }
            }
        });

        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.push(handle);
    }

    fn map_transition(
        outcome: TransitionOutcome,
        build_event_id: BuildEventId,
        target: BuildStatus,
    ) -> LifecycleResult<BuildEvent> {
        match outcome {
            TransitionOutcome::Applied(event) => Ok(event),
            TransitionOutcome::Missing => Err(LifecycleError::not_found("build event", build_event_id)),
            TransitionOutcome::Conflict(current) => Err(LifecycleError::InvalidStateTransition {
                build_event_id,
                from: current,
                to: target,
            }),
        }
    }
}

/// The completion workflow, run inside one atomic scope
///
/// Steps run in order and the first failure aborts the rest. The caller's
/// transaction discards every earlier write when this returns `Err`.
fn apply_completion(
    unit: &mut dyn CompletionUnit,
    build_event_id: BuildEventId,
    completion: ValidatedCompletion,
    now: DateTime<Utc>,
) -> LifecycleResult<CompletedBuild> {
    let event = unit
        .find_build_event(build_event_id)
        .map_err(|e| LifecycleError::persistence("load build event", e))?
        .ok_or_else(|| LifecycleError::not_found("build event", build_event_id))?;
    event.ensure_transition(BuildStatus::Completed)?;

    let image = unit
        .insert_image(
            &NewImage {
                tenant_namespace: event.tenant_namespace.clone(),
                digest: completion.digest,
                tags: completion.tags,
                slsa_level: completion.slsa_level,
            },
            now,
        )
        .map_err(|e| LifecycleError::persistence("create image", e))?;

    let sbom_records = unit
        .insert_sbom_records(image.id, &completion.sboms, now)
        .map_err(|e| LifecycleError::persistence("create sbom records", e))?;

    let cve_findings = unit
        .insert_cve_findings(image.id, &completion.cves, now)
        .map_err(|e| LifecycleError::persistence("create cve findings", e))?;

    let outcome = unit
        .transition_build_event(
            build_event_id,
            BuildStatus::Pending,
            BuildTransition::Complete { image_id: image.id },
            now,
        )
        .map_err(|e| LifecycleError::persistence("update build event", e))?;

    let build_event = match outcome {
        TransitionOutcome::Applied(event) => event,
        TransitionOutcome::Missing => {
            return Err(LifecycleError::not_found("build event", build_event_id))
        }
        TransitionOutcome::Conflict(current) => {
            return Err(LifecycleError::InvalidStateTransition {
                build_event_id,
                from: current,
                to: BuildStatus::Completed,
            })
        }
    };

    Ok(CompletedBuild {
        build_event,
        image,
        sbom_records,
        cve_findings,
    })
}

#[async_trait]
impl<B, U, O, A> BuildLifecyclePort for BuildLifecycleUseCase<B, U, O, A>
where
    B: BuildEventRepository + 'static,
    U: UnitOfWork + 'static,
    O: BuildOrchestrator + 'static,
    A: AuditLogRepository + 'static,
{
    async fn request_build(&self, request: BuildRequest) -> LifecycleResult<BuildEvent> {
        let event = self
            .build_events
            .create(
                NewBuildEvent {
                    tenant_namespace: request.tenant_namespace,
                    trigger_type: request.trigger_type,
                },
                Utc::now(),
            )
            .await
            .map_err(|e| LifecycleError::persistence("create build event", e))?;

        let request_id = Uuid::new_v4();
        tracing::info!(
            build_event_id = %event.id,
            tenant = %event.tenant_namespace,
            trigger_type = %event.trigger_type,
            request_id = %request_id,
            "build requested"
        );

        self.audit
            .log(
                NewAuditLogEntry::new(
                    event.tenant_namespace.clone(),
                    AuditAction::BUILD_TRIGGERED,
                    request.actor.clone(),
                )
                .with_detail("build_event_id", event.id.get())
                .with_detail("trigger_type", event.trigger_type.as_str())
                .with_detail("request_id", request_id.to_string()),
            )
            .await;

        // build_triggered must precede any build_trigger_failed entry
        self.spawn_trigger(event.clone(), request.actor, request_id)
            .await;

        Ok(event)
    }

    async fn complete_build(
        &self,
        build_event_id: BuildEventId,
        payload: CompletionPayload,
    ) -> LifecycleResult<CompletedBuild> {
        let completion = payload.into_validated()?;
        let now = Utc::now();

        let completed = self
            .unit_of_work
            .transaction(move |unit| apply_completion(unit, build_event_id, completion, now))
            .await
            .inspect_err(|e| {
                tracing::warn!(build_event_id = %build_event_id, error = %e, "build completion rejected")
            })?;

        tracing::info!(
            build_event_id = %build_event_id,
            tenant = %completed.image.tenant_namespace,
            image_id = %completed.image.id,
            sboms = completed.sbom_records.len(),
            cves = completed.cve_findings.len(),
            "build completed"
        );

        self.audit
            .log(
                NewAuditLogEntry::new(
                    completed.image.tenant_namespace.clone(),
                    AuditAction::BUILD_COMPLETED,
                    self.actor.clone(),
                )
                .with_detail("build_event_id", build_event_id.get())
                .with_detail("image_id", completed.image.id.get())
                .with_detail("image_digest", completed.image.digest.as_str())
                .with_detail("sbom_count", completed.sbom_records.len())
                .with_detail("cve_count", completed.cve_findings.len()),
            )
            .await;

        Ok(completed)
    }

    async fn fail_build(
        &self,
        build_event_id: BuildEventId,
        reason: &str,
    ) -> LifecycleResult<BuildEvent> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LifecycleError::validation("failure reason cannot be empty"));
        }

        let outcome = self
            .build_events
            .transition(
                build_event_id,
                BuildStatus::Pending,
                BuildTransition::Fail,
                Utc::now(),
            )
            .await
            .map_err(|e| LifecycleError::persistence("update build event", e))?;
        let event = Self::map_transition(outcome, build_event_id, BuildStatus::Failed)?;

        tracing::info!(
            build_event_id = %event.id,
            tenant = %event.tenant_namespace,
            reason,
            "build failed"
        );

        self.audit
            .log(
                NewAuditLogEntry::new(
                    event.tenant_namespace.clone(),
                    AuditAction::BUILD_FAILED,
                    self.actor.clone(),
                )
                .with_detail("build_event_id", event.id.get())
                .with_detail("reason", reason),
            )
            .await;

        Ok(event)
    }
}
