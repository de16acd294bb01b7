use crate::application::read_models::{SlaSweepReport, TenantFailure};
use crate::application::services::AuditRecorder;
use crate::lifecycle::domain::{AuditAction, Customer, NewAuditLogEntry, Severity};
use crate::lifecycle::policies::SlaPolicy;
use crate::lifecycle::services::SlaReconciler;
use crate::ports::outbound::{
    AuditLogRepository, CustomerRepository, CveFindingRepository, SlaViolationRepository,
};
use crate::shared::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Actor recorded on audit entries written by SLA sweeps
pub const SLA_EVALUATOR_ACTOR: &str = "sla-evaluator";

/// Per-tenant counts produced by one reconciliation
#[derive(Debug, Default)]
struct TenantOutcome {
    exempt: bool,
    created: usize,
    resolved: usize,
}

/// SlaEvaluationUseCase - derives SLA violations from findings and tiers
///
/// Each sweep reconciles every registered tenant independently. A failure
/// while reconciling one tenant is recorded in the report and the sweep
/// moves on to the next tenant.
///
/// # Type Parameters
/// * `C` - CustomerRepository implementation
/// * `F` - CveFindingRepository implementation
/// * `V` - SlaViolationRepository implementation
/// * `A` - AuditLogRepository implementation
pub struct SlaEvaluationUseCase<C, F, V, A> {
    customers: Arc<C>,
    findings: Arc<F>,
    violations: Arc<V>,
    audit: AuditRecorder<A>,
    policy: SlaPolicy,
}

impl<C, F, V, A> SlaEvaluationUseCase<C, F, V, A>
where
    C: CustomerRepository,
    F: CveFindingRepository,
    V: SlaViolationRepository,
    A: AuditLogRepository,
{
    pub fn new(
        customers: Arc<C>,
        findings: Arc<F>,
        violations: Arc<V>,
        audit: AuditRecorder<A>,
        policy: SlaPolicy,
    ) -> Self {
        Self {
            customers,
            findings,
            violations,
            audit,
            policy,
        }
    }

    /// Runs one sweep at the current time
    pub async fn evaluate(&self) -> LifecycleResult<SlaSweepReport> {
        self.evaluate_at(Utc::now()).await
    }

    /// Runs one sweep as of `now`
    ///
    /// # Errors
    /// Returns `LifecycleError::Persistence` only if the customer list cannot
    /// be loaded; per-tenant failures land in `SlaSweepReport::failures`
    pub async fn evaluate_at(&self, now: DateTime<Utc>) -> LifecycleResult<SlaSweepReport> {
        let customers = self
            .customers
            .find_all()
            .await
            .map_err(|e| LifecycleError::persistence("load customers", e))?;

        let mut report = SlaSweepReport::default();
        for customer in &customers {
            report.evaluated += 1;
            match self.reconcile_tenant(customer, now).await {
                Ok(outcome) => {
                    if outcome.exempt {
                        report.exempt += 1;
                    }
                    report.created += outcome.created;
                    report.resolved += outcome.resolved;
                }
                Err(e) => {
                    tracing::warn!(tenant = %customer.namespace, error = %e, "sla reconciliation failed");
                    report.failures.push(TenantFailure {
                        tenant_namespace: customer.namespace.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            evaluated = report.evaluated,
            exempt = report.exempt,
            created = report.created,
            resolved = report.resolved,
            failures = report.failures.len(),
            "sla evaluation finished"
        );
        Ok(report)
    }

    async fn reconcile_tenant(
        &self,
        customer: &Customer,
        now: DateTime<Utc>,
    ) -> LifecycleResult<TenantOutcome> {
        let tenant = &customer.namespace;
        let deadline = self.policy.deadline_for(&customer.sla_tier);

        let findings = match deadline {
            Some(_) => self
                .findings
                .find_by_tenant_and_severity(tenant, Severity::Critical)
                .await
                .map_err(|e| LifecycleError::persistence("load cve findings", e))?,
            None => Vec::new(),
        };
        let active = self
            .violations
            .find_active_by_tenant(tenant)
            .await
            .map_err(|e| LifecycleError::persistence("load sla violations", e))?;

        let plan = SlaReconciler::plan(deadline, &findings, &active, now);
        let mut outcome = TenantOutcome {
            exempt: deadline.is_none(),
            ..TenantOutcome::default()
        };
        if plan.is_empty() {
            return Ok(outcome);
        }

        for cve_finding_id in plan.to_create {
            let created = self
                .violations
                .create_active_if_absent(tenant, cve_finding_id, now)
                .await
                .map_err(|e| LifecycleError::persistence("create sla violation", e))?;

            // None means a concurrent sweep opened it first.
            if let Some(violation) = created {
                outcome.created += 1;
                let cve_id = findings
                    .iter()
                    .find(|finding| finding.id == cve_finding_id)
                    .map(|finding| finding.cve_id.clone())
                    .unwrap_or_default();
                tracing::info!(
                    tenant = %tenant,
                    violation_id = %violation.id,
                    cve_finding_id = %cve_finding_id,
                    cve_id = %cve_id,
                    "sla violation detected"
                );
                self.audit
                    .log(
                        NewAuditLogEntry::new(
                            tenant.clone(),
                            AuditAction::SLA_VIOLATION_DETECTED,
                            SLA_EVALUATOR_ACTOR,
                        )
                        .with_detail("violation_id", violation.id.get())
                        .with_detail("cve_finding_id", cve_finding_id.get())
                        .with_detail("cve_id", cve_id)
                        .with_detail("sla_tier", customer.sla_tier.as_str()),
                    )
                    .await;
            }
        }

        for violation_id in plan.to_resolve {
            let resolved = self
                .violations
                .resolve(violation_id, now)
                .await
                .map_err(|e| LifecycleError::persistence("resolve sla violation", e))?;

            if resolved {
                outcome.resolved += 1;
                tracing::info!(tenant = %tenant, violation_id = %violation_id, "sla violation resolved");
                self.audit
                    .log(
                        NewAuditLogEntry::new(
                            tenant.clone(),
                            AuditAction::SLA_VIOLATION_RESOLVED,
                            SLA_EVALUATOR_ACTOR,
                        )
                        .with_detail("violation_id", violation_id.get())
                        .with_detail("sla_tier", customer.sla_tier.as_str()),
                    )
                    .await;
            }
        }

        Ok(outcome)
    }
}
