use crate::lifecycle::domain::{CveFinding, CveFindingId, Severity, SlaViolation, SlaViolationId};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

/// Changes needed to bring one tenant's active violations in line with its findings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Findings that should be violating but have no active violation yet
    pub to_create: Vec<CveFindingId>,
    /// Active violations whose finding no longer qualifies
    pub to_resolve: Vec<SlaViolationId>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_resolve.is_empty()
    }
}

/// SlaReconciler computes violation changes as a set difference
///
/// The desired set is every Critical finding older than the deadline; the
/// actual set is the tenant's active violations, keyed by finding id.
/// Running the plan twice against unchanged inputs yields an empty plan.
pub struct SlaReconciler;

impl SlaReconciler {
    /// Plans violation changes for a single tenant
    ///
    /// # Arguments
    /// * `deadline` - Maximum finding age for the tenant's tier, None when exempt
    /// * `findings` - Findings on the tenant's images
    /// * `active` - The tenant's currently active violations
    /// * `now` - Evaluation instant
    ///
    /// # Returns
    /// A plan with findings to open violations for and violations to resolve,
    /// both in ascending id order
    pub fn plan(
        deadline: Option<Duration>,
        findings: &[CveFinding],
        active: &[SlaViolation],
        now: DateTime<Utc>,
    ) -> ReconciliationPlan {
        let desired: BTreeSet<CveFindingId> = match deadline {
            Some(deadline) => findings
                .iter()
                .filter(|finding| finding.severity == Severity::Critical)
                .filter(|finding| finding.age_at(now) > deadline)
                .map(|finding| finding.id)
                .collect(),
            None => BTreeSet::new(),
        };

        let existing: BTreeSet<CveFindingId> = active
            .iter()
            .filter(|violation| violation.state.is_active())
            .map(|violation| violation.cve_finding_id)
            .collect();

        let to_create = desired.difference(&existing).copied().collect();

        let mut to_resolve: Vec<SlaViolationId> = active
            .iter()
            .filter(|violation| violation.state.is_active())
            .filter(|violation| !desired.contains(&violation.cve_finding_id))
            .map(|violation| violation.id)
            .collect();
        to_resolve.sort();

        ReconciliationPlan {
            to_create,
            to_resolve,
        }
    }
}
