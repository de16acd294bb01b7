use super::StoreResult;
use crate::lifecycle::domain::{CveFindingId, SlaViolation, SlaViolationId, TenantNamespace};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// SlaViolationRepository port for derived violation rows
///
/// At most one active violation may exist per `(tenant, finding)` key;
/// implementations must enforce this even under concurrent sweeps.
#[async_trait]
pub trait SlaViolationRepository: Send + Sync {
    /// Opens an active violation unless one already exists for the key
    ///
    /// # Returns
    /// The new violation, or None when an active one was already present
    async fn create_active_if_absent(
        &self,
        tenant: &TenantNamespace,
        cve_finding_id: CveFindingId,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SlaViolation>>;

    async fn find_active_by_tenant(&self, tenant: &TenantNamespace)
        -> StoreResult<Vec<SlaViolation>>;

    /// Lists active and resolved violations for a tenant
    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<SlaViolation>>;

    /// Marks an active violation resolved
    ///
    /// # Returns
    /// True if the violation was active and is now resolved
    async fn resolve(&self, id: SlaViolationId, now: DateTime<Utc>) -> StoreResult<bool>;
}
