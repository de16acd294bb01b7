use super::StoreResult;
use crate::lifecycle::domain::{AuditLogEntry, NewAuditLogEntry, TenantNamespace};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// AuditLogRepository port for the append-only audit trail
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn create(&self, entry: NewAuditLogEntry, now: DateTime<Utc>)
        -> StoreResult<AuditLogEntry>;

    /// Lists a tenant's audit entries in insertion order
    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<AuditLogEntry>>;
}
