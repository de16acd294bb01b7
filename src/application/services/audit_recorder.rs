use crate::lifecycle::domain::{AuditLogEntry, NewAuditLogEntry};
use crate::ports::outbound::AuditLogRepository;
use chrono::Utc;
use std::sync::Arc;

/// AuditRecorder appends audit entries without ever failing its caller
///
/// A failed write is reported through `tracing` and otherwise ignored, so
/// audit trouble cannot reverse or block the business operation that
/// produced the entry.
pub struct AuditRecorder<A> {
    repository: Arc<A>,
}

impl<A> Clone for AuditRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<A: AuditLogRepository> AuditRecorder<A> {
    pub fn new(repository: Arc<A>) -> Self {
        Self { repository }
    }

    /// Appends an entry
    ///
    /// # Returns
    /// The stored entry, or None if the write failed (already logged)
    pub async fn log(&self, entry: NewAuditLogEntry) -> Option<AuditLogEntry> {
        let tenant = entry.tenant_namespace.clone();
        let action = entry.action.clone();

        match self.repository.create(entry, Utc::now()).await {
            Ok(stored) => {
                tracing::debug!(tenant = %tenant, action = %action, audit_id = stored.id.get(), "audit entry recorded");
                Some(stored)
            }
            Err(e) => {
                tracing::warn!(tenant = %tenant, action = %action, error = %e, "failed to record audit entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::domain::{AuditAction, AuditLogId, TenantNamespace};
    use crate::ports::outbound::{StoreError, StoreResult};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockAuditLogRepository {
        entries: Mutex<Vec<AuditLogEntry>>,
        fail: bool,
    }

    #[async_trait]
    impl AuditLogRepository for MockAuditLogRepository {
        async fn create(
            &self,
            entry: NewAuditLogEntry,
            now: DateTime<Utc>,
        ) -> StoreResult<AuditLogEntry> {
            if self.fail {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            let mut entries = self.entries.lock().unwrap();
            let stored = AuditLogEntry {
                id: AuditLogId::new(entries.len() as i64 + 1),
                tenant_namespace: entry.tenant_namespace,
                action: entry.action,
                actor: entry.actor,
                details: entry.details,
                created_at: now,
            };
            entries.push(stored.clone());
            Ok(stored)
        }

        async fn find_by_tenant(
            &self,
            tenant: &TenantNamespace,
        ) -> StoreResult<Vec<AuditLogEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|entry| &entry.tenant_namespace == tenant)
                .cloned()
                .collect())
        }
    }

    fn create_test_entry() -> NewAuditLogEntry {
        NewAuditLogEntry::new(
            TenantNamespace::new("acme").unwrap(),
            AuditAction::BUILD_FAILED,
            "system",
        )
        .with_detail("reason", "compiler crashed")
    }

    #[tokio::test]
    async fn test_log_records_entry() {
        let repository = Arc::new(MockAuditLogRepository::default());
        let recorder = AuditRecorder::new(Arc::clone(&repository));

        let stored = recorder.log(create_test_entry()).await;

        assert!(stored.is_some());
        assert_eq!(repository.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_log_swallows_failure() {
        let repository = Arc::new(MockAuditLogRepository {
            fail: true,
            ..Default::default()
        });
        let recorder = AuditRecorder::new(repository);

        assert!(recorder.log(create_test_entry()).await.is_none());
    }
}
