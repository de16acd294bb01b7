use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image_lifecycle::lifecycle::domain::NewAuditLogEntry;
use image_lifecycle::ports::outbound::StoreResult;
use image_lifecycle::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock AuditLogRepository whose writes always fail
#[derive(Default)]
pub struct FailingAuditLogRepository {
    pub attempts: AtomicUsize,
}

impl FailingAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditLogRepository for FailingAuditLogRepository {
    async fn create(&self, _entry: NewAuditLogEntry, _now: DateTime<Utc>) -> StoreResult<AuditLogEntry> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Backend("audit table is read-only".to_string()))
    }

    async fn find_by_tenant(&self, _tenant: &TenantNamespace) -> StoreResult<Vec<AuditLogEntry>> {
        Ok(Vec::new())
    }
}
