use super::TenantNamespace;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AuditLogId(i64);

impl AuditLogId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Action labels written to the audit trail
pub struct AuditAction;

impl AuditAction {
    pub const BUILD_TRIGGERED: &'static str = "build_triggered";
    pub const BUILD_TRIGGER_FAILED: &'static str = "build_trigger_failed";
    pub const BUILD_COMPLETED: &'static str = "build_completed";
    pub const BUILD_FAILED: &'static str = "build_failed";
    pub const SLA_VIOLATION_DETECTED: &'static str = "sla_violation_detected";
    pub const SLA_VIOLATION_RESOLVED: &'static str = "sla_violation_resolved";
}

/// Open key/value detail map attached to an audit entry
pub type AuditDetails = Map<String, Value>;

/// An immutable, tenant-scoped audit record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub tenant_namespace: TenantNamespace,
    pub action: String,
    pub actor: String,
    pub details: AuditDetails,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLogEntry {
    pub tenant_namespace: TenantNamespace,
    pub action: String,
    pub actor: String,
    pub details: AuditDetails,
}

impl NewAuditLogEntry {
    pub fn new(
        tenant_namespace: TenantNamespace,
        action: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            tenant_namespace,
            action: action.into(),
            actor: actor.into(),
            details: AuditDetails::new(),
        }
    }

    /// Adds a detail entry, replacing an existing key.
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}
