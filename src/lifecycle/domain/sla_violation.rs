use super::{CveFindingId, TenantNamespace};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlaViolationId(i64);

impl SlaViolationId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for SlaViolationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a derived SLA violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViolationState {
    Active,
    Resolved { resolved_at: DateTime<Utc> },
}

impl ViolationState {
    pub fn label(&self) -> &'static str {
        match self {
            ViolationState::Active => "active",
            ViolationState::Resolved { .. } => "resolved",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ViolationState::Active)
    }
}

/// A Critical finding that outlived its tenant's SLA deadline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaViolation {
    pub id: SlaViolationId,
    pub tenant_namespace: TenantNamespace,
    pub cve_finding_id: CveFindingId,
    #[serde(flatten)]
    pub state: ViolationState,
    pub created_at: DateTime<Utc>,
}
