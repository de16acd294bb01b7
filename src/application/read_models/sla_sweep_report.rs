use serde::Serialize;

/// A tenant whose reconciliation failed during a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantFailure {
    pub tenant_namespace: String,
    pub error: String,
}

/// Outcome of one SLA evaluation sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlaSweepReport {
    /// Customers visited
    pub evaluated: usize,
    /// Customers whose tier carries no deadline
    pub exempt: usize,
    /// Violations opened
    pub created: usize,
    /// Violations resolved because their finding no longer qualifies
    pub resolved: usize,
    pub failures: Vec<TenantFailure>,
}

impl SlaSweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when the sweep changed nothing
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.resolved == 0
    }
}
