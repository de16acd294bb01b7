use crate::lifecycle::domain::SlaTier;
use chrono::Duration;

/// Default remediation deadline for premium tenants, in days
pub const DEFAULT_PREMIUM_DAYS: u32 = 7;

/// Default remediation deadline for standard tenants, in days
pub const DEFAULT_STANDARD_DAYS: u32 = 30;

/// SlaPolicy maps a tenant's SLA tier to the age after which an unresolved
/// Critical finding becomes a violation
///
/// Tiers other than `premium` and `standard` (including no tier at all) are
/// exempt and never produce violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaPolicy {
    premium_days: u32,
    standard_days: u32,
}

impl SlaPolicy {
    pub fn new(premium_days: u32, standard_days: u32) -> Self {
        Self {
            premium_days,
            standard_days,
        }
    }

    /// Returns the deadline for a tier
    ///
    /// # Arguments
    /// * `tier` - The tenant's SLA tier
    ///
    /// # Returns
    /// The maximum allowed finding age, or None when the tier is exempt
    pub fn deadline_for(&self, tier: &SlaTier) -> Option<Duration> {
        match tier {
            SlaTier::Premium => Some(Duration::days(i64::from(self.premium_days))),
            SlaTier::Standard => Some(Duration::days(i64::from(self.standard_days))),
            SlaTier::Other(_) | SlaTier::Unassigned => None,
        }
    }
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PREMIUM_DAYS, DEFAULT_STANDARD_DAYS)
    }
}
