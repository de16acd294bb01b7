mod sla_policy;

pub use sla_policy::{SlaPolicy, DEFAULT_PREMIUM_DAYS, DEFAULT_STANDARD_DAYS};
