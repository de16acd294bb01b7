use crate::shared::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length for tenant namespaces (DNS label limit)
const MAX_NAMESPACE_LENGTH: usize = 63;

/// NewType wrapper for a tenant namespace with validation
///
/// Namespaces follow DNS label rules: lowercase alphanumerics and hyphens,
/// not starting or ending with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantNamespace(String);

impl TenantNamespace {
    pub fn new(namespace: impl Into<String>) -> LifecycleResult<Self> {
        let namespace = namespace.into();

        if namespace.is_empty() {
            return Err(LifecycleError::validation("tenant namespace cannot be empty"));
        }

        if namespace.len() > MAX_NAMESPACE_LENGTH {
            return Err(LifecycleError::validation(format!(
                "tenant namespace is too long ({} bytes). Maximum allowed: {} bytes",
                namespace.len(),
                MAX_NAMESPACE_LENGTH
            )));
        }

        let valid_chars = namespace
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars || namespace.starts_with('-') || namespace.ends_with('-') {
            return Err(LifecycleError::validation(format!(
                "tenant namespace '{}' is invalid. Only lowercase letters, digits and inner hyphens are allowed.",
                namespace
            )));
        }

        Ok(Self(namespace))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TenantNamespace {
    type Error = LifecycleError;

    fn try_from(value: String) -> LifecycleResult<Self> {
        Self::new(value)
    }
}

impl From<TenantNamespace> for String {
    fn from(value: TenantNamespace) -> Self {
        value.0
    }
}

/// Contractual responsiveness class for a tenant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlaTier {
    Premium,
    Standard,
    /// A tier label this system has no deadline for
    Other(String),
    /// No SLA contracted
    Unassigned,
}

impl SlaTier {
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "premium" => SlaTier::Premium,
            "standard" => SlaTier::Standard,
            "" | "none" => SlaTier::Unassigned,
            _ => SlaTier::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SlaTier::Premium => "premium",
            SlaTier::Standard => "standard",
            SlaTier::Other(label) => label,
            SlaTier::Unassigned => "",
        }
    }
}

impl std::fmt::Display for SlaTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlaTier::Unassigned => write!(f, "none"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl From<String> for SlaTier {
    fn from(value: String) -> Self {
        SlaTier::from_label(&value)
    }
}

impl From<SlaTier> for String {
    fn from(value: SlaTier) -> Self {
        value.as_str().to_string()
    }
}

/// A tenant of the image service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub namespace: TenantNamespace,
    pub name: String,
    pub contact_info: String,
    pub sla_tier: SlaTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration data for a customer
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub namespace: TenantNamespace,
    pub name: String,
    pub contact_info: String,
    pub sla_tier: SlaTier,
}

impl NewCustomer {
    pub fn new(
        namespace: TenantNamespace,
        name: impl Into<String>,
        contact_info: impl Into<String>,
        sla_tier: SlaTier,
    ) -> LifecycleResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LifecycleError::validation("customer name cannot be empty"));
        }
        Ok(Self {
            namespace,
            name,
            contact_info: contact_info.into(),
            sla_tier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_namespace_valid() {
        let ns = TenantNamespace::new("acme").unwrap();
        assert_eq!(ns.as_str(), "acme");

        let ns = TenantNamespace::new("team-42").unwrap();
        assert_eq!(format!("{}", ns), "team-42");
    }

    #[test]
    fn test_tenant_namespace_empty() {
        let result = TenantNamespace::new("");
        assert!(matches!(result, Err(LifecycleError::Validation { .. })));
    }

    #[test]
    fn test_tenant_namespace_rejects_uppercase_and_symbols() {
        assert!(TenantNamespace::new("Acme").is_err());
        assert!(TenantNamespace::new("acme/prod").is_err());
        assert!(TenantNamespace::new("-acme").is_err());
        assert!(TenantNamespace::new("acme-").is_err());
    }

    #[test]
    fn test_tenant_namespace_too_long() {
        let long = "a".repeat(64);
        assert!(TenantNamespace::new(long).is_err());
        assert!(TenantNamespace::new("a".repeat(63)).is_ok());
    }

    #[test]
    fn test_sla_tier_from_label() {
        assert_eq!(SlaTier::from_label("premium"), SlaTier::Premium);
        assert_eq!(SlaTier::from_label("Standard"), SlaTier::Standard);
        assert_eq!(SlaTier::from_label(""), SlaTier::Unassigned);
        assert_eq!(SlaTier::from_label("none"), SlaTier::Unassigned);
        assert_eq!(
            SlaTier::from_label("gold"),
            SlaTier::Other("gold".to_string())
        );
    }

    #[test]
    fn test_sla_tier_round_trips_through_label() {
        for tier in [SlaTier::Premium, SlaTier::Standard, SlaTier::Unassigned] {
            assert_eq!(SlaTier::from_label(tier.as_str()), tier);
        }
    }

    #[test]
    fn test_new_customer_requires_name() {
        let ns = TenantNamespace::new("acme").unwrap();
        let result = NewCustomer::new(ns, "  ", "", SlaTier::Premium);
        assert!(result.is_err());
    }
}
