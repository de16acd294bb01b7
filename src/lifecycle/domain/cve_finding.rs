use super::ImageId;
use crate::shared::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CveFindingId(i64);

impl CveFindingId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CveFindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity level of a vulnerability finding, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Parses a severity label, ignoring case.
    pub fn parse(label: &str) -> LifecycleResult<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(LifecycleError::validation(format!(
                "unknown severity '{}'. Expected one of: Low, Medium, High, Critical",
                label
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A vulnerability reported against an image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CveFinding {
    pub id: CveFindingId,
    pub image_id: ImageId,
    pub cve_id: String,
    pub severity: Severity,
    pub description: String,
    pub fix_available: bool,
    pub created_at: DateTime<Utc>,
}

impl CveFinding {
    /// Time elapsed since the finding was recorded.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }
}

/// Validated CVE descriptor from a completion report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CveDescriptor {
    pub cve_id: String,
    pub severity: Severity,
    pub description: String,
    pub fix_available: bool,
}

impl CveDescriptor {
    pub fn new(
        cve_id: impl Into<String>,
        severity: &str,
        description: impl Into<String>,
        fix_available: bool,
    ) -> LifecycleResult<Self> {
        let cve_id = cve_id.into().trim().to_string();
        if cve_id.is_empty() {
            return Err(LifecycleError::validation("CVE identifier cannot be empty"));
        }
        let severity = Severity::parse(severity)?;

        Ok(Self {
            cve_id,
            severity,
            description: description.into(),
            fix_available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("critical").unwrap(), Severity::Critical);
        assert_eq!(Severity::parse("CRITICAL").unwrap(), Severity::Critical);
        assert_eq!(Severity::parse("Medium").unwrap(), Severity::Medium);
        assert!(Severity::parse("severe").is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_cve_descriptor_requires_id() {
        assert!(CveDescriptor::new("", "High", "", false).is_err());
        let cve = CveDescriptor::new(" CVE-2024-0001 ", "high", "desc", true).unwrap();
        assert_eq!(cve.cve_id, "CVE-2024-0001");
        assert_eq!(cve.severity, Severity::High);
    }

    #[test]
    fn test_age_at() {
        let created_at = Utc::now() - Duration::days(10);
        let finding = CveFinding {
            id: CveFindingId::new(1),
            image_id: ImageId::new(1),
            cve_id: "CVE-2024-0001".to_string(),
            severity: Severity::Critical,
            description: String::new(),
            fix_available: false,
            created_at,
        };
        assert_eq!(finding.age_at(created_at + Duration::days(10)).num_days(), 10);
    }
}
