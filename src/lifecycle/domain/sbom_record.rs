use super::ImageId;
use crate::shared::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SbomRecordId(i64);

impl SbomRecordId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

/// A stored SBOM document reference belonging to an image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SbomRecord {
    pub id: SbomRecordId,
    pub image_id: ImageId,
    pub format: String,
    pub uri: String,
    pub created_at: DateTime<Utc>,
}

/// Validated SBOM descriptor from a completion report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbomDescriptor {
    format: String,
    uri: String,
}

impl SbomDescriptor {
    pub fn new(format: impl Into<String>, uri: impl Into<String>) -> LifecycleResult<Self> {
        let format = format.into().trim().to_string();
        let uri = uri.into().trim().to_string();

        if format.is_empty() {
            return Err(LifecycleError::validation("SBOM format cannot be empty"));
        }
        if uri.is_empty() {
            return Err(LifecycleError::validation(format!(
                "SBOM URI cannot be empty (format: {})",
                format
            )));
        }

        Ok(Self { format, uri })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbom_descriptor_valid() {
        let sbom = SbomDescriptor::new("SPDX", "s3://x").unwrap();
        assert_eq!(sbom.format(), "SPDX");
        assert_eq!(sbom.uri(), "s3://x");
    }

    #[test]
    fn test_sbom_descriptor_requires_fields() {
        assert!(SbomDescriptor::new("", "s3://x").is_err());
        assert!(SbomDescriptor::new("SPDX", " ").is_err());
    }
}
