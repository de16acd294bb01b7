use super::TenantNamespace;
use crate::shared::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length for image digests (security limit)
const MAX_DIGEST_LENGTH: usize = 255;

/// Identity of a stored image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(i64);

impl ImageId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NewType wrapper for a content digest (e.g. `sha256:...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageDigest(String);

impl ImageDigest {
    pub fn new(digest: impl Into<String>) -> LifecycleResult<Self> {
        let digest = digest.into();
        let trimmed = digest.trim();

        if trimmed.is_empty() {
            return Err(LifecycleError::validation("image digest cannot be empty"));
        }

        if trimmed.len() > MAX_DIGEST_LENGTH {
            return Err(LifecycleError::validation(format!(
                "image digest is too long ({} bytes). Maximum allowed: {} bytes",
                trimmed.len(),
                MAX_DIGEST_LENGTH
            )));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(LifecycleError::validation(
                "image digest cannot contain whitespace",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SLSA provenance level attached to a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SlsaLevel(u32);

impl SlsaLevel {
    pub fn new(level: i64) -> LifecycleResult<Self> {
        if level < 0 {
            return Err(LifecycleError::validation(format!(
                "SLSA level must be a non-negative integer, got {}",
                level
            )));
        }
        u32::try_from(level).map(Self).map_err(|_| {
            LifecycleError::validation(format!(
                "SLSA level {} exceeds the maximum of {}",
                level,
                u32::MAX
            ))
        })
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// An image produced by a completed build
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub id: ImageId,
    pub tenant_namespace: TenantNamespace,
    pub digest: ImageDigest,
    pub tags: Vec<String>,
    pub slsa_level: SlsaLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image data ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub tenant_namespace: TenantNamespace,
    pub digest: ImageDigest,
    pub tags: Vec<String>,
    pub slsa_level: SlsaLevel,
}
