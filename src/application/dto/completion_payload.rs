use crate::lifecycle::domain::{
    CveDescriptor, ImageDigest, SbomDescriptor, SlsaLevel, ValidatedCompletion,
};
use crate::shared::{LifecycleError, LifecycleResult};
use serde::Deserialize;

/// CompletionPayload - wire shape of a builder's completion report
///
/// Field names follow the JSON the external builder sends. Values are
/// deliberately loose (signed SLSA level, free-form severity) so that
/// malformed reports surface as validation failures rather than parse errors.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CompletionPayload {
    pub image_digest: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub slsa_level: i64,
    #[serde(default)]
    pub sboms: Vec<SbomPayload>,
    #[serde(default)]
    pub cves: Vec<CvePayload>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SbomPayload {
    pub format: String,
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CvePayload {
    pub cve_id: String,
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fix_available: bool,
}

impl CompletionPayload {
    /// Parses a payload from JSON text
    ///
    /// # Errors
    /// Returns `LifecycleError::Validation` if the JSON is malformed or misses
    /// required fields
    pub fn from_json(json: &str) -> LifecycleResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            LifecycleError::validation(format!("completion payload is not valid JSON: {}", e))
        })
    }

    /// Validates every field, stopping at the first invalid one
    ///
    /// # Errors
    /// Returns `LifecycleError::Validation` for an empty or oversized digest,
    /// a negative SLSA level, an SBOM without format or URI, or a CVE without
    /// id or with an unknown severity
    pub fn into_validated(self) -> LifecycleResult<ValidatedCompletion> {
        let digest = ImageDigest::new(self.image_digest)?;
        let slsa_level = SlsaLevel::new(self.slsa_level)?;

        let sboms = self
            .sboms
            .into_iter()
            .map(|sbom| SbomDescriptor::new(sbom.format, sbom.uri))
            .collect::<LifecycleResult<Vec<_>>>()?;

        let cves = self
            .cves
            .into_iter()
            .enumerate()
            .map(|(index, cve)| {
                CveDescriptor::new(cve.cve_id, &cve.severity, cve.description, cve.fix_available)
                    .map_err(|e| match e {
                        LifecycleError::Validation { message } => LifecycleError::validation(
                            format!("cves[{}]: {}", index, message),
                        ),
                        other => other,
                    })
            })
            .collect::<LifecycleResult<Vec<_>>>()?;

        Ok(ValidatedCompletion {
            digest,
            tags: self.tags,
            slsa_level,
            sboms,
            cves,
        })
    }
}
