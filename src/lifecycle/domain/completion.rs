use super::{CveDescriptor, ImageDigest, SbomDescriptor, SlsaLevel};

/// A completion report whose every field has passed validation
///
/// Only this type reaches the transactional completion workflow, so the
/// storage layer never sees an empty digest or a negative SLSA level.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCompletion {
    pub digest: ImageDigest,
    pub tags: Vec<String>,
    pub slsa_level: SlsaLevel,
    pub sboms: Vec<SbomDescriptor>,
    pub cves: Vec<CveDescriptor>,
}

impl ValidatedCompletion {
    pub fn sbom_count(&self) -> usize {
        self.sboms.len()
    }

    pub fn cve_count(&self) -> usize {
        self.cves.len()
    }
}
