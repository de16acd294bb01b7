use super::StoreResult;
use crate::lifecycle::domain::{
    CveFinding, Image, ImageId, SbomRecord, Severity, TenantNamespace,
};
use async_trait::async_trait;

/// ImageRepository port for reading images
///
/// Images are only ever written by the completion workflow through
/// `CompletionUnit`, so this port is read-only.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn find_by_id(&self, id: ImageId) -> StoreResult<Option<Image>>;

    async fn find_all(&self) -> StoreResult<Vec<Image>>;

    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<Image>>;
}

/// SbomRecordRepository port for reading an image's SBOM references
#[async_trait]
pub trait SbomRecordRepository: Send + Sync {
    async fn find_by_image(&self, image_id: ImageId) -> StoreResult<Vec<SbomRecord>>;
}

/// CveFindingRepository port for reading vulnerability findings
#[async_trait]
pub trait CveFindingRepository: Send + Sync {
    async fn find_by_image(&self, image_id: ImageId) -> StoreResult<Vec<CveFinding>>;

    /// Returns findings of one severity across all of a tenant's images
    async fn find_by_tenant_and_severity(
        &self,
        tenant: &TenantNamespace,
        severity: Severity,
    ) -> StoreResult<Vec<CveFinding>>;
}
