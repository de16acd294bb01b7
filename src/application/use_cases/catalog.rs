use crate::application::read_models::ImageDetailView;
use crate::lifecycle::domain::{
    AuditLogEntry, BuildEvent, BuildEventId, Customer, Image, ImageId, NewCustomer, SlaViolation,
    TenantNamespace,
};
use crate::ports::outbound::{
    AuditLogRepository, BuildEventRepository, CustomerRepository, CveFindingRepository,
    ImageRepository, SbomRecordRepository, SlaViolationRepository, StoreError,
};
use crate::shared::{LifecycleError, LifecycleResult};
use chrono::Utc;
use std::sync::Arc;

/// CatalogUseCase - read access to tenants, builds, images and their history
///
/// Also owns customer registration, the only write that is not part of the
/// build lifecycle itself.
pub struct CatalogUseCase<S> {
    store: Arc<S>,
}

impl<S> CatalogUseCase<S>
where
    S: CustomerRepository
        + BuildEventRepository
        + ImageRepository
        + SbomRecordRepository
        + CveFindingRepository
        + SlaViolationRepository
        + AuditLogRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a customer
    ///
    /// # Errors
    /// Returns `LifecycleError::Validation` if the namespace is already registered
    pub async fn register_customer(&self, customer: NewCustomer) -> LifecycleResult<Customer> {
        let namespace = customer.namespace.clone();
        let created = CustomerRepository::create(self.store.as_ref(), customer, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::Constraint(_) => LifecycleError::validation(format!(
                    "customer '{}' is already registered",
                    namespace
                )),
                other => LifecycleError::persistence("create customer", other),
            })?;

        tracing::info!(tenant = %created.namespace, sla_tier = %created.sla_tier, "customer registered");
        Ok(created)
    }

    pub async fn list_customers(&self) -> LifecycleResult<Vec<Customer>> {
        CustomerRepository::find_all(self.store.as_ref())
            .await
            .map_err(|e| LifecycleError::persistence("load customers", e))
    }

    pub async fn show_customer(&self, namespace: &TenantNamespace) -> LifecycleResult<Customer> {
        self.store
            .find_by_namespace(namespace)
            .await
            .map_err(|e| LifecycleError::persistence("load customer", e))?
            .ok_or_else(|| LifecycleError::not_found("customer", namespace))
    }

    pub async fn show_build(&self, id: BuildEventId) -> LifecycleResult<BuildEvent> {
        BuildEventRepository::find_by_id(self.store.as_ref(), id)
            .await
            .map_err(|e| LifecycleError::persistence("load build event", e))?
            .ok_or_else(|| LifecycleError::not_found("build event", id))
    }

    /// Lists a tenant's build events, newest first
    pub async fn list_builds(&self, tenant: &TenantNamespace) -> LifecycleResult<Vec<BuildEvent>> {
        BuildEventRepository::find_by_tenant(self.store.as_ref(), tenant)
            .await
            .map_err(|e| LifecycleError::persistence("load build events", e))
    }

    /// Lists images, optionally restricted to one tenant
    pub async fn list_images(&self, tenant: Option<&TenantNamespace>) -> LifecycleResult<Vec<Image>> {
        let images = match tenant {
            Some(tenant) => ImageRepository::find_by_tenant(self.store.as_ref(), tenant).await,
            None => ImageRepository::find_all(self.store.as_ref()).await,
        };
        images.map_err(|e| LifecycleError::persistence("load images", e))
    }

    /// Loads an image together with its SBOM references and findings
    pub async fn image_detail(&self, id: ImageId) -> LifecycleResult<ImageDetailView> {
        let image = ImageRepository::find_by_id(self.store.as_ref(), id)
            .await
            .map_err(|e| LifecycleError::persistence("load image", e))?
            .ok_or_else(|| LifecycleError::not_found("image", id))?;
        let sboms = SbomRecordRepository::find_by_image(self.store.as_ref(), id)
            .await
            .map_err(|e| LifecycleError::persistence("load sbom records", e))?;
        let cves = CveFindingRepository::find_by_image(self.store.as_ref(), id)
            .await
            .map_err(|e| LifecycleError::persistence("load cve findings", e))?;

        Ok(ImageDetailView::new(image, sboms, cves))
    }

    /// Lists a tenant's violations; `active_only` drops resolved ones
    pub async fn list_violations(
        &self,
        tenant: &TenantNamespace,
        active_only: bool,
    ) -> LifecycleResult<Vec<SlaViolation>> {
        let violations = if active_only {
            self.store.find_active_by_tenant(tenant).await
        } else {
            SlaViolationRepository::find_by_tenant(self.store.as_ref(), tenant).await
        };
        violations.map_err(|e| LifecycleError::persistence("load sla violations", e))
    }

    pub async fn list_audit(&self, tenant: &TenantNamespace) -> LifecycleResult<Vec<AuditLogEntry>> {
        AuditLogRepository::find_by_tenant(self.store.as_ref(), tenant)
            .await
            .map_err(|e| LifecycleError::persistence("load audit log", e))
    }
}
