use super::StoreResult;
use crate::lifecycle::domain::{Customer, NewCustomer, TenantNamespace};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// CustomerRepository port for tenant records
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Registers a tenant
    ///
    /// # Errors
    /// Returns `StoreError::Constraint` if the namespace is already registered
    async fn create(&self, customer: NewCustomer, now: DateTime<Utc>) -> StoreResult<Customer>;

    async fn find_all(&self) -> StoreResult<Vec<Customer>>;

    async fn find_by_namespace(&self, namespace: &TenantNamespace)
        -> StoreResult<Option<Customer>>;
}
