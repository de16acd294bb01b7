use super::completion_unit::SqliteCompletionUnit;
use super::{queries, schema};
use crate::lifecycle::domain::{
    AuditLogEntry, BuildEvent, BuildEventId, BuildStatus, BuildTransition, Customer, CveFinding,
    CveFindingId, Image, ImageId, NewAuditLogEntry, NewBuildEvent, NewCustomer, SbomRecord,
    Severity, SlaViolation, SlaViolationId, TenantNamespace,
};
use crate::ports::outbound::{
    AuditLogRepository, BuildEventRepository, CompletionUnit, CustomerRepository,
    CveFindingRepository, ImageRepository, SbomRecordRepository, SlaViolationRepository,
    StoreError, StoreResult, TransitionOutcome, UnitOfWork,
};
use crate::shared::{LifecycleError, LifecycleResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, TransactionBehavior};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Raised when the future awaiting a blocking task is dropped
///
/// The blocking task keeps running after its caller goes away, so it checks
/// this flag before touching the database and again before committing.
struct AbandonOnDrop(Arc<AtomicBool>);

impl AbandonOnDrop {
    fn new() -> (Self, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (Self(Arc::clone(&flag)), flag)
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn ensure_awaited(abandoned: &AtomicBool) -> StoreResult<()> {
    if abandoned.load(Ordering::SeqCst) {
        return Err(StoreError::Abandoned);
    }
    Ok(())
}

/// SqliteStore adapter implementing every persistence port
///
/// A single connection is shared behind a mutex and all statements run on
/// the blocking thread pool. Serializing access through the mutex, together
/// with `BEGIN IMMEDIATE` for completions, means a completion transaction
/// never interleaves with another writer.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and ensures the schema exists
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the schema cannot
    /// be applied
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> StoreResult<Self> {
        schema::initialize(&mut conn)?;
        tracing::debug!("sqlite schema ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `operation` against the connection on the blocking thread pool
    ///
    /// If the caller drops the returned future while the task is still
    /// waiting for the connection, `operation` never runs.
    async fn with_connection<T, F>(&self, operation: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let (_abandon, abandoned) = AbandonOnDrop::new();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            ensure_awaited(&abandoned)?;
            operation(&guard)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

#[async_trait]
impl UnitOfWork for SqliteStore {
    async fn transaction<T, F>(&self, work: F) -> LifecycleResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn CompletionUnit) -> LifecycleResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let (_abandon, abandoned) = AbandonOnDrop::new();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| LifecycleError::persistence("begin transaction", StoreError::LockPoisoned))?;
            ensure_awaited(&abandoned)
                .map_err(|e| LifecycleError::persistence("begin transaction", e))?;
            let tx = guard
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| LifecycleError::persistence("begin transaction", e.into()))?;

            let value = {
                let mut unit = SqliteCompletionUnit::new(&tx);
                work(&mut unit)?
            };

            // Dropping `tx` without committing rolls every write back
            ensure_awaited(&abandoned)
                .map_err(|e| LifecycleError::persistence("commit transaction", e))?;
            tx.commit()
                .map_err(|e| LifecycleError::persistence("commit transaction", e.into()))?;
            Ok(value)
        })
        .await
        .map_err(|e| {
            LifecycleError::persistence("run transaction", StoreError::TaskFailed(e.to_string()))
        })?
    }
}

#[async_trait]
impl BuildEventRepository for SqliteStore {
    async fn create(&self, event: NewBuildEvent, now: DateTime<Utc>) -> StoreResult<BuildEvent> {
        self.with_connection(move |conn| queries::insert_build_event(conn, &event, now))
            .await
    }

    async fn find_by_id(&self, id: BuildEventId) -> StoreResult<Option<BuildEvent>> {
        self.with_connection(move |conn| queries::find_build_event(conn, id))
            .await
    }

    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<BuildEvent>> {
        let tenant = tenant.clone();
        self.with_connection(move |conn| queries::find_build_events_by_tenant(conn, &tenant))
            .await
    }

    async fn transition(
        &self,
        id: BuildEventId,
        expected: BuildStatus,
        transition: BuildTransition,
        now: DateTime<Utc>,
    ) -> StoreResult<TransitionOutcome> {
        self.with_connection(move |conn| {
            queries::transition_build_event(conn, id, expected, transition, now)
        })
        .await
    }
}

#[async_trait]
impl ImageRepository for SqliteStore {
    async fn find_by_id(&self, id: ImageId) -> StoreResult<Option<Image>> {
        self.with_connection(move |conn| queries::find_image(conn, id))
            .await
    }

    async fn find_all(&self) -> StoreResult<Vec<Image>> {
        self.with_connection(queries::find_all_images).await
    }

    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<Image>> {
        let tenant = tenant.clone();
        self.with_connection(move |conn| queries::find_images_by_tenant(conn, &tenant))
            .await
    }
}

#[async_trait]
impl SbomRecordRepository for SqliteStore {
    async fn find_by_image(&self, image_id: ImageId) -> StoreResult<Vec<SbomRecord>> {
        self.with_connection(move |conn| queries::find_sbom_records_by_image(conn, image_id))
            .await
    }
}

#[async_trait]
impl CveFindingRepository for SqliteStore {
    async fn find_by_image(&self, image_id: ImageId) -> StoreResult<Vec<CveFinding>> {
        self.with_connection(move |conn| queries::find_cve_findings_by_image(conn, image_id))
            .await
    }

    async fn find_by_tenant_and_severity(
        &self,
        tenant: &TenantNamespace,
        severity: Severity,
    ) -> StoreResult<Vec<CveFinding>> {
        let tenant = tenant.clone();
        self.with_connection(move |conn| {
            queries::find_cve_findings_by_tenant_and_severity(conn, &tenant, severity)
        })
        .await
    }
}

#[async_trait]
impl CustomerRepository for SqliteStore {
    async fn create(&self, customer: NewCustomer, now: DateTime<Utc>) -> StoreResult<Customer> {
        self.with_connection(move |conn| queries::insert_customer(conn, &customer, now))
            .await
    }

    async fn find_all(&self) -> StoreResult<Vec<Customer>> {
        self.with_connection(queries::find_all_customers).await
    }

    async fn find_by_namespace(
        &self,
        namespace: &TenantNamespace,
    ) -> StoreResult<Option<Customer>> {
        let namespace = namespace.clone();
        self.with_connection(move |conn| queries::find_customer(conn, &namespace))
            .await
    }
}

#[async_trait]
impl SlaViolationRepository for SqliteStore {
    async fn create_active_if_absent(
        &self,
        tenant: &TenantNamespace,
        cve_finding_id: CveFindingId,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SlaViolation>> {
        let tenant = tenant.clone();
        self.with_connection(move |conn| {
            queries::insert_active_violation_if_absent(conn, &tenant, cve_finding_id, now)
        })
        .await
    }

    async fn find_active_by_tenant(
        &self,
        tenant: &TenantNamespace,
    ) -> StoreResult<Vec<SlaViolation>> {
        let tenant = tenant.clone();
        self.with_connection(move |conn| queries::find_violations_by_tenant(conn, &tenant, true))
            .await
    }

    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<SlaViolation>> {
        let tenant = tenant.clone();
        self.with_connection(move |conn| queries::find_violations_by_tenant(conn, &tenant, false))
            .await
    }

    async fn resolve(&self, id: SlaViolationId, now: DateTime<Utc>) -> StoreResult<bool> {
        self.with_connection(move |conn| queries::resolve_violation(conn, id, now))
            .await
    }
}

#[async_trait]
impl AuditLogRepository for SqliteStore {
    async fn create(
        &self,
        entry: NewAuditLogEntry,
        now: DateTime<Utc>,
    ) -> StoreResult<AuditLogEntry> {
        self.with_connection(move |conn| queries::insert_audit_log(conn, &entry, now))
            .await
    }

    async fn find_by_tenant(&self, tenant: &TenantNamespace) -> StoreResult<Vec<AuditLogEntry>> {
        let tenant = tenant.clone();
        self.with_connection(move |conn| queries::find_audit_logs_by_tenant(conn, &tenant))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::domain::{
        AuditAction, BuildState, CveDescriptor, ImageDigest, NewImage, SbomDescriptor, SlaTier,
        SlsaLevel, TriggerType, ViolationState,
    };
    use tempfile::TempDir;

    fn tenant(name: &str) -> TenantNamespace {
        TenantNamespace::new(name).unwrap()
    }

    fn create_test_new_image(digest: &str) -> NewImage {
        NewImage {
            tenant_namespace: tenant("acme"),
            digest: ImageDigest::new(digest).unwrap(),
            tags: vec!["v2".to_string(), "latest".to_string(), "v1".to_string()],
            slsa_level: SlsaLevel::new(3).unwrap(),
        }
    }

    async fn create_pending_event(store: &SqliteStore) -> BuildEvent {
        BuildEventRepository::create(
            store,
            NewBuildEvent {
                tenant_namespace: tenant("acme"),
                trigger_type: TriggerType::Api,
            },
            Utc::now(),
        )
        .await
        .unwrap()
    }

    /// Stores an image with the given findings in one committed transaction
    async fn create_test_image_with_cves(store: &SqliteStore, cves: Vec<CveDescriptor>) -> Image {
        store
            .transaction(move |unit| {
                let image = unit
                    .insert_image(&create_test_new_image("sha256:seed"), Utc::now())
                    .map_err(|e| LifecycleError::persistence("create image", e))?;
                unit.insert_cve_findings(image.id, &cves, Utc::now())
                    .map_err(|e| LifecycleError::persistence("create cve findings", e))?;
                Ok(image)
            })
            .await
            .unwrap()
    }

    // ========== Build events ==========

    #[tokio::test]
    async fn test_create_and_find_build_event() {
        let store = SqliteStore::open_in_memory().unwrap();
        let created = create_pending_event(&store).await;

        assert_eq!(created.status(), BuildStatus::Pending);
        let found = BuildEventRepository::find_by_id(&store, created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_find_build_events_by_tenant_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = create_pending_event(&store).await;
        let second = create_pending_event(&store).await;

        let events = BuildEventRepository::find_by_tenant(&store, &tenant("acme"))
            .await
            .unwrap();
        assert_eq!(
            events.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert!(BuildEventRepository::find_by_tenant(&store, &tenant("other"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_transition_compare_and_set() {
        let store = SqliteStore::open_in_memory().unwrap();
        let event = create_pending_event(&store).await;

        let applied = store
            .transition(event.id, BuildStatus::Pending, BuildTransition::Fail, Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            applied,
            TransitionOutcome::Applied(BuildEvent {
                state: BuildState::Failed,
                ..
            })
        ));

        let conflict = store
            .transition(event.id, BuildStatus::Pending, BuildTransition::Fail, Utc::now())
            .await
            .unwrap();
        assert_eq!(conflict, TransitionOutcome::Conflict(BuildStatus::Failed));

        let missing = store
            .transition(
                BuildEventId::new(999),
                BuildStatus::Pending,
                BuildTransition::Fail,
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(missing, TransitionOutcome::Missing);
    }

    // ========== Transactions ==========

    #[tokio::test]
    async fn test_transaction_commits_on_ok() {
        let store = SqliteStore::open_in_memory().unwrap();
        let image = store
            .transaction(|unit| {
                unit.insert_image(&create_test_new_image("sha256:abc"), Utc::now())
                    .map_err(|e| LifecycleError::persistence("create image", e))
            })
            .await
            .unwrap();

        let found = ImageRepository::find_by_id(&store, image.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, image);
        assert_eq!(found.tags, vec!["v2", "latest", "v1"]);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_err() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result: LifecycleResult<()> = store
            .transaction(|unit| {
                let image = unit
                    .insert_image(&create_test_new_image("sha256:abc"), Utc::now())
                    .map_err(|e| LifecycleError::persistence("create image", e))?;
                unit.insert_sbom_records(
                    image.id,
                    &[SbomDescriptor::new("SPDX", "s3://x").unwrap()],
                    Utc::now(),
                )
                .map_err(|e| LifecycleError::persistence("create sbom records", e))?;
                Err(LifecycleError::validation("abort"))
            })
            .await;

        assert!(result.is_err());
        assert!(ImageRepository::find_all(&store).await.unwrap().is_empty());
        assert!(SbomRecordRepository::find_by_image(&store, ImageId::new(1))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_cve_in_batch_is_constraint_violation() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result: LifecycleResult<Vec<CveFinding>> = store
            .transaction(|unit| {
                let image = unit
                    .insert_image(&create_test_new_image("sha256:abc"), Utc::now())
                    .map_err(|e| LifecycleError::persistence("create image", e))?;
                let cve = CveDescriptor::new("CVE-2024-1", "High", "", false).unwrap();
                unit.insert_cve_findings(image.id, &[cve.clone(), cve], Utc::now())
                    .map_err(|e| LifecycleError::persistence("create cve findings", e))
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            &err,
            LifecycleError::Persistence { operation, details }
                if operation == "create cve findings" && details.contains("UNIQUE")
        ));
        assert!(ImageRepository::find_all(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_digest_unique_per_tenant() {
        let store = SqliteStore::open_in_memory().unwrap();
        let insert = |store: SqliteStore| async move {
            store
                .transaction(|unit| {
                    unit.insert_image(&create_test_new_image("sha256:abc"), Utc::now())
                        .map_err(|e| LifecycleError::persistence("create image", e))
                })
                .await
        };

        insert(store.clone()).await.unwrap();
        let err = insert(store.clone()).await.unwrap_err();
        assert!(err.to_string().contains("create image"));
    }

    // ========== Catalog reads ==========

    #[tokio::test]
    async fn test_find_cves_by_tenant_and_severity() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_test_image_with_cves(
            &store,
            vec![
                CveDescriptor::new("CVE-1", "Critical", "", false).unwrap(),
                CveDescriptor::new("CVE-2", "Low", "", true).unwrap(),
            ],
        )
        .await;

        let critical = store
            .find_by_tenant_and_severity(&tenant("acme"), Severity::Critical)
            .await
            .unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].cve_id, "CVE-1");

        let other_tenant = store
            .find_by_tenant_and_severity(&tenant("globex"), Severity::Critical)
            .await
            .unwrap();
        assert!(other_tenant.is_empty());
    }

    #[tokio::test]
    async fn test_customers() {
        let store = SqliteStore::open_in_memory().unwrap();
        let customer = NewCustomer::new(tenant("acme"), "Acme Corp", "ops@acme.test", SlaTier::Premium)
            .unwrap();

        CustomerRepository::create(&store, customer.clone(), Utc::now())
            .await
            .unwrap();
        let duplicate = CustomerRepository::create(&store, customer, Utc::now()).await;
        assert!(matches!(duplicate, Err(StoreError::Constraint(_))));

        let found = store.find_by_namespace(&tenant("acme")).await.unwrap().unwrap();
        assert_eq!(found.sla_tier, SlaTier::Premium);
        assert_eq!(CustomerRepository::find_all(&store).await.unwrap().len(), 1);
    }

    // ========== SLA violations ==========

    #[tokio::test]
    async fn test_create_active_violation_if_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let image = create_test_image_with_cves(
            &store,
            vec![CveDescriptor::new("CVE-1", "Critical", "", false).unwrap()],
        )
        .await;
        let finding = CveFindingRepository::find_by_image(&store, image.id)
            .await
            .unwrap()
            .remove(0);

        let first = store
            .create_active_if_absent(&tenant("acme"), finding.id, Utc::now())
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .create_active_if_absent(&tenant("acme"), finding.id, Utc::now())
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(
            store.find_active_by_tenant(&tenant("acme")).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_resolve_violation_allows_new_active_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let image = create_test_image_with_cves(
            &store,
            vec![CveDescriptor::new("CVE-1", "Critical", "", false).unwrap()],
        )
        .await;
        let finding_id = CveFindingRepository::find_by_image(&store, image.id)
            .await
            .unwrap()[0]
            .id;

        let violation = store
            .create_active_if_absent(&tenant("acme"), finding_id, Utc::now())
            .await
            .unwrap()
            .unwrap();

        assert!(store.resolve(violation.id, Utc::now()).await.unwrap());
        assert!(!store.resolve(violation.id, Utc::now()).await.unwrap());
        assert!(store.find_active_by_tenant(&tenant("acme")).await.unwrap().is_empty());

        let all = SlaViolationRepository::find_by_tenant(&store, &tenant("acme"))
            .await
            .unwrap();
        assert!(matches!(all[0].state, ViolationState::Resolved { .. }));

        let reopened = store
            .create_active_if_absent(&tenant("acme"), finding_id, Utc::now())
            .await
            .unwrap();
        assert!(reopened.is_some());
    }

    // ========== Audit logs ==========

    #[tokio::test]
    async fn test_audit_log_details_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let entry = NewAuditLogEntry::new(tenant("acme"), AuditAction::BUILD_TRIGGERED, "system")
            .with_detail("build_event_id", 42)
            .with_detail("trigger_type", "api");

        let created = AuditLogRepository::create(&store, entry, Utc::now())
            .await
            .unwrap();
        let listed = AuditLogRepository::find_by_tenant(&store, &tenant("acme"))
            .await
            .unwrap();

        assert_eq!(listed, vec![created]);
        assert_eq!(listed[0].details["build_event_id"], 42);
    }

    // ========== Files ==========

    #[tokio::test]
    async fn test_open_file_persists_between_handles() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lifecycle.db");

        let event = {
            let store = SqliteStore::open(&path).unwrap();
            create_pending_event(&store).await
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let found = BuildEventRepository::find_by_id(&reopened, event.id)
            .await
            .unwrap();
        assert_eq!(found, Some(event));
    }
}
