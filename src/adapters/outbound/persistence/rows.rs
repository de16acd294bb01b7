use crate::lifecycle::domain::{
    AuditDetails, AuditLogEntry, AuditLogId, BuildEvent, BuildEventId, BuildState, BuildStatus,
    Customer, CveFinding, CveFindingId, Image, ImageDigest, ImageId, SbomRecord, SbomRecordId,
    Severity, SlaTier, SlaViolation, SlaViolationId, SlsaLevel, TenantNamespace, TriggerType,
    ViolationState,
};
use crate::ports::outbound::{StoreError, StoreResult};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Row;

/// Drops sub-microsecond precision so stored and in-memory values compare equal
pub(super) fn normalize(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(6)
}

/// Fixed-width RFC 3339 in UTC, which also sorts lexicographically
pub(super) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("invalid timestamp '{}': {}", value, e)))
}

fn parse_tenant(value: String) -> StoreResult<TenantNamespace> {
    TenantNamespace::new(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

pub(super) fn encode_tags(tags: &[String]) -> StoreResult<String> {
    serde_json::to_string(tags).map_err(|e| StoreError::Backend(e.to_string()))
}

pub(super) fn encode_details(details: &AuditDetails) -> StoreResult<String> {
    serde_json::to_string(details).map_err(|e| StoreError::Backend(e.to_string()))
}

pub(super) struct BuildEventRow {
    id: i64,
    tenant_namespace: String,
    image_id: Option<i64>,
    trigger_type: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl BuildEventRow {
    pub(super) const COLUMNS: &'static str =
        "id, tenant_namespace, image_id, trigger_type, status, created_at, updated_at";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_namespace: row.get(1)?,
            image_id: row.get(2)?,
            trigger_type: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    pub(super) fn into_domain(self) -> StoreResult<BuildEvent> {
        let status: BuildStatus = self.status.parse().map_err(StoreError::Corrupt)?;
        let state = BuildState::from_parts(status, self.image_id.map(ImageId::new))
            .map_err(|e| StoreError::Corrupt(format!("build event {}: {}", self.id, e)))?;
        let trigger_type = TriggerType::parse(&self.trigger_type)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(BuildEvent {
            id: BuildEventId::new(self.id),
            tenant_namespace: parse_tenant(self.tenant_namespace)?,
            trigger_type,
            state,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

pub(super) struct ImageRow {
    id: i64,
    tenant_namespace: String,
    digest: String,
    tags: String,
    slsa_level: i64,
    created_at: String,
    updated_at: String,
}

impl ImageRow {
    pub(super) const COLUMNS: &'static str =
        "id, tenant_namespace, digest, tags, slsa_level, created_at, updated_at";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_namespace: row.get(1)?,
            digest: row.get(2)?,
            tags: row.get(3)?,
            slsa_level: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    pub(super) fn into_domain(self) -> StoreResult<Image> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| StoreError::Corrupt(format!("image {} tags: {}", self.id, e)))?;

        Ok(Image {
            id: ImageId::new(self.id),
            tenant_namespace: parse_tenant(self.tenant_namespace)?,
            digest: ImageDigest::new(self.digest).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            tags,
            slsa_level: SlsaLevel::new(self.slsa_level)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

pub(super) struct SbomRecordRow {
    id: i64,
    image_id: i64,
    format: String,
    uri: String,
    created_at: String,
}

impl SbomRecordRow {
    pub(super) const COLUMNS: &'static str = "id, image_id, format, uri, created_at";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            image_id: row.get(1)?,
            format: row.get(2)?,
            uri: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub(super) fn into_domain(self) -> StoreResult<SbomRecord> {
        Ok(SbomRecord {
            id: SbomRecordId::new(self.id),
            image_id: ImageId::new(self.image_id),
            format: self.format,
            uri: self.uri,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub(super) struct CveFindingRow {
    id: i64,
    image_id: i64,
    cve_id: String,
    severity: String,
    description: String,
    fix_available: bool,
    created_at: String,
}

impl CveFindingRow {
    /// Column list qualified for use in joins against `images`
    pub(super) const COLUMNS: &'static str = "cve_findings.id, cve_findings.image_id, cve_findings.cve_id, \
         cve_findings.severity, cve_findings.description, cve_findings.fix_available, \
         cve_findings.created_at";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            image_id: row.get(1)?,
            cve_id: row.get(2)?,
            severity: row.get(3)?,
            description: row.get(4)?,
            fix_available: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    pub(super) fn into_domain(self) -> StoreResult<CveFinding> {
        Ok(CveFinding {
            id: CveFindingId::new(self.id),
            image_id: ImageId::new(self.image_id),
            cve_id: self.cve_id,
            severity: Severity::parse(&self.severity)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            description: self.description,
            fix_available: self.fix_available,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub(super) struct CustomerRow {
    namespace: String,
    name: String,
    contact_info: String,
    sla_tier: String,
    created_at: String,
    updated_at: String,
}

impl CustomerRow {
    pub(super) const COLUMNS: &'static str =
        "namespace, name, contact_info, sla_tier, created_at, updated_at";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            namespace: row.get(0)?,
            name: row.get(1)?,
            contact_info: row.get(2)?,
            sla_tier: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    pub(super) fn into_domain(self) -> StoreResult<Customer> {
        Ok(Customer {
            namespace: parse_tenant(self.namespace)?,
            name: self.name,
            contact_info: self.contact_info,
            sla_tier: SlaTier::from_label(&self.sla_tier),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

pub(super) struct SlaViolationRow {
    id: i64,
    tenant_namespace: String,
    cve_finding_id: i64,
    status: String,
    created_at: String,
    resolved_at: Option<String>,
}

impl SlaViolationRow {
    pub(super) const COLUMNS: &'static str =
        "id, tenant_namespace, cve_finding_id, status, created_at, resolved_at";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_namespace: row.get(1)?,
            cve_finding_id: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
            resolved_at: row.get(5)?,
        })
    }

    pub(super) fn into_domain(self) -> StoreResult<SlaViolation> {
        let state = match (self.status.as_str(), self.resolved_at.as_deref()) {
            ("active", None) => ViolationState::Active,
            ("resolved", Some(resolved_at)) => ViolationState::Resolved {
                resolved_at: parse_timestamp(resolved_at)?,
            },
            (status, _) => {
                return Err(StoreError::Corrupt(format!(
                    "sla violation {} has inconsistent status '{}'",
                    self.id, status
                )))
            }
        };

        Ok(SlaViolation {
            id: SlaViolationId::new(self.id),
            tenant_namespace: parse_tenant(self.tenant_namespace)?,
            cve_finding_id: CveFindingId::new(self.cve_finding_id),
            state,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub(super) struct AuditLogRow {
    id: i64,
    tenant_namespace: String,
    action: String,
    actor: String,
    details: String,
    created_at: String,
}

impl AuditLogRow {
    pub(super) const COLUMNS: &'static str =
        "id, tenant_namespace, action, actor, details, created_at";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_namespace: row.get(1)?,
            action: row.get(2)?,
            actor: row.get(3)?,
            details: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    pub(super) fn into_domain(self) -> StoreResult<AuditLogEntry> {
        let details: AuditDetails = serde_json::from_str(&self.details)
            .map_err(|e| StoreError::Corrupt(format!("audit log {} details: {}", self.id, e)))?;

        Ok(AuditLogEntry {
            id: AuditLogId::new(self.id),
            tenant_namespace: parse_tenant(self.tenant_namespace)?,
            action: self.action,
            actor: self.actor,
            details,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
