use super::rows::{
    encode_details, encode_tags, format_timestamp, normalize, AuditLogRow, BuildEventRow,
    CustomerRow, CveFindingRow, ImageRow, SbomRecordRow, SlaViolationRow,
};
use crate::lifecycle::domain::{
    AuditLogEntry, AuditLogId, BuildEvent, BuildEventId, BuildState, BuildStatus,
    BuildTransition, Customer, CveDescriptor, CveFinding, CveFindingId, Image, ImageId,
    NewAuditLogEntry, NewBuildEvent, NewCustomer, NewImage, SbomDescriptor, SbomRecord,
    SbomRecordId, Severity, SlaViolation, SlaViolationId, TenantNamespace, ViolationState,
};
use crate::ports::outbound::{StoreResult, TransitionOutcome};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

/// Runs a query and converts every row into a domain value
fn collect_rows<P, R, T>(
    conn: &Connection,
    sql: &str,
    params: P,
    from_row: fn(&Row<'_>) -> rusqlite::Result<R>,
    into_domain: fn(R) -> StoreResult<T>,
) -> StoreResult<Vec<T>>
where
    P: Params,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, from_row)?;

    let mut values = Vec::new();
    for row in rows {
        values.push(into_domain(row?)?);
    }
    Ok(values)
}

/// Runs a single-row query, treating "no rows" as None
fn optional_row<P, R, T>(
    conn: &Connection,
    sql: &str,
    params: P,
    from_row: fn(&Row<'_>) -> rusqlite::Result<R>,
    into_domain: fn(R) -> StoreResult<T>,
) -> StoreResult<Option<T>>
where
    P: Params,
{
    conn.query_row(sql, params, from_row)
        .optional()?
        .map(into_domain)
        .transpose()
}

// ========== Build events ==========

pub(super) fn insert_build_event(
    conn: &Connection,
    event: &NewBuildEvent,
    now: DateTime<Utc>,
) -> StoreResult<BuildEvent> {
    let now = normalize(now);
    let stamp = format_timestamp(now);
    conn.execute(
        "INSERT INTO build_events (tenant_namespace, image_id, trigger_type, status, created_at, updated_at)
         VALUES (?1, NULL, ?2, ?3, ?4, ?4)",
        params![
            event.tenant_namespace.as_str(),
            event.trigger_type.as_str(),
            BuildStatus::Pending.as_str(),
            stamp
        ],
    )?;

    Ok(BuildEvent {
        id: BuildEventId::new(conn.last_insert_rowid()),
        tenant_namespace: event.tenant_namespace.clone(),
        trigger_type: event.trigger_type.clone(),
        state: BuildState::Pending,
        created_at: now,
        updated_at: now,
    })
}

pub(super) fn find_build_event(
    conn: &Connection,
    id: BuildEventId,
) -> StoreResult<Option<BuildEvent>> {
    let sql = format!("SELECT {} FROM build_events WHERE id = ?1", BuildEventRow::COLUMNS);
    optional_row(
        conn,
        &sql,
        params![id.get()],
        BuildEventRow::from_row,
        BuildEventRow::into_domain,
    )
}

pub(super) fn find_build_events_by_tenant(
    conn: &Connection,
    tenant: &TenantNamespace,
) -> StoreResult<Vec<BuildEvent>> {
    let sql = format!(
        "SELECT {} FROM build_events WHERE tenant_namespace = ?1 ORDER BY id DESC",
        BuildEventRow::COLUMNS
    );
    collect_rows(
        conn,
        &sql,
        params![tenant.as_str()],
        BuildEventRow::from_row,
        BuildEventRow::into_domain,
    )
}

/// Compare-and-set on the stored status
///
/// The `WHERE status = expected` clause makes the check and the write one
/// statement, so two racing callers cannot both observe `expected`.
pub(super) fn transition_build_event(
    conn: &Connection,
    id: BuildEventId,
    expected: BuildStatus,
    transition: BuildTransition,
    now: DateTime<Utc>,
) -> StoreResult<TransitionOutcome> {
    let target = transition.target();
    let changed = conn.execute(
        "UPDATE build_events SET status = ?1, image_id = ?2, updated_at = ?3
         WHERE id = ?4 AND status = ?5",
        params![
            target.status().as_str(),
            target.image_id().map(ImageId::get),
            format_timestamp(normalize(now)),
            id.get(),
            expected.as_str()
        ],
    )?;

    let current = find_build_event(conn, id)?;
    Ok(match (changed, current) {
        (_, None) => TransitionOutcome::Missing,
        (0, Some(event)) => TransitionOutcome::Conflict(event.status()),
        (_, Some(event)) => TransitionOutcome::Applied(event),
    })
}

// ========== Images ==========

pub(super) fn insert_image(
    conn: &Connection,
    image: &NewImage,
    now: DateTime<Utc>,
) -> StoreResult<Image> {
    let now = normalize(now);
    let stamp = format_timestamp(now);
    conn.execute(
        "INSERT INTO images (tenant_namespace, digest, tags, slsa_level, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            image.tenant_namespace.as_str(),
            image.digest.as_str(),
            encode_tags(&image.tags)?,
            image.slsa_level.get(),
            stamp
        ],
    )?;

    Ok(Image {
        id: ImageId::new(conn.last_insert_rowid()),
        tenant_namespace: image.tenant_namespace.clone(),
        digest: image.digest.clone(),
        tags: image.tags.clone(),
        slsa_level: image.slsa_level,
        created_at: now,
        updated_at: now,
    })
}

pub(super) fn find_image(conn: &Connection, id: ImageId) -> StoreResult<Option<Image>> {
    let sql = format!("SELECT {} FROM images WHERE id = ?1", ImageRow::COLUMNS);
    optional_row(
        conn,
        &sql,
        params![id.get()],
        ImageRow::from_row,
        ImageRow::into_domain,
    )
}

pub(super) fn find_all_images(conn: &Connection) -> StoreResult<Vec<Image>> {
    let sql = format!("SELECT {} FROM images ORDER BY id", ImageRow::COLUMNS);
    collect_rows(conn, &sql, params![], ImageRow::from_row, ImageRow::into_domain)
}

pub(super) fn find_images_by_tenant(
    conn: &Connection,
    tenant: &TenantNamespace,
) -> StoreResult<Vec<Image>> {
    let sql = format!(
        "SELECT {} FROM images WHERE tenant_namespace = ?1 ORDER BY id",
        ImageRow::COLUMNS
    );
    collect_rows(
        conn,
        &sql,
        params![tenant.as_str()],
        ImageRow::from_row,
        ImageRow::into_domain,
    )
}

// ========== SBOM records ==========

pub(super) fn insert_sbom_records(
    conn: &Connection,
    image_id: ImageId,
    sboms: &[SbomDescriptor],
    now: DateTime<Utc>,
) -> StoreResult<Vec<SbomRecord>> {
    let now = normalize(now);
    let stamp = format_timestamp(now);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO sbom_records (image_id, format, uri, created_at) VALUES (?1, ?2, ?3, ?4)",
    )?;

    let mut records = Vec::with_capacity(sboms.len());
    for sbom in sboms {
        let id = stmt.insert(params![image_id.get(), sbom.format(), sbom.uri(), stamp])?;
        records.push(SbomRecord {
            id: SbomRecordId::new(id),
            image_id,
            format: sbom.format().to_string(),
            uri: sbom.uri().to_string(),
            created_at: now,
        });
    }
    Ok(records)
}

pub(super) fn find_sbom_records_by_image(
    conn: &Connection,
    image_id: ImageId,
) -> StoreResult<Vec<SbomRecord>> {
    let sql = format!(
        "SELECT {} FROM sbom_records WHERE image_id = ?1 ORDER BY id",
        SbomRecordRow::COLUMNS
    );
    collect_rows(
        conn,
        &sql,
        params![image_id.get()],
        SbomRecordRow::from_row,
        SbomRecordRow::into_domain,
    )
}

// ========== CVE findings ==========

pub(super) fn insert_cve_findings(
    conn: &Connection,
    image_id: ImageId,
    cves: &[CveDescriptor],
    now: DateTime<Utc>,
) -> StoreResult<Vec<CveFinding>> {
    let now = normalize(now);
    let stamp = format_timestamp(now);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO cve_findings (image_id, cve_id, severity, description, fix_available, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    let mut findings = Vec::with_capacity(cves.len());
    for cve in cves {
        let id = stmt.insert(params![
            image_id.get(),
            cve.cve_id,
            cve.severity.as_str(),
            cve.description,
            cve.fix_available,
            stamp
        ])?;
        findings.push(CveFinding {
            id: CveFindingId::new(id),
            image_id,
            cve_id: cve.cve_id.clone(),
            severity: cve.severity,
            description: cve.description.clone(),
            fix_available: cve.fix_available,
            created_at: now,
        });
    }
    Ok(findings)
}

pub(super) fn find_cve_findings_by_image(
    conn: &Connection,
    image_id: ImageId,
) -> StoreResult<Vec<CveFinding>> {
    let sql = format!(
        "SELECT {} FROM cve_findings WHERE image_id = ?1 ORDER BY id",
        CveFindingRow::COLUMNS
    );
    collect_rows(
        conn,
        &sql,
        params![image_id.get()],
        CveFindingRow::from_row,
        CveFindingRow::into_domain,
    )
}

pub(super) fn find_cve_findings_by_tenant_and_severity(
    conn: &Connection,
    tenant: &TenantNamespace,
    severity: Severity,
) -> StoreResult<Vec<CveFinding>> {
    let sql = format!(
        "SELECT {} FROM cve_findings
         JOIN images ON images.id = cve_findings.image_id
         WHERE images.tenant_namespace = ?1 AND cve_findings.severity = ?2
         ORDER BY cve_findings.id",
        CveFindingRow::COLUMNS
    );
    collect_rows(
        conn,
        &sql,
        params![tenant.as_str(), severity.as_str()],
        CveFindingRow::from_row,
        CveFindingRow::into_domain,
    )
}

// ========== Customers ==========

pub(super) fn insert_customer(
    conn: &Connection,
    customer: &NewCustomer,
    now: DateTime<Utc>,
) -> StoreResult<Customer> {
    let now = normalize(now);
    let stamp = format_timestamp(now);
    conn.execute(
        "INSERT INTO customers (namespace, name, contact_info, sla_tier, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            customer.namespace.as_str(),
            customer.name,
            customer.contact_info,
            customer.sla_tier.as_str(),
            stamp
        ],
    )?;

    Ok(Customer {
        namespace: customer.namespace.clone(),
        name: customer.name.clone(),
        contact_info: customer.contact_info.clone(),
        sla_tier: customer.sla_tier.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub(super) fn find_all_customers(conn: &Connection) -> StoreResult<Vec<Customer>> {
    let sql = format!("SELECT {} FROM customers ORDER BY namespace", CustomerRow::COLUMNS);
    collect_rows(conn, &sql, params![], CustomerRow::from_row, CustomerRow::into_domain)
}

pub(super) fn find_customer(
    conn: &Connection,
    namespace: &TenantNamespace,
) -> StoreResult<Option<Customer>> {
    let sql = format!("SELECT {} FROM customers WHERE namespace = ?1", CustomerRow::COLUMNS);
    optional_row(
        conn,
        &sql,
        params![namespace.as_str()],
        CustomerRow::from_row,
        CustomerRow::into_domain,
    )
}

// ========== SLA violations ==========

/// Inserts an active violation unless the partial unique index already holds one
pub(super) fn insert_active_violation_if_absent(
    conn: &Connection,
    tenant: &TenantNamespace,
    cve_finding_id: CveFindingId,
    now: DateTime<Utc>,
) -> StoreResult<Option<SlaViolation>> {
    let now = normalize(now);
    let inserted = conn.execute(
        "INSERT INTO sla_violations (tenant_namespace, cve_finding_id, status, created_at, resolved_at)
         VALUES (?1, ?2, 'active', ?3, NULL)
         ON CONFLICT DO NOTHING",
        params![tenant.as_str(), cve_finding_id.get(), format_timestamp(now)],
    )?;

    if inserted == 0 {
        return Ok(None);
    }

    Ok(Some(SlaViolation {
        id: SlaViolationId::new(conn.last_insert_rowid()),
        tenant_namespace: tenant.clone(),
        cve_finding_id,
        state: ViolationState::Active,
        created_at: now,
    }))
}

pub(super) fn find_violations_by_tenant(
    conn: &Connection,
    tenant: &TenantNamespace,
    active_only: bool,
) -> StoreResult<Vec<SlaViolation>> {
    let filter = if active_only {
        " AND status = 'active'"
    } else {
        ""
    };
    let sql = format!(
        "SELECT {} FROM sla_violations WHERE tenant_namespace = ?1{} ORDER BY id",
        SlaViolationRow::COLUMNS,
        filter
    );
    collect_rows(
        conn,
        &sql,
        params![tenant.as_str()],
        SlaViolationRow::from_row,
        SlaViolationRow::into_domain,
    )
}

pub(super) fn resolve_violation(
    conn: &Connection,
    id: SlaViolationId,
    now: DateTime<Utc>,
) -> StoreResult<bool> {
    let changed = conn.execute(
        "UPDATE sla_violations SET status = 'resolved', resolved_at = ?1
         WHERE id = ?2 AND status = 'active'",
        params![format_timestamp(normalize(now)), id.get()],
    )?;
    Ok(changed == 1)
}

// ========== Audit logs ==========

pub(super) fn insert_audit_log(
    conn: &Connection,
    entry: &NewAuditLogEntry,
    now: DateTime<Utc>,
) -> StoreResult<AuditLogEntry> {
    let now = normalize(now);
    conn.execute(
        "INSERT INTO audit_logs (tenant_namespace, action, actor, details, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.tenant_namespace.as_str(),
            entry.action,
            entry.actor,
            encode_details(&entry.details)?,
            format_timestamp(now)
        ],
    )?;

    Ok(AuditLogEntry {
        id: AuditLogId::new(conn.last_insert_rowid()),
        tenant_namespace: entry.tenant_namespace.clone(),
        action: entry.action.clone(),
        actor: entry.actor.clone(),
        details: entry.details.clone(),
        created_at: now,
    })
}

pub(super) fn find_audit_logs_by_tenant(
    conn: &Connection,
    tenant: &TenantNamespace,
) -> StoreResult<Vec<AuditLogEntry>> {
    let sql = format!(
        "SELECT {} FROM audit_logs WHERE tenant_namespace = ?1 ORDER BY id",
        AuditLogRow::COLUMNS
    );
    collect_rows(
        conn,
        &sql,
        params![tenant.as_str()],
        AuditLogRow::from_row,
        AuditLogRow::into_domain,
    )
}
