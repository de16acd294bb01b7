use crate::ports::outbound::StoreResult;
use rusqlite::Connection;

/// Current schema version recorded in `PRAGMA user_version`
pub(super) const SCHEMA_VERSION: i64 = 1;

/// Table definitions
///
/// Customers are not referenced by foreign keys: builds may be requested for
/// a namespace before it is registered.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS customers (
    namespace    TEXT PRIMARY KEY NOT NULL,
    name         TEXT NOT NULL,
    contact_info TEXT NOT NULL DEFAULT '',
    sla_tier     TEXT NOT NULL DEFAULT '',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS images (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_namespace TEXT NOT NULL,
    digest           TEXT NOT NULL CHECK (length(digest) > 0),
    tags             TEXT NOT NULL DEFAULT '[]',
    slsa_level       INTEGER NOT NULL CHECK (slsa_level >= 0),
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (tenant_namespace, digest)
);

CREATE TABLE IF NOT EXISTS build_events (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_namespace TEXT NOT NULL,
    image_id         INTEGER REFERENCES images(id),
    trigger_type     TEXT NOT NULL,
    status           TEXT NOT NULL CHECK (status IN ('pending', 'completed', 'failed')),
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    CHECK ((status = 'completed') = (image_id IS NOT NULL))
);
CREATE INDEX IF NOT EXISTS idx_build_events_tenant ON build_events (tenant_namespace);

CREATE TABLE IF NOT EXISTS sbom_records (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id   INTEGER NOT NULL REFERENCES images(id),
    format     TEXT NOT NULL CHECK (length(format) > 0),
    uri        TEXT NOT NULL CHECK (length(uri) > 0),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sbom_records_image ON sbom_records (image_id);

CREATE TABLE IF NOT EXISTS cve_findings (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id      INTEGER NOT NULL REFERENCES images(id),
    cve_id        TEXT NOT NULL CHECK (length(cve_id) > 0),
    severity      TEXT NOT NULL CHECK (severity IN ('Low', 'Medium', 'High', 'Critical')),
    description   TEXT NOT NULL DEFAULT '',
    fix_available INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    UNIQUE (image_id, cve_id)
);

CREATE TABLE IF NOT EXISTS sla_violations (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_namespace TEXT NOT NULL,
    cve_finding_id   INTEGER NOT NULL REFERENCES cve_findings(id),
    status           TEXT NOT NULL CHECK (status IN ('active', 'resolved')),
    created_at       TEXT NOT NULL,
    resolved_at      TEXT,
    CHECK ((status = 'resolved') = (resolved_at IS NOT NULL))
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sla_violations_active
    ON sla_violations (tenant_namespace, cve_finding_id)
    WHERE status = 'active';

CREATE TABLE IF NOT EXISTS audit_logs (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_namespace TEXT NOT NULL,
    action           TEXT NOT NULL,
    actor            TEXT NOT NULL,
    details          TEXT NOT NULL DEFAULT '{}',
    created_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audit_logs_tenant ON audit_logs (tenant_namespace);
";

/// Applies connection pragmas and creates any missing tables
pub(super) fn initialize(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_repeatable() {
        let mut conn = Connection::open_in_memory().unwrap();
        initialize(&mut conn).unwrap();
        initialize(&mut conn).unwrap();

        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_completed_build_requires_image() {
        let mut conn = Connection::open_in_memory().unwrap();
        initialize(&mut conn).unwrap();

        let result = conn.execute(
            "INSERT INTO build_events (tenant_namespace, image_id, trigger_type, status, created_at, updated_at)
             VALUES ('acme', NULL, 'api', 'completed', 'x', 'x')",
            [],
        );
        assert!(result.is_err());
    }
}
