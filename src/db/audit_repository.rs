//! Audit log repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_uuid};
use crate::models::{ActorKind, AuditLogEntry};

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: String,
    tenant_id: String,
    actor_kind: String,
    actor_id: Option<String>,
    action: String,
    resource_type: String,
    resource_id: Option<String>,
    details: Option<String>,
    created_at: String,
}

pub struct AuditRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, tenant_id: Uuid, limit: u32) -> Result<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, tenant_id, actor_kind, actor_id, action,
                   resource_type, resource_id, details, created_at
            FROM audit_log
            WHERE tenant_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(tenant_id.to_string())
        .bind(limit as i64)
        .fetch_all(self.pool)
        .await
        .context("Failed to list audit log entries")?;

        rows.into_iter().map(row_to_audit).collect()
    }
}

/// Insert an audit entry inside an already-open transaction.
///
/// Booking writes call this so the audit record commits or rolls back with
/// the booking itself.
pub async fn insert_tx(
    conn: &mut SqliteConnection,
    tenant_id: Uuid,
    actor_kind: ActorKind,
    actor_id: Option<&str>,
    action: &str,
    resource_type: &str,
    resource_id: Option<&str>,
    details: Option<&serde_json::Value>,
) -> Result<AuditLogEntry> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let details_str = details.map(|d| d.to_string());

    sqlx::query(
        r#"
        INSERT INTO audit_log (id, tenant_id, actor_kind, actor_id, action,
                               resource_type, resource_id, details, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(tenant_id.to_string())
    .bind(actor_kind.as_str())
    .bind(actor_id)
    .bind(action)
    .bind(resource_type)
    .bind(resource_id)
    .bind(details_str.as_deref())
    .bind(created_at.to_rfc3339())
    .execute(conn)
    .await
    .context("Failed to insert audit log entry")?;

    Ok(AuditLogEntry {
        id,
        tenant_id,
        actor_kind,
        actor_id: actor_id.map(|s| s.to_string()),
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.map(|s| s.to_string()),
        details: details.cloned(),
        created_at,
    })
}

fn row_to_audit(row: AuditRow) -> Result<AuditLogEntry> {
    Ok(AuditLogEntry {
        id: parse_db_uuid(&row.id)?,
        tenant_id: parse_db_uuid(&row.tenant_id)?,
        actor_kind: ActorKind::parse(&row.actor_kind).unwrap_or(ActorKind::System),
        actor_id: row.actor_id,
        action: row.action,
        resource_type: row.resource_type,
        resource_id: row.resource_id,
        details: row.details.as_deref().and_then(|d| serde_json::from_str(d).ok()),
        created_at: parse_db_timestamp(&row.created_at)?,
    })
}
