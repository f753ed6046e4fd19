//! Tenant repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::parse_db_uuid;
use crate::models::Tenant;

#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: String,
    name: String,
    timezone: String,
    slot_step_minutes: i64,
    lead_time_minutes: i64,
    active: i64,
    allow_overbooking_edits: i64,
}

pub struct TenantRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TenantRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT id, name, timezone, slot_step_minutes, lead_time_minutes,
                   active, allow_overbooking_edits
            FROM tenants
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get tenant")?;

        row.map(row_to_tenant).transpose()
    }
}

fn row_to_tenant(row: TenantRow) -> Result<Tenant> {
    Ok(Tenant {
        id: parse_db_uuid(&row.id)?,
        name: row.name,
        timezone: row.timezone,
        slot_step_minutes: row.slot_step_minutes.max(1) as u32,
        lead_time_minutes: row.lead_time_minutes.max(0) as u32,
        active: row.active != 0,
        allow_overbooking_edits: row.allow_overbooking_edits != 0,
    })
}
