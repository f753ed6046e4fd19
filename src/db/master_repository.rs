//! Master repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::parse_db_uuid;
use crate::models::Master;

#[derive(Debug, sqlx::FromRow)]
struct MasterRow {
    id: String,
    tenant_id: String,
    name: String,
    active: i64,
}

pub struct MasterRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MasterRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Master>> {
        let row = sqlx::query_as::<_, MasterRow>(
            r#"
            SELECT id, tenant_id, name, active
            FROM masters
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(tenant_id.to_string())
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get master")?;

        row.map(row_to_master).transpose()
    }

    pub async fn list_active(&self, tenant_id: Uuid) -> Result<Vec<Master>> {
        let rows = sqlx::query_as::<_, MasterRow>(
            r#"
            SELECT id, tenant_id, name, active
            FROM masters
            WHERE tenant_id = ? AND active = 1
            ORDER BY name
            "#,
        )
        .bind(tenant_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list masters")?;

        rows.into_iter().map(row_to_master).collect()
    }
}

fn row_to_master(row: MasterRow) -> Result<Master> {
    Ok(Master {
        id: parse_db_uuid(&row.id)?,
        tenant_id: parse_db_uuid(&row.tenant_id)?,
        name: row.name,
        active: row.active != 0,
    })
}
