//! Rotation counter repository
//!
//! Counters are persisted per tenant so fairness holds across process
//! restarts and replicas. Increments run inside the same transaction as the
//! ordering that consumed them.

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::parse_db_uuid;
use crate::models::RotationCounter;

#[derive(Debug, sqlx::FromRow)]
struct RotationRow {
    tenant_id: String,
    master_id: String,
    rank: i64,
    count: i64,
}

pub struct RotationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RotationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn counters_for(&self, tenant_id: Uuid) -> Result<Vec<RotationCounter>> {
        let rows = sqlx::query_as::<_, RotationRow>(
            r#"
            SELECT tenant_id, master_id, rank, count
            FROM rotation_counters
            WHERE tenant_id = ?
            "#,
        )
        .bind(tenant_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to load rotation counters")?;

        rows.into_iter()
            .map(|row| {
                Ok(RotationCounter {
                    tenant_id: parse_db_uuid(&row.tenant_id)?,
                    master_id: parse_db_uuid(&row.master_id)?,
                    rank: row.rank.max(0) as u32,
                    count: row.count,
                })
            })
            .collect()
    }
}

/// Record that a master occupied a display rank
pub async fn increment_tx(
    conn: &mut SqliteConnection,
    tenant_id: Uuid,
    master_id: Uuid,
    rank: u32,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO rotation_counters (tenant_id, master_id, rank, count)
        VALUES (?, ?, ?, 1)
        ON CONFLICT (tenant_id, master_id, rank)
        DO UPDATE SET count = count + 1
        "#,
    )
    .bind(tenant_id.to_string())
    .bind(master_id.to_string())
    .bind(rank as i64)
    .execute(conn)
    .await
    .context("Failed to increment rotation counter")?;

    Ok(())
}
