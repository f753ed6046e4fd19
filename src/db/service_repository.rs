//! Service catalogue repository (read model)

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::parse_db_uuid;
use crate::models::Service;

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: String,
    tenant_id: String,
    name: String,
    duration_minutes: i64,
    price_cents: i64,
    requires_confirmation: i64,
    active: i64,
}

pub struct ServiceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ServiceRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, tenant_id, name, duration_minutes, price_cents,
                   requires_confirmation, active
            FROM services
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(tenant_id.to_string())
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get service")?;

        row.map(row_to_service).transpose()
    }

    /// Fetch the selected services, preserving the caller's selection order.
    ///
    /// An id that does not resolve is a business outcome, not a query
    /// failure, so it is reported in the lookup result rather than as an
    /// error; the handler surfaces it as a 404 instead of silently pricing
    /// a shorter booking.
    pub async fn get_selection(&self, tenant_id: Uuid, ids: &[Uuid]) -> Result<SelectionLookup> {
        let mut services = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_by_id(tenant_id, *id).await? {
                Some(service) => services.push(service),
                None => return Ok(SelectionLookup::UnknownId(*id)),
            }
        }
        Ok(SelectionLookup::Selected(services))
    }
}

/// Outcome of resolving a caller's service selection
#[derive(Debug)]
pub enum SelectionLookup {
    /// Every id resolved; services are in the caller's selection order
    Selected(Vec<Service>),
    /// The first id with no service row for this tenant
    UnknownId(Uuid),
}

fn row_to_service(row: ServiceRow) -> Result<Service> {
    Ok(Service {
        id: parse_db_uuid(&row.id)?,
        tenant_id: parse_db_uuid(&row.tenant_id)?,
        name: row.name,
        duration_minutes: row.duration_minutes.max(0) as u32,
        price_cents: row.price_cents,
        requires_confirmation: row.requires_confirmation != 0,
        active: row.active != 0,
    })
}
