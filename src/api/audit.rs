//! Audit log endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::AuditRepository, middleware::TenantContext, models::AuditLogEntry, utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_audit_log))
}

#[derive(Debug, Deserialize)]
struct AuditLogQuery {
    limit: Option<u32>,
}

/// Most recent audit entries for the tenant, newest first
async fn list_audit_log(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLogEntry>>, AppError> {
    let limit = query.limit.unwrap_or(100).min(1000);

    let entries = AuditRepository::new(&state.db)
        .list(tenant.id, limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list audit log: {}", e);
            AppError::internal("Failed to list audit log")
        })?;

    Ok(Json(entries))
}
