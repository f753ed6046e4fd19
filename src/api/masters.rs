//! Master listing endpoints

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    db::MasterRepository,
    middleware::TenantContext,
    models::Master,
    services::RotationService,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/rotation", get(rotation_order))
}

/// Active masters in rotation-fair display order.
///
/// Each call advances the per-tenant rotation counters, so successive calls
/// rotate who is listed first. Display-only; availability is unaffected.
async fn rotation_order(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
) -> Result<Json<Vec<Master>>, AppError> {
    let masters = MasterRepository::new(&state.db)
        .list_active(tenant.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list masters: {}", e);
            AppError::internal("Failed to list masters")
        })?;

    let ordered = RotationService::new(&state.db)
        .next_order(tenant.id, masters)
        .await
        .map_err(|e| {
            tracing::error!("Rotation ordering failed: {}", e);
            AppError::internal("Rotation ordering failed")
        })?;

    Ok(Json(ordered))
}
