//! Availability query endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{MasterRepository, SelectionLookup, ServiceRepository},
    middleware::TenantContext,
    services::availability::selection_duration,
    services::AvailabilityService,
    utils::validation::{format_wall_clock, parse_date},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_availability))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    master_id: Uuid,
    /// Local calendar date, "YYYY-MM-DD"
    date: String,
    /// Explicit service duration in minutes
    duration_minutes: Option<u32>,
    /// Comma-separated service ids; their durations are summed
    service_ids: Option<String>,
}

#[derive(Debug, Serialize)]
struct SlotDto {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    date: String,
    slots: Vec<SlotDto>,
    occupied: Vec<SlotDto>,
}

/// Offered slots plus busy ranges for a master and date.
///
/// An inactive master or a master without a schedule yields an empty slot
/// list with status 200; both are expected business states.
async fn get_availability(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date = parse_date(&query.date)?;

    let master = MasterRepository::new(&state.db)
        .get_by_id(tenant.id, query.master_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load master: {}", e);
            AppError::internal("Failed to load master")
        })?
        .ok_or_else(|| AppError::not_found("Master not found"))?;

    let duration_minutes = resolve_duration(&state, &tenant.id, &query).await?;
    if duration_minutes == 0 {
        return Err(AppError::validation(
            "Provide duration_minutes or a non-empty service_ids selection",
        ));
    }

    let view = AvailabilityService::new(&state.db)
        .day_view(&tenant, &master, date, duration_minutes, Utc::now())
        .await
        .map_err(|e| {
            tracing::error!("Availability computation failed: {}", e);
            AppError::internal("Availability computation failed")
        })?;

    Ok(Json(AvailabilityResponse {
        date: view.date.format("%Y-%m-%d").to_string(),
        slots: view
            .slots
            .iter()
            .map(|s| SlotDto {
                start: format_wall_clock(s.start),
                end: format_wall_clock(s.end),
            })
            .collect(),
        occupied: view
            .occupied
            .iter()
            .map(|s| SlotDto {
                start: format_wall_clock(s.start),
                end: format_wall_clock(s.end),
            })
            .collect(),
    }))
}

async fn resolve_duration(
    state: &AppState,
    tenant_id: &Uuid,
    query: &AvailabilityQuery,
) -> Result<u32, AppError> {
    if let Some(duration) = query.duration_minutes {
        return Ok(duration);
    }

    let Some(ref raw) = query.service_ids else {
        return Ok(0);
    };

    let mut ids = Vec::new();
    for part in raw.split(',').filter(|p| !p.is_empty()) {
        let id = Uuid::parse_str(part.trim())
            .map_err(|_| AppError::validation(format!("Invalid service id '{}'", part)))?;
        ids.push(id);
    }

    let services = match ServiceRepository::new(&state.db)
        .get_selection(*tenant_id, &ids)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load services: {}", e);
            AppError::internal("Failed to load services")
        })? {
        SelectionLookup::Selected(services) => services,
        SelectionLookup::UnknownId(id) => {
            return Err(AppError::not_found(format!("Unknown service {}", id)))
        }
    };

    Ok(selection_duration(services.iter().map(|s| s.duration_minutes)))
}
