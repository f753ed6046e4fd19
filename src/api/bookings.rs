//! Booking endpoints: create, list, edit and status transitions

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::BookingRepository,
    middleware::TenantContext,
    models::{
        ActorKind, Booking, CreateBookingRequest, StatusChangeRequest, UpdateBookingRequest,
    },
    services::{timezone, BookingService},
    utils::validation::parse_date,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/{id}", get(get_booking).put(edit_booking))
        .route("/{id}/status", post(change_status))
}

/// The acting party, passed by the outer auth layer. Client is assumed when
/// the header is absent, which matches the public booking widget.
fn actor_from_headers(headers: &HeaderMap) -> (ActorKind, Option<String>) {
    let kind = headers
        .get("x-actor-kind")
        .and_then(|v| v.to_str().ok())
        .and_then(ActorKind::parse)
        .unwrap_or(ActorKind::Client);
    let id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    (kind, id)
}

async fn create_booking(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
    headers: HeaderMap,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    payload.validate()?;
    let (actor_kind, actor_id) = actor_from_headers(&headers);

    let service = BookingService::new(&state.db, &state.locks);
    let booking = service
        .create(&tenant, &payload, actor_kind, actor_id.as_deref(), Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Debug, Deserialize)]
struct ListBookingsQuery {
    master_id: Uuid,
    /// Local date range, inclusive on both ends
    from: String,
    to: String,
}

async fn list_bookings(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let from_date = parse_date(&query.from)?;
    let to_date = parse_date(&query.to)?;
    if from_date > to_date {
        return Err(AppError::validation("from must not be after to"));
    }
    let tz = tenant.tz()?;

    let from = timezone::to_utc(from_date, NaiveTime::MIN, tz);
    let to = timezone::to_utc(
        to_date.succ_opt().unwrap_or(to_date),
        NaiveTime::MIN,
        tz,
    );

    let bookings = BookingRepository::new(&state.db)
        .list_for_master(tenant.id, query.master_id, from, to)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list bookings: {}", e);
            AppError::internal("Failed to list bookings")
        })?;

    Ok(Json(bookings))
}

async fn get_booking(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = BookingRepository::new(&state.db)
        .get_by_id(tenant.id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get booking: {}", e);
            AppError::internal("Failed to get booking")
        })?
        .ok_or_else(|| AppError::not_found("Booking not found"))?;

    Ok(Json(booking))
}

async fn edit_booking(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    payload.validate()?;
    let (actor_kind, actor_id) = actor_from_headers(&headers);

    let service = BookingService::new(&state.db, &state.locks);
    let booking = service
        .edit(
            &tenant,
            id,
            &payload,
            actor_kind,
            actor_id.as_deref(),
            Utc::now(),
        )
        .await?;

    Ok(Json(booking))
}

async fn change_status(
    State(state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<Booking>, AppError> {
    let (actor_kind, actor_id) = actor_from_headers(&headers);

    let service = BookingService::new(&state.db, &state.locks);
    let booking = service
        .change_status(
            &tenant,
            id,
            payload.status,
            actor_kind,
            actor_id.as_deref(),
            Utc::now(),
        )
        .await?;

    Ok(Json(booking))
}
