//! Tenant resolution
//!
//! The engine does not authenticate; the surrounding application is expected
//! to have done that already and to pass the resolved tenant id in the
//! `X-Tenant-Id` header. This extractor loads the tenant row so every
//! handler operates strictly within one tenant's data.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{db::TenantRepository, models::Tenant, utils::AppError, AppState};

/// Header carrying the tenant id resolved by the outer auth layer
pub const TENANT_HEADER: &str = "x-tenant-id";

/// The tenant a request is scoped to
#[derive(Debug, Clone)]
pub struct TenantContext(pub Tenant);

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::bad_request("Missing X-Tenant-Id header"))?;

        let tenant_id = Uuid::parse_str(header)
            .map_err(|_| AppError::bad_request("Invalid X-Tenant-Id header"))?;

        let tenant = TenantRepository::new(&state.db)
            .get_by_id(tenant_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load tenant: {}", e);
                AppError::internal("Failed to load tenant")
            })?
            .ok_or_else(|| AppError::not_found("Tenant not found"))?;

        Ok(TenantContext(tenant))
    }
}
