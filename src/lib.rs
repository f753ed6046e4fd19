//! Slotbook library
//!
//! Availability and booking conflict engine for salon scheduling: decides
//! which time slots may be offered for a master and date, and guarantees a
//! committed booking never overlaps another.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::TenantContext;
pub use services::MasterLockRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Per-master serialization locks for booking writes
    pub locks: Arc<MasterLockRegistry>,
}
