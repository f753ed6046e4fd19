//! Rotation fairness state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many times a master has occupied a display rank for a tenant.
///
/// Persisted so that fairness survives restarts and holds across replicas;
/// never consulted by conflict or availability logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationCounter {
    pub tenant_id: Uuid,
    pub master_id: Uuid,
    pub rank: u32,
    pub count: i64,
}
