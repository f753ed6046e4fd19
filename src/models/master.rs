//! Master (staff member) model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A staff member who performs services and has a schedule.
///
/// Deactivation is a soft flag; a master is never deleted while bookings
/// reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Master {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub active: bool,
}
