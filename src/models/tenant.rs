//! Tenant (salon account) model

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// IANA timezone name, e.g. "Europe/Berlin"
    pub timezone: String,
    /// Slot grid granularity in minutes (commonly 15/30/60)
    pub slot_step_minutes: u32,
    /// Minimum notice before a booking's start, in minutes
    pub lead_time_minutes: u32,
    pub active: bool,
    /// When set, staff edits that collide with an existing booking are
    /// committed anyway and the conflict is recorded in the audit log.
    /// Client-facing creation is always hard-blocked regardless.
    pub allow_overbooking_edits: bool,
}

impl Tenant {
    /// Resolve the tenant's timezone against the zone database
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }
}
