//! Business logic services
//!
//! The availability pipeline is calendar -> slots -> conflicts; booking
//! creation and edits re-run the conflict check under a per-master lock
//! before committing.

pub mod availability;
pub mod booking;
pub mod calendar;
pub mod conflicts;
pub mod rotation;
pub mod slots;
pub mod timezone;

pub use availability::{AvailabilityService, DayAvailability};
pub use booking::{BookingService, MasterLockRegistry};
pub use calendar::WorkingCalendar;
pub use rotation::RotationService;
