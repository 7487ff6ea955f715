//! Scheduling core
//!
//! Pure date arithmetic for recurring reminders: occurrence computation
//! and state classification. Nothing in this module touches the database
//! or reads the clock; callers pass an explicit reference date.

pub mod recurrence;
pub mod state;

pub use recurrence::{next_occurrence, Frequency, Occurrence};
pub use state::{resolve_state, OccurrenceState};
