//! Facility maintenance tracker core.
//!
//! Recurring preventive-maintenance reminders over a dated work journal,
//! plus pending tasks, flagged calendar days and dashboard counters, all
//! stored in SQLite.
//!
//! The crate never reads the clock. Every operation that depends on
//! "today" takes an explicit reference or completion date, so hosts stay
//! in charge of time and tests are reproducible.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod schedule;
pub mod services;

pub use app::App;
pub use error::{AppError, Result};
pub use schedule::{next_occurrence, resolve_state, Frequency, Occurrence, OccurrenceState};
