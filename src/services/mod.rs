//! Services module
//!
//! Business logic services that coordinate between hosts and the repository.

pub mod dashboard;
pub mod journal;
pub mod reminders;
pub mod tasks;

pub use dashboard::{DashboardService, DashboardSummary, TagCount};
pub use journal::JournalService;
pub use reminders::{ReminderStatus, RemindersService};
pub use tasks::TasksService;
