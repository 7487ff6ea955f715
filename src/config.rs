//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the crate.

// ===== Reminder Validation Limits =====

/// Minimum attention window for a recurring reminder, in days.
/// A window shorter than one day can never be observed as due.
pub const MIN_WINDOW_DAYS: i64 = 1;

/// Maximum attention window for a recurring reminder, in days (one year).
/// A window longer than the longest supported frequency would keep every
/// occurrence permanently due.
pub const MAX_WINDOW_DAYS: i64 = 365;

// ===== Completion Join Key =====
//
// A completed reminder is recorded in the journal with a generated
// description. That exact text is the only link between a reminder and its
// completion history: there is no foreign key, and every component that
// needs the relation must build the description from these constants rather
// than re-derive the pattern locally.

/// Description prefix for journal entries generated by completing a reminder.
/// The reminder title follows the prefix verbatim.
pub const COMPLETION_PREFIX: &str = "Preventive maintenance: ";

/// Tags attached to generated completion entries (comma-joined, matching the
/// journal's free-text tag format).
pub const COMPLETION_TAGS: &str = "Preventive, Recurring reminder";

/// Build the generated journal description for a reminder title.
pub fn completion_description(title: &str) -> String {
    format!("{}{}", COMPLETION_PREFIX, title)
}

// ===== Dashboard =====

/// Tag categories counted in the dashboard breakdown. Matching is a
/// case-insensitive substring test against each entry's tag text.
pub const DASHBOARD_TAGS: &[&str] = &["Electrical", "Mechanical", "Preventive", "Urgent"];
