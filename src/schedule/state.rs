//! Occurrence state resolution
//!
//! Classifies an occurrence window against the reminder's completion
//! pointer and an explicit reference date. This is the single place the
//! classification rule lives; every listing, dashboard or host view goes
//! through it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::recurrence::Occurrence;

/// Where a reminder occurrence stands relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceState {
    /// The window has not opened yet.
    Future,
    /// The window is open and no completion covers it.
    Due,
    /// A completion covers the window.
    Satisfied,
}

/// Classify an occurrence.
///
/// A completion covers the occurrence when it falls on or after the window
/// start. The window is active while the reference lies inside it,
/// boundaries included. A completion recorded on the reference date itself
/// always yields `Satisfied`, even when the matching window has not opened
/// yet; that check is applied last and unconditionally.
pub fn resolve_state(
    occurrence: Occurrence,
    last_completed_on: Option<NaiveDate>,
    reference: NaiveDate,
) -> OccurrenceState {
    let satisfied = matches!(last_completed_on, Some(done) if done >= occurrence.start);

    let mut state = if occurrence.contains(reference) {
        if satisfied {
            OccurrenceState::Satisfied
        } else {
            OccurrenceState::Due
        }
    } else {
        // The engine never yields a window that ended before the reference,
        // so an inactive window lies ahead of it.
        OccurrenceState::Future
    };

    if last_completed_on == Some(reference) {
        state = OccurrenceState::Satisfied;
    }

    state
}
