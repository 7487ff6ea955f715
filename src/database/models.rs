//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to host frontends.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::schedule::Frequency;

/// A recurring preventive-maintenance reminder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    /// First day of the first occurrence window.
    pub start_date: NaiveDate,
    pub frequency: Frequency,
    /// Length of every occurrence window, in days.
    pub window_days: i64,
    /// Most recent completion date; the coordinator owns this pointer.
    pub last_completed_on: Option<NaiveDate>,
}

/// Create reminder request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReminderRequest {
    pub title: String,
    pub start_date: NaiveDate,
    pub frequency: Frequency,
    pub window_days: i64,
    /// Carried-over completion date when importing an already-running
    /// schedule.
    #[serde(default)]
    pub last_completed_on: Option<NaiveDate>,
}

/// Update reminder request; `None` fields keep their current value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReminderRequest {
    pub id: String,
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub frequency: Option<Frequency>,
    pub window_days: Option<i64>,
}

/// A dated work journal entry.
///
/// Tags are comma-joined free text. Entries generated by completing a
/// reminder carry the completion description that links them back to it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    pub id: String,
    pub entry_date: NaiveDate,
    pub description: String,
    pub tags: String,
}

/// Create journal entry request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub entry_date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub tags: String,
}

/// Update journal entry request; `None` fields keep their current value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEntryRequest {
    pub id: String,
    pub entry_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

/// A pending job waiting to be carried out and journaled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub details: String,
}

/// Create task request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub details: String,
}

/// Update task request; `None` fields keep their current value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: String,
    pub title: Option<String>,
    pub details: Option<String>,
}

/// Kind of a manually flagged calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DayKind {
    Holiday,
    Vacation,
    BridgeDay,
    DayOff,
}

impl DayKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DayKind::Holiday => "holiday",
            DayKind::Vacation => "vacation",
            DayKind::BridgeDay => "bridge_day",
            DayKind::DayOff => "day_off",
        }
    }
}

impl fmt::Display for DayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "holiday" => Ok(DayKind::Holiday),
            "vacation" => Ok(DayKind::Vacation),
            "bridge_day" => Ok(DayKind::BridgeDay),
            "day_off" => Ok(DayKind::DayOff),
            other => Err(AppError::Validation(format!(
                "unrecognized day kind: {}",
                other
            ))),
        }
    }
}

/// A manually flagged calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpecialDay {
    pub day: NaiveDate,
    pub kind: DayKind,
}

/// Host preference entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}
