//! Reminders service
//!
//! Recurring reminder lifecycle: scheduling, state resolution against an
//! explicit reference date, and completion coordination with the journal.
//! Nothing here reads the clock; hosts pass the date they care about.

use crate::config::{MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};
use crate::database::{CreateReminderRequest, Reminder, Repository, UpdateReminderRequest};
use crate::error::{AppError, Result};
use crate::schedule::{next_occurrence, resolve_state, Frequency, Occurrence, OccurrenceState};
use chrono::NaiveDate;

/// A reminder joined with its occurrence window and state at one reference
/// date.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReminderStatus {
    pub reminder: Reminder,
    pub occurrence: Occurrence,
    pub state: OccurrenceState,
}

/// Service for managing recurring reminders
#[derive(Clone)]
pub struct RemindersService {
    repo: Repository,
}

impl RemindersService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new reminder
    pub async fn create(
        &self,
        title: String,
        start_date: NaiveDate,
        frequency: Frequency,
        window_days: i64,
        last_completed_on: Option<NaiveDate>,
    ) -> Result<Reminder> {
        validate_title(&title)?;
        validate_window(window_days)?;

        tracing::info!("Creating reminder: {}", title);

        let req = CreateReminderRequest {
            title,
            start_date,
            frequency,
            window_days,
            last_completed_on,
        };

        let reminder = self.repo.create_reminder(req).await?;

        tracing::info!("Reminder created successfully: {}", reminder.id);

        Ok(reminder)
    }

    /// Get a reminder by ID
    pub async fn get(&self, id: &str) -> Result<Reminder> {
        self.repo.get_reminder(id).await
    }

    /// List all reminders
    pub async fn list(&self) -> Result<Vec<Reminder>> {
        self.repo.list_reminders().await
    }

    /// Update a reminder's schedule fields
    pub async fn update(
        &self,
        id: String,
        title: Option<String>,
        start_date: Option<NaiveDate>,
        frequency: Option<Frequency>,
        window_days: Option<i64>,
    ) -> Result<Reminder> {
        if let Some(title) = title.as_deref() {
            validate_title(title)?;
        }
        if let Some(days) = window_days {
            validate_window(days)?;
        }

        tracing::debug!("Updating reminder: {}", id);

        let req = UpdateReminderRequest {
            id,
            title,
            start_date,
            frequency,
            window_days,
        };

        let reminder = self.repo.update_reminder(req).await?;

        tracing::debug!("Reminder updated successfully: {}", reminder.id);

        Ok(reminder)
    }

    /// Delete a reminder. Its journal history stays.
    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting reminder: {}", id);

        self.repo.delete_reminder(id).await?;

        tracing::info!("Reminder deleted successfully: {}", id);

        Ok(())
    }

    /// List all reminders with their occurrence window and state at the
    /// given reference date.
    pub async fn list_with_state(&self, reference: NaiveDate) -> Result<Vec<ReminderStatus>> {
        let reminders = self.repo.list_reminders().await?;

        Ok(reminders
            .into_iter()
            .map(|reminder| resolve(reminder, reference))
            .collect())
    }

    /// Mark a reminder complete on the given date.
    ///
    /// Sets the completion pointer and files the generated journal entry.
    /// Completing the same reminder on the same date twice leaves a single
    /// journal row.
    pub async fn complete(&self, id: &str, completion_date: NaiveDate) -> Result<Reminder> {
        let (reminder, inserted) = self.repo.record_completion(id, completion_date).await?;

        if inserted {
            tracing::info!("Completed reminder {} on {}", id, completion_date);
        } else {
            tracing::info!(
                "Re-completed reminder {} on {}; journal entry already present",
                id,
                completion_date
            );
        }

        Ok(reminder)
    }

    /// Undo a reminder's most recent completion.
    ///
    /// Removes the generated journal entry and rolls the pointer back to
    /// the previous completion, or clears it. Does nothing when the
    /// reminder has never been completed.
    pub async fn uncomplete(&self, id: &str) -> Result<Reminder> {
        let reminder = self.repo.revoke_completion(id).await?;

        tracing::info!("Uncompleted reminder {}", id);

        Ok(reminder)
    }
}

fn resolve(reminder: Reminder, reference: NaiveDate) -> ReminderStatus {
    let occurrence = next_occurrence(
        reminder.start_date,
        reminder.frequency,
        reminder.window_days,
        reference,
    );
    let state = resolve_state(occurrence, reminder.last_completed_on, reference);

    ReminderStatus {
        reminder,
        occurrence,
        state,
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation(
            "Reminder title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_window(window_days: i64) -> Result<()> {
    if !(MIN_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&window_days) {
        return Err(AppError::Validation(format!(
            "Window days must be between {} and {}",
            MIN_WINDOW_DAYS, MAX_WINDOW_DAYS
        )));
    }
    Ok(())
}
