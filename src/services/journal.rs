//! Journal service
//!
//! Dated work journal holding hand-written entries alongside generated
//! completion records, plus the manually flagged calendar days that host
//! calendars render next to them.

use crate::database::{
    CreateEntryRequest, DayKind, LogEntry, Repository, SpecialDay, UpdateEntryRequest,
};
use crate::error::{AppError, Result};
use chrono::NaiveDate;

/// Service for the work journal
#[derive(Clone)]
pub struct JournalService {
    repo: Repository,
}

impl JournalService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Record a journal entry
    pub async fn record(
        &self,
        entry_date: NaiveDate,
        description: String,
        tags: String,
    ) -> Result<LogEntry> {
        validate_description(&description)?;

        tracing::info!("Recording journal entry on {}", entry_date);

        let req = CreateEntryRequest {
            entry_date,
            description,
            tags,
        };

        let entry = self.repo.create_entry(req).await?;

        tracing::info!("Journal entry recorded successfully: {}", entry.id);

        Ok(entry)
    }

    /// Get an entry by ID
    pub async fn get(&self, id: &str) -> Result<LogEntry> {
        self.repo.get_entry(id).await
    }

    /// List all entries, newest date first
    pub async fn list(&self) -> Result<Vec<LogEntry>> {
        self.repo.list_entries().await
    }

    /// List the entries for one day
    pub async fn entries_on(&self, day: NaiveDate) -> Result<Vec<LogEntry>> {
        self.repo.entries_on(day).await
    }

    /// Search entries by text on description or tags, optionally narrowed
    /// to one day
    pub async fn search(&self, text: &str, on: Option<NaiveDate>) -> Result<Vec<LogEntry>> {
        self.repo.search_entries(text, on).await
    }

    /// Update an entry
    pub async fn update(
        &self,
        id: String,
        entry_date: Option<NaiveDate>,
        description: Option<String>,
        tags: Option<String>,
    ) -> Result<LogEntry> {
        if let Some(description) = description.as_deref() {
            validate_description(description)?;
        }

        tracing::debug!("Updating journal entry: {}", id);

        let req = UpdateEntryRequest {
            id,
            entry_date,
            description,
            tags,
        };

        let entry = self.repo.update_entry(req).await?;

        tracing::debug!("Journal entry updated successfully: {}", entry.id);

        Ok(entry)
    }

    /// Delete an entry. Deleting a generated completion record rolls the
    /// owning reminder's pointer back to its previous completion.
    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting journal entry: {}", id);

        self.repo.delete_entry(id).await?;

        tracing::info!("Journal entry deleted successfully: {}", id);

        Ok(())
    }

    /// Distinct days that have entries, for calendar hosts
    pub async fn dates_with_entries(&self) -> Result<Vec<NaiveDate>> {
        self.repo.dates_with_entries().await
    }

    /// Distinct entry summaries (first lines), for autocompletion
    pub async fn distinct_descriptions(&self) -> Result<Vec<String>> {
        self.repo.distinct_descriptions().await
    }

    /// Count entries within one calendar month
    pub async fn count_in_month(&self, year: i32, month: u32) -> Result<i64> {
        self.repo.count_entries_in_month(year, month).await
    }

    /// Flag a calendar day, replacing any previous kind
    pub async fn set_special_day(&self, day: NaiveDate, kind: DayKind) -> Result<SpecialDay> {
        tracing::info!("Flagging {} as {}", day, kind);

        self.repo.set_special_day(day, kind).await
    }

    /// Remove the flag from a day; silent when none exists
    pub async fn clear_special_day(&self, day: NaiveDate) -> Result<()> {
        tracing::info!("Clearing flag on {}", day);

        self.repo.clear_special_day(day).await
    }

    /// List flagged days in date order
    pub async fn list_special_days(&self) -> Result<Vec<SpecialDay>> {
        self.repo.list_special_days().await
    }
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "Journal entry description cannot be empty".to_string(),
        ));
    }
    Ok(())
}
