//! Repository layer for database operations
//!
//! This module provides CRUD operations for all entities. Operations that
//! touch more than one table run in a transaction; the reminder completion
//! primitives in particular commit the pointer update and the journal write
//! together or not at all.

use super::models::*;
use crate::config::{completion_description, COMPLETION_PREFIX, COMPLETION_TAGS};
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Reminders =====

    /// Create a new reminder
    pub async fn create_reminder(&self, req: CreateReminderRequest) -> Result<Reminder> {
        let id = Uuid::new_v4().to_string();

        let reminder = sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (id, title, start_date, frequency, window_days, last_completed_on)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.title)
        .bind(req.start_date)
        .bind(req.frequency)
        .bind(req.window_days)
        .bind(req.last_completed_on)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created reminder: {}", id);
        Ok(reminder)
    }

    /// Get a reminder by ID
    pub async fn get_reminder(&self, id: &str) -> Result<Reminder> {
        let reminder = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::ReminderNotFound(id.to_string()))?;

        Ok(reminder)
    }

    /// List all reminders in creation order
    pub async fn list_reminders(&self) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(reminders)
    }

    /// Update a reminder's schedule fields.
    ///
    /// When the title changes, the descriptions of this reminder's
    /// generated journal entries are rewritten to the new join key in the
    /// same transaction, so renames never orphan completion history.
    pub async fn update_reminder(&self, req: UpdateReminderRequest) -> Result<Reminder> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
            .bind(&req.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::ReminderNotFound(req.id.clone()))?;

        // NULL binds leave the column untouched
        let updated = sqlx::query_as::<_, Reminder>(
            r#"
            UPDATE reminders SET
                title = COALESCE(?, title),
                start_date = COALESCE(?, start_date),
                frequency = COALESCE(?, frequency),
                window_days = COALESCE(?, window_days)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&req.title)
        .bind(req.start_date)
        .bind(req.frequency)
        .bind(req.window_days)
        .bind(&req.id)
        .fetch_one(&mut *tx)
        .await?;

        if updated.title != current.title {
            let relabeled = sqlx::query(
                "UPDATE log_entries SET description = ? WHERE description = ?",
            )
            .bind(completion_description(&updated.title))
            .bind(completion_description(&current.title))
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if relabeled > 0 {
                tracing::debug!(
                    "Relabeled {} generated journal entries for reminder {}",
                    relabeled,
                    req.id
                );
            }
        }

        tx.commit().await?;

        tracing::debug!("Updated reminder: {}", req.id);
        Ok(updated)
    }

    /// Delete a reminder. Journal history is kept.
    pub async fn delete_reminder(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::ReminderNotFound(id.to_string()));
        }

        tracing::debug!("Deleted reminder: {}", id);
        Ok(())
    }

    // ===== Reminder Completion =====

    /// Record a completion: set the pointer and file the generated journal
    /// entry unless an identical (date, description) one already exists.
    ///
    /// The join key is built from the title read inside the transaction, so
    /// a completion racing a rename serializes with the rename's relabel
    /// instead of filing under a stale key.
    ///
    /// Returns the updated reminder and whether a journal row was inserted.
    pub async fn record_completion(
        &self,
        reminder_id: &str,
        on: NaiveDate,
    ) -> Result<(Reminder, bool)> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
            .bind(reminder_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::ReminderNotFound(reminder_id.to_string()))?;

        let description = completion_description(&current.title);

        sqlx::query("UPDATE reminders SET last_completed_on = ? WHERE id = ?")
            .bind(on)
            .bind(reminder_id)
            .execute(&mut *tx)
            .await?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM log_entries WHERE entry_date = ? AND description = ?")
                .bind(on)
                .bind(&description)
                .fetch_optional(&mut *tx)
                .await?;

        let inserted = existing.is_none();
        if inserted {
            sqlx::query(
                "INSERT INTO log_entries (id, entry_date, description, tags) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(on)
            .bind(&description)
            .bind(COMPLETION_TAGS)
            .execute(&mut *tx)
            .await?;
        }

        let reminder = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
            .bind(reminder_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("Recorded completion of reminder {} on {}", reminder_id, on);
        Ok((reminder, inserted))
    }

    /// Undo the most recent completion: delete the matching generated
    /// journal entry and roll the pointer back to the most recent remaining
    /// completion, or NULL when none remain. A reminder that has never been
    /// completed comes back unchanged.
    ///
    /// Like `record_completion`, the join key comes from the title read
    /// inside the transaction.
    pub async fn revoke_completion(&self, reminder_id: &str) -> Result<Reminder> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
            .bind(reminder_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::ReminderNotFound(reminder_id.to_string()))?;

        let last = match current.last_completed_on {
            Some(last) => last,
            None => return Ok(current),
        };
        let description = completion_description(&current.title);

        sqlx::query("DELETE FROM log_entries WHERE entry_date = ? AND description = ?")
            .bind(last)
            .bind(&description)
            .execute(&mut *tx)
            .await?;

        let previous: Option<NaiveDate> =
            sqlx::query_scalar("SELECT MAX(entry_date) FROM log_entries WHERE description = ?")
                .bind(&description)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query("UPDATE reminders SET last_completed_on = ? WHERE id = ?")
            .bind(previous)
            .bind(reminder_id)
            .execute(&mut *tx)
            .await?;

        let reminder = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
            .bind(reminder_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Revoked completion of reminder {}; pointer now {:?}",
            reminder_id,
            reminder.last_completed_on
        );
        Ok(reminder)
    }

    // ===== Journal =====

    /// Create a journal entry
    pub async fn create_entry(&self, req: CreateEntryRequest) -> Result<LogEntry> {
        let id = Uuid::new_v4().to_string();

        let entry = sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO log_entries (id, entry_date, description, tags)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(req.entry_date)
        .bind(&req.description)
        .bind(&req.tags)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created journal entry: {}", id);
        Ok(entry)
    }

    /// Get a journal entry by ID
    pub async fn get_entry(&self, id: &str) -> Result<LogEntry> {
        let entry = sqlx::query_as::<_, LogEntry>("SELECT * FROM log_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::EntryNotFound(id.to_string()))?;

        Ok(entry)
    }

    /// List all journal entries, newest date first
    pub async fn list_entries(&self) -> Result<Vec<LogEntry>> {
        let entries = sqlx::query_as::<_, LogEntry>(
            "SELECT * FROM log_entries ORDER BY entry_date DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// List the journal entries for one day
    pub async fn entries_on(&self, day: NaiveDate) -> Result<Vec<LogEntry>> {
        let entries = sqlx::query_as::<_, LogEntry>(
            "SELECT * FROM log_entries WHERE entry_date = ? ORDER BY rowid DESC",
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Search entries by substring on description or tags, optionally
    /// narrowed to one day. Empty text matches everything.
    pub async fn search_entries(&self, text: &str, on: Option<NaiveDate>) -> Result<Vec<LogEntry>> {
        let text = text.trim();
        if text.is_empty() {
            return match on {
                Some(day) => self.entries_on(day).await,
                None => self.list_entries().await,
            };
        }

        let pattern = format!("%{}%", text);
        let entries = match on {
            Some(day) => {
                sqlx::query_as::<_, LogEntry>(
                    r#"
                    SELECT * FROM log_entries
                    WHERE (description LIKE ? OR tags LIKE ?) AND entry_date = ?
                    ORDER BY entry_date DESC, rowid DESC
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .bind(day)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LogEntry>(
                    r#"
                    SELECT * FROM log_entries
                    WHERE description LIKE ? OR tags LIKE ?
                    ORDER BY entry_date DESC, rowid DESC
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(entries)
    }

    /// Update a journal entry
    pub async fn update_entry(&self, req: UpdateEntryRequest) -> Result<LogEntry> {
        let entry = sqlx::query_as::<_, LogEntry>(
            r#"
            UPDATE log_entries SET
                entry_date = COALESCE(?, entry_date),
                description = COALESCE(?, description),
                tags = COALESCE(?, tags)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(req.entry_date)
        .bind(&req.description)
        .bind(&req.tags)
        .bind(&req.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::EntryNotFound(req.id.clone()))?;

        tracing::debug!("Updated journal entry: {}", req.id);
        Ok(entry)
    }

    /// Delete a journal entry.
    ///
    /// When the entry is a generated completion record and the owning
    /// reminder's pointer sits on this date, the pointer rolls back to the
    /// most recent remaining completion, all in one transaction.
    pub async fn delete_entry(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let entry = sqlx::query_as::<_, LogEntry>("SELECT * FROM log_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::EntryNotFound(id.to_string()))?;

        sqlx::query("DELETE FROM log_entries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(title) = entry.description.strip_prefix(COMPLETION_PREFIX) {
            let previous: Option<NaiveDate> =
                sqlx::query_scalar("SELECT MAX(entry_date) FROM log_entries WHERE description = ?")
                    .bind(&entry.description)
                    .fetch_one(&mut *tx)
                    .await?;

            sqlx::query(
                "UPDATE reminders SET last_completed_on = ? WHERE title = ? AND last_completed_on = ?",
            )
            .bind(previous)
            .bind(title)
            .bind(entry.entry_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!("Deleted journal entry: {}", id);
        Ok(())
    }

    /// Distinct days that have at least one journal entry
    pub async fn dates_with_entries(&self) -> Result<Vec<NaiveDate>> {
        let dates: Vec<NaiveDate> =
            sqlx::query_scalar("SELECT DISTINCT entry_date FROM log_entries ORDER BY entry_date")
                .fetch_all(&self.pool)
                .await?;

        Ok(dates)
    }

    /// Distinct first lines of entry descriptions, sorted. Feeds host
    /// autocompletion.
    pub async fn distinct_descriptions(&self) -> Result<Vec<String>> {
        let descriptions: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT description FROM log_entries")
                .fetch_all(&self.pool)
                .await?;

        let mut summaries: Vec<String> = descriptions
            .iter()
            .filter_map(|d| d.lines().next())
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        summaries.sort();
        summaries.dedup();

        Ok(summaries)
    }

    /// Count journal entries within one calendar month
    pub async fn count_entries_in_month(&self, year: i32, month: u32) -> Result<i64> {
        let prefix = format!("{:04}-{:02}%", year, month);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM log_entries WHERE entry_date LIKE ?")
            .bind(prefix)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Count all journal entries
    pub async fn count_entries(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM log_entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Count journal entries whose tag text contains `tag`
    pub async fn count_entries_tagged(&self, tag: &str) -> Result<i64> {
        let pattern = format!("%{}%", tag);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM log_entries WHERE tags LIKE ?")
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // ===== Tasks =====

    /// Create a pending task
    pub async fn create_task(&self, req: CreateTaskRequest) -> Result<Task> {
        let id = Uuid::new_v4().to_string();

        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, details) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(&id)
        .bind(&req.title)
        .bind(&req.details)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created task: {}", id);
        Ok(task)
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: &str) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::TaskNotFound(id.to_string()))?;

        Ok(task)
    }

    /// List all pending tasks, newest first
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY rowid DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    /// Update a task
    pub async fn update_task(&self, req: UpdateTaskRequest) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                title = COALESCE(?, title),
                details = COALESCE(?, details)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&req.title)
        .bind(&req.details)
        .bind(&req.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::TaskNotFound(req.id.clone()))?;

        tracing::debug!("Updated task: {}", req.id);
        Ok(task)
    }

    /// Delete a task
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TaskNotFound(id.to_string()));
        }

        tracing::debug!("Deleted task: {}", id);
        Ok(())
    }

    /// Count pending tasks
    pub async fn count_tasks(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Turn a task into a journal entry and delete it, atomically
    pub async fn log_task_completion(
        &self,
        task_id: &str,
        on: NaiveDate,
        description: &str,
        tags: &str,
    ) -> Result<LogEntry> {
        let mut tx = self.pool.begin().await?;

        let entry = sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO log_entries (id, entry_date, description, tags)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(on)
        .bind(description)
        .bind(tags)
        .fetch_one(&mut *tx)
        .await?;

        let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TaskNotFound(task_id.to_string()));
        }

        tx.commit().await?;

        tracing::debug!("Completed task {} into journal entry {}", task_id, entry.id);
        Ok(entry)
    }

    // ===== Special Days =====

    /// Flag a calendar day, replacing any previous kind
    pub async fn set_special_day(&self, day: NaiveDate, kind: DayKind) -> Result<SpecialDay> {
        let special = sqlx::query_as::<_, SpecialDay>(
            r#"
            INSERT INTO special_days (day, kind) VALUES (?, ?)
            ON CONFLICT(day) DO UPDATE SET kind = excluded.kind
            RETURNING *
            "#,
        )
        .bind(day)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Flagged {} as {}", day, kind);
        Ok(special)
    }

    /// Remove the flag from a day; silent when none exists
    pub async fn clear_special_day(&self, day: NaiveDate) -> Result<()> {
        sqlx::query("DELETE FROM special_days WHERE day = ?")
            .bind(day)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List all flagged days in date order
    pub async fn list_special_days(&self) -> Result<Vec<SpecialDay>> {
        let days = sqlx::query_as::<_, SpecialDay>("SELECT * FROM special_days ORDER BY day")
            .fetch_all(&self.pool)
            .await?;

        Ok(days)
    }

    // ===== Settings =====

    /// Get/set settings
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Set setting: {} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::completion_description;
    use crate::database::schema::initialize_database;
    use crate::schedule::Frequency;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_repo() -> Repository {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        Repository::new(pool)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn boiler_reminder() -> CreateReminderRequest {
        CreateReminderRequest {
            title: "Boiler inspection".to_string(),
            start_date: date(2024, 1, 1),
            frequency: Frequency::Monthly,
            window_days: 10,
            last_completed_on: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_reminder() {
        let repo = create_test_repo().await;

        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();
        assert_eq!(reminder.title, "Boiler inspection");
        assert_eq!(reminder.frequency, Frequency::Monthly);
        assert_eq!(reminder.window_days, 10);
        assert!(reminder.last_completed_on.is_none());

        let fetched = repo.get_reminder(&reminder.id).await.unwrap();
        assert_eq!(fetched.id, reminder.id);
        assert_eq!(fetched.start_date, date(2024, 1, 1));

        assert!(matches!(
            repo.get_reminder("missing").await,
            Err(AppError::ReminderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_reminder_partial() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        let updated = repo
            .update_reminder(UpdateReminderRequest {
                id: reminder.id.clone(),
                title: None,
                start_date: None,
                frequency: Some(Frequency::Quarterly),
                window_days: Some(21),
            })
            .await
            .unwrap();

        assert_eq!(updated.title, "Boiler inspection");
        assert_eq!(updated.frequency, Frequency::Quarterly);
        assert_eq!(updated.window_days, 21);
        assert_eq!(updated.start_date, date(2024, 1, 1));
    }

    #[tokio::test]
    async fn test_rename_relabels_generated_history_only() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        repo.record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();

        // A hand-written entry that merely mentions the old title
        let manual = repo
            .create_entry(CreateEntryRequest {
                entry_date: date(2024, 1, 4),
                description: "Checked the Boiler inspection checklist".to_string(),
                tags: String::new(),
            })
            .await
            .unwrap();

        repo.update_reminder(UpdateReminderRequest {
            id: reminder.id.clone(),
            title: Some("Boiler service".to_string()),
            start_date: None,
            frequency: None,
            window_days: None,
        })
        .await
        .unwrap();

        let entries = repo.entries_on(date(2024, 1, 3)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, completion_description("Boiler service"));

        let untouched = repo.get_entry(&manual.id).await.unwrap();
        assert_eq!(untouched.description, "Checked the Boiler inspection checklist");
    }

    #[tokio::test]
    async fn test_delete_reminder_keeps_history() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        repo.record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();

        repo.delete_reminder(&reminder.id).await.unwrap();

        assert!(repo.get_reminder(&reminder.id).await.is_err());
        assert_eq!(repo.count_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_completion_is_idempotent_on_journal() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        let (first, inserted) = repo
            .record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();
        assert!(inserted);
        assert_eq!(first.last_completed_on, Some(date(2024, 1, 3)));

        let (second, inserted) = repo
            .record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();
        assert!(!inserted);
        assert_eq!(second.last_completed_on, Some(date(2024, 1, 3)));

        assert_eq!(repo.count_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_completion_last_writer_wins() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        repo.record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();
        let (updated, _) = repo
            .record_completion(&reminder.id, date(2024, 2, 2))
            .await
            .unwrap();

        assert_eq!(updated.last_completed_on, Some(date(2024, 2, 2)));
        assert_eq!(repo.count_entries().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_revoke_completion_restores_previous_date() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        repo.record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();
        repo.record_completion(&reminder.id, date(2024, 2, 2))
            .await
            .unwrap();

        let rolled = repo
            .revoke_completion(&reminder.id)
            .await
            .unwrap();
        assert_eq!(rolled.last_completed_on, Some(date(2024, 1, 3)));
        assert_eq!(repo.count_entries().await.unwrap(), 1);

        let cleared = repo
            .revoke_completion(&reminder.id)
            .await
            .unwrap();
        assert_eq!(cleared.last_completed_on, None);
        assert_eq!(repo.count_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_completion_files_under_current_title() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        repo.record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();

        // A rename between two completions relabels the first entry; the
        // second must be filed under the title as of its own transaction,
        // never a title captured earlier.
        repo.update_reminder(UpdateReminderRequest {
            id: reminder.id.clone(),
            title: Some("Boiler service".to_string()),
            start_date: None,
            frequency: None,
            window_days: None,
        })
        .await
        .unwrap();

        repo.record_completion(&reminder.id, date(2024, 2, 2))
            .await
            .unwrap();

        let entries = repo.entries_on(date(2024, 2, 2)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, completion_description("Boiler service"));

        // Undo walks the whole relabeled history.
        let rolled = repo.revoke_completion(&reminder.id).await.unwrap();
        assert_eq!(rolled.last_completed_on, Some(date(2024, 1, 3)));
        let cleared = repo.revoke_completion(&reminder.id).await.unwrap();
        assert_eq!(cleared.last_completed_on, None);
    }

    #[tokio::test]
    async fn test_completion_primitives_require_known_reminder() {
        let repo = create_test_repo().await;

        assert!(matches!(
            repo.record_completion("missing", date(2024, 1, 3)).await,
            Err(AppError::ReminderNotFound(_))
        ));
        assert!(matches!(
            repo.revoke_completion("missing").await,
            Err(AppError::ReminderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_revoke_without_completion_is_noop() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        let unchanged = repo.revoke_completion(&reminder.id).await.unwrap();
        assert_eq!(unchanged.last_completed_on, None);
        assert_eq!(repo.count_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_entry_rolls_back_reminder_pointer() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();

        repo.record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();

        let entries = repo.entries_on(date(2024, 1, 3)).await.unwrap();
        repo.delete_entry(&entries[0].id).await.unwrap();

        let reloaded = repo.get_reminder(&reminder.id).await.unwrap();
        assert_eq!(reloaded.last_completed_on, None);
    }

    #[tokio::test]
    async fn test_delete_handwritten_entry_leaves_reminders_alone() {
        let repo = create_test_repo().await;
        let reminder = repo.create_reminder(boiler_reminder()).await.unwrap();
        repo.record_completion(&reminder.id, date(2024, 1, 3))
            .await
            .unwrap();

        let manual = repo
            .create_entry(CreateEntryRequest {
                entry_date: date(2024, 1, 3),
                description: "Replaced hallway bulbs".to_string(),
                tags: "Electrical".to_string(),
            })
            .await
            .unwrap();

        repo.delete_entry(&manual.id).await.unwrap();

        let reloaded = repo.get_reminder(&reminder.id).await.unwrap();
        assert_eq!(reloaded.last_completed_on, Some(date(2024, 1, 3)));
    }

    #[tokio::test]
    async fn test_journal_search() {
        let repo = create_test_repo().await;

        for (day, description, tags) in [
            (date(2024, 1, 5), "Replaced pump bearing", "Mechanical"),
            (date(2024, 1, 5), "Rewired panel B", "Electrical, Urgent"),
            (date(2024, 2, 7), "Greased pump coupling", "Mechanical, Preventive"),
        ] {
            repo.create_entry(CreateEntryRequest {
                entry_date: day,
                description: description.to_string(),
                tags: tags.to_string(),
            })
            .await
            .unwrap();
        }

        let pumps = repo.search_entries("pump", None).await.unwrap();
        assert_eq!(pumps.len(), 2);

        let january_pumps = repo.search_entries("pump", Some(date(2024, 1, 5))).await.unwrap();
        assert_eq!(january_pumps.len(), 1);
        assert_eq!(january_pumps[0].description, "Replaced pump bearing");

        // Tag text is searched too, case-insensitively.
        let electrical = repo.search_entries("electrical", None).await.unwrap();
        assert_eq!(electrical.len(), 1);

        let that_day = repo.search_entries("", Some(date(2024, 1, 5))).await.unwrap();
        assert_eq!(that_day.len(), 2);
    }

    #[tokio::test]
    async fn test_update_entry() {
        let repo = create_test_repo().await;

        let entry = repo
            .create_entry(CreateEntryRequest {
                entry_date: date(2024, 3, 1),
                description: "Checked extinguishers".to_string(),
                tags: String::new(),
            })
            .await
            .unwrap();

        let updated = repo
            .update_entry(UpdateEntryRequest {
                id: entry.id.clone(),
                entry_date: Some(date(2024, 3, 2)),
                description: None,
                tags: Some("Preventive".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(updated.entry_date, date(2024, 3, 2));
        assert_eq!(updated.description, "Checked extinguishers");
        assert_eq!(updated.tags, "Preventive");
    }

    #[tokio::test]
    async fn test_distinct_descriptions_takes_first_lines() {
        let repo = create_test_repo().await;

        for description in [
            "Replaced pump bearing\nmodel XJ-200",
            "Replaced pump bearing\nmodel XJ-300",
            "Rewired panel B",
        ] {
            repo.create_entry(CreateEntryRequest {
                entry_date: date(2024, 1, 5),
                description: description.to_string(),
                tags: String::new(),
            })
            .await
            .unwrap();
        }

        let summaries = repo.distinct_descriptions().await.unwrap();
        assert_eq!(
            summaries,
            vec!["Replaced pump bearing".to_string(), "Rewired panel B".to_string()]
        );
    }

    #[tokio::test]
    async fn test_month_and_tag_counts() {
        let repo = create_test_repo().await;

        for (day, tags) in [
            (date(2024, 1, 5), "Electrical"),
            (date(2024, 1, 20), "Mechanical, urgent"),
            (date(2024, 2, 2), "Preventive"),
        ] {
            repo.create_entry(CreateEntryRequest {
                entry_date: day,
                description: "work".to_string(),
                tags: tags.to_string(),
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.count_entries_in_month(2024, 1).await.unwrap(), 2);
        assert_eq!(repo.count_entries_in_month(2024, 2).await.unwrap(), 1);
        assert_eq!(repo.count_entries().await.unwrap(), 3);
        assert_eq!(repo.count_entries_tagged("Urgent").await.unwrap(), 1);
        assert_eq!(repo.count_entries_tagged("Electrical").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_task_completion_is_atomic() {
        let repo = create_test_repo().await;

        let task = repo
            .create_task(CreateTaskRequest {
                title: "Order filters".to_string(),
                details: "HEPA, 3 units".to_string(),
            })
            .await
            .unwrap();

        let entry = repo
            .log_task_completion(&task.id, date(2024, 1, 9), "Order filters\nHEPA, 3 units", "")
            .await
            .unwrap();
        assert_eq!(entry.entry_date, date(2024, 1, 9));

        assert!(repo.get_task(&task.id).await.is_err());
        assert_eq!(repo.count_tasks().await.unwrap(), 0);

        // Completing a missing task rolls the journal insert back too.
        let before = repo.count_entries().await.unwrap();
        assert!(repo
            .log_task_completion(&task.id, date(2024, 1, 10), "ghost", "")
            .await
            .is_err());
        assert_eq!(repo.count_entries().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_task_crud() {
        let repo = create_test_repo().await;

        let task = repo
            .create_task(CreateTaskRequest {
                title: "Patch roof".to_string(),
                details: String::new(),
            })
            .await
            .unwrap();

        let updated = repo
            .update_task(UpdateTaskRequest {
                id: task.id.clone(),
                title: None,
                details: Some("east wing".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(updated.title, "Patch roof");
        assert_eq!(updated.details, "east wing");

        assert_eq!(repo.list_tasks().await.unwrap().len(), 1);

        repo.delete_task(&task.id).await.unwrap();
        assert!(matches!(
            repo.delete_task(&task.id).await,
            Err(AppError::TaskNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_special_days_upsert() {
        let repo = create_test_repo().await;

        repo.set_special_day(date(2024, 8, 15), DayKind::Holiday).await.unwrap();
        let replaced = repo
            .set_special_day(date(2024, 8, 15), DayKind::BridgeDay)
            .await
            .unwrap();
        assert_eq!(replaced.kind, DayKind::BridgeDay);

        repo.set_special_day(date(2024, 8, 1), DayKind::Vacation).await.unwrap();

        let days = repo.list_special_days().await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, date(2024, 8, 1));

        repo.clear_special_day(date(2024, 8, 15)).await.unwrap();
        // Clearing twice stays silent.
        repo.clear_special_day(date(2024, 8, 15)).await.unwrap();
        assert_eq!(repo.list_special_days().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_settings() {
        let repo = create_test_repo().await;

        repo.set_setting("calendar_region", "ES").await.unwrap();

        let value = repo.get_setting("calendar_region").await.unwrap();
        assert_eq!(value, Some("ES".to_string()));

        // Update existing
        repo.set_setting("calendar_region", "PT").await.unwrap();

        let updated = repo.get_setting("calendar_region").await.unwrap();
        assert_eq!(updated, Some("PT".to_string()));

        assert_eq!(repo.get_setting("missing").await.unwrap(), None);
    }
}
