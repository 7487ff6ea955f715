//! Tasks service
//!
//! Short-lived pending jobs. Completing a task moves its content into the
//! journal and removes it in one step.

use crate::database::{CreateTaskRequest, LogEntry, Repository, Task, UpdateTaskRequest};
use crate::error::{AppError, Result};
use chrono::NaiveDate;

/// Service for pending tasks
#[derive(Clone)]
pub struct TasksService {
    repo: Repository,
}

impl TasksService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Add a pending task
    pub async fn add(&self, title: String, details: String) -> Result<Task> {
        validate_title(&title)?;

        tracing::info!("Adding task: {}", title);

        let req = CreateTaskRequest { title, details };

        let task = self.repo.create_task(req).await?;

        tracing::info!("Task added successfully: {}", task.id);

        Ok(task)
    }

    /// Get a task by ID
    pub async fn get(&self, id: &str) -> Result<Task> {
        self.repo.get_task(id).await
    }

    /// List all pending tasks, newest first
    pub async fn list(&self) -> Result<Vec<Task>> {
        self.repo.list_tasks().await
    }

    /// Update a task
    pub async fn update(
        &self,
        id: String,
        title: Option<String>,
        details: Option<String>,
    ) -> Result<Task> {
        if let Some(title) = title.as_deref() {
            validate_title(title)?;
        }

        tracing::debug!("Updating task: {}", id);

        let req = UpdateTaskRequest { id, title, details };

        let task = self.repo.update_task(req).await?;

        tracing::debug!("Task updated successfully: {}", task.id);

        Ok(task)
    }

    /// Remove a task without journaling it
    pub async fn remove(&self, id: &str) -> Result<()> {
        tracing::info!("Removing task: {}", id);

        self.repo.delete_task(id).await?;

        tracing::info!("Task removed successfully: {}", id);

        Ok(())
    }

    /// Complete a task: file it as a journal entry on the given date and
    /// delete it, atomically. The entry description is the task title with
    /// the details on following lines when present.
    pub async fn complete(
        &self,
        id: &str,
        completion_date: NaiveDate,
        tags: String,
    ) -> Result<LogEntry> {
        let task = self.repo.get_task(id).await?;

        let description = if task.details.trim().is_empty() {
            task.title
        } else {
            format!("{}\n{}", task.title, task.details)
        };

        let entry = self
            .repo
            .log_task_completion(id, completion_date, &description, &tags)
            .await?;

        tracing::info!("Completed task {} into journal entry {}", id, entry.id);

        Ok(entry)
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Task title cannot be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, Repository};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> (TasksService, Repository) {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        (TasksService::new(repo.clone()), repo)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_add_rejects_empty_title() {
        let (service, _repo) = create_test_service().await;

        let result = service.add(String::new(), String::new()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_complete_journals_title_and_details() {
        let (service, repo) = create_test_service().await;

        let task = service
            .add("Order filters".to_string(), "HEPA, 3 units".to_string())
            .await
            .unwrap();

        let entry = service
            .complete(&task.id, date(2024, 1, 9), "Preventive".to_string())
            .await
            .unwrap();

        assert_eq!(entry.description, "Order filters\nHEPA, 3 units");
        assert_eq!(entry.tags, "Preventive");
        assert_eq!(entry.entry_date, date(2024, 1, 9));
        assert!(service.list().await.unwrap().is_empty());
        assert_eq!(repo.count_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_complete_without_details_journals_title_only() {
        let (service, _repo) = create_test_service().await;

        let task = service
            .add("Patch roof".to_string(), "  ".to_string())
            .await
            .unwrap();

        let entry = service
            .complete(&task.id, date(2024, 1, 9), String::new())
            .await
            .unwrap();

        assert_eq!(entry.description, "Patch roof");
    }

    #[tokio::test]
    async fn test_complete_unknown_task() {
        let (service, _repo) = create_test_service().await;

        assert!(matches!(
            service.complete("missing", date(2024, 1, 9), String::new()).await,
            Err(AppError::TaskNotFound(_))
        ));
    }
}
