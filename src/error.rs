//! Error types for the maintenance tracker core
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to host frontends.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reminder not found: {0}")]
    ReminderNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
