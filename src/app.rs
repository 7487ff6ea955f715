//! Application composition root
//!
//! Wires the database pool, repository and services together for an
//! embedding host.

use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{DashboardService, JournalService, RemindersService, TasksService};
use std::path::Path;

/// All services over one database, ready for a host to drive.
///
/// The repository is exposed directly for the operations that have no
/// service of their own, such as the settings key/value store.
#[derive(Clone)]
pub struct App {
    pub repo: Repository,
    pub reminders: RemindersService,
    pub journal: JournalService,
    pub tasks: TasksService,
    pub dashboard: DashboardService,
}

impl App {
    /// Open the database at `db_path`, creating it and running migrations
    /// if needed, and build the service graph. The database file and its
    /// parent directory are the only filesystem side effects.
    pub async fn open(db_path: &Path) -> Result<Self> {
        tracing::info!("Opening maintenance tracker database at {:?}", db_path);

        let pool = create_pool(db_path).await?;
        let repo = Repository::new(pool);

        let reminders = RemindersService::new(repo.clone());
        let journal = JournalService::new(repo.clone());
        let tasks = TasksService::new(repo.clone());
        let dashboard = DashboardService::new(repo.clone(), reminders.clone());

        Ok(Self {
            repo,
            reminders,
            journal,
            tasks,
            dashboard,
        })
    }
}
