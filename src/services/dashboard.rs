//! Dashboard service
//!
//! Read-only counters summarizing the tracker at one reference date.

use crate::config::DASHBOARD_TAGS;
use crate::database::Repository;
use crate::error::Result;
use crate::schedule::OccurrenceState;
use crate::services::reminders::RemindersService;
use chrono::{Datelike, NaiveDate};

/// Counters for the host dashboard
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardSummary {
    pub reminders_due: i64,
    pub open_tasks: i64,
    pub entries_this_month: i64,
    pub total_entries: i64,
    pub tag_counts: Vec<TagCount>,
}

/// Entry count for one fixed dashboard category
#[derive(Debug, Clone, serde::Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Service assembling the dashboard summary
#[derive(Clone)]
pub struct DashboardService {
    repo: Repository,
    reminders: RemindersService,
}

impl DashboardService {
    pub fn new(repo: Repository, reminders: RemindersService) -> Self {
        Self { repo, reminders }
    }

    /// Assemble the summary for one reference date.
    ///
    /// The due count goes through the scheduling core, so it agrees with
    /// what `list_with_state` reports for the same date.
    pub async fn summary(&self, reference: NaiveDate) -> Result<DashboardSummary> {
        let statuses = self.reminders.list_with_state(reference).await?;
        let reminders_due = statuses
            .iter()
            .filter(|status| status.state == OccurrenceState::Due)
            .count() as i64;

        let open_tasks = self.repo.count_tasks().await?;
        let entries_this_month = self
            .repo
            .count_entries_in_month(reference.year(), reference.month())
            .await?;
        let total_entries = self.repo.count_entries().await?;

        let mut tag_counts = Vec::with_capacity(DASHBOARD_TAGS.len());
        for tag in DASHBOARD_TAGS {
            tag_counts.push(TagCount {
                tag: tag.to_string(),
                count: self.repo.count_entries_tagged(tag).await?,
            });
        }

        tracing::debug!(
            "Dashboard at {}: {} due, {} open tasks, {} entries this month",
            reference,
            reminders_due,
            open_tasks,
            entries_this_month
        );

        Ok(DashboardSummary {
            reminders_due,
            open_tasks,
            entries_this_month,
            total_entries,
            tag_counts,
        })
    }
}
