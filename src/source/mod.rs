//! Where projects and tasks come from.
//!
//! A [`DataSource`] is either the in-memory mock store or the REST backend.
//! Lookups that miss return `None` rather than an error.

pub mod mock;

pub use mock::MockStore;

use crate::api::ApiClient;
use crate::models::{Project, Task, TaskStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// The active backend for a run.
#[derive(Debug)]
pub enum DataSource {
    Mock(MockStore),
    Remote(ApiClient),
}

impl DataSource {
    /// Human-readable name of the backend.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Mock(_) => "mock data (in-memory)".to_string(),
            DataSource::Remote(client) => format!("API at {}", client.base_url()),
        }
    }

    /// Whether writes outlive this process.
    pub fn persists_writes(&self) -> bool {
        matches!(self, DataSource::Remote(_))
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        match self {
            DataSource::Mock(store) => Ok(store.list_projects().await),
            DataSource::Remote(client) => Ok(client.list_projects().await?),
        }
    }

    pub async fn project(&self, id: &str) -> Result<Option<Project>> {
        match self {
            DataSource::Mock(store) => Ok(store.project(id).await),
            DataSource::Remote(client) => Ok(client.project(id).await?),
        }
    }

    pub async fn project_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        match self {
            DataSource::Mock(store) => Ok(store.project_tasks(project_id).await),
            DataSource::Remote(client) => Ok(client.project_tasks(project_id).await?),
        }
    }

    /// Fetch a project and its tasks concurrently.
    pub async fn project_with_tasks(&self, id: &str) -> Result<(Option<Project>, Vec<Task>)> {
        let (project, tasks) = futures::try_join!(self.project(id), self.project_tasks(id))?;
        debug!(
            "Project {}: found={}, {} tasks",
            id,
            project.is_some(),
            tasks.len()
        );
        Ok((project, tasks))
    }

    pub async fn task(&self, id: &str) -> Result<Option<Task>> {
        match self {
            DataSource::Mock(store) => Ok(store.task(id).await),
            DataSource::Remote(client) => Ok(client.task(id).await?),
        }
    }

    /// Write a status change. Returns `None` if the task does not exist.
    pub async fn update_task_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>> {
        match self {
            DataSource::Mock(store) => Ok(store.update_task_status(id, status, now).await),
            DataSource::Remote(client) => {
                match client.update_task_status(id, status).await {
                    Ok(task) => Ok(Some(task)),
                    Err(crate::api::ApiError::NotFound(_)) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}

/// Await `fut` while showing a spinner with `message`.
pub async fn with_spinner<F: Future>(show: bool, message: &str, fut: F) -> F::Output {
    if !show {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    spinner.finish_and_clear();
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_mock_project_with_tasks() {
        let source = DataSource::Mock(MockStore::seeded(now()));
        let (project, tasks) = tokio_test::block_on(source.project_with_tasks("1")).unwrap();
        assert_eq!(project.map(|p| p.name), Some("Website Redesign".to_string()));
        assert_eq!(tasks.len(), 7);

        let (missing, none) = tokio_test::block_on(source.project_with_tasks("nope")).unwrap();
        assert!(missing.is_none());
        assert!(none.is_empty());
    }

    #[test]
    fn test_mock_writes_are_not_persistent() {
        let mut source = DataSource::Mock(MockStore::seeded(now()));
        assert!(!source.persists_writes());

        let updated =
            tokio_test::block_on(source.update_task_status("5", TaskStatus::Completed, now()))
                .unwrap();
        assert_eq!(updated.map(|t| t.status), Some(TaskStatus::Completed));

        let missing =
            tokio_test::block_on(source.update_task_status("404", TaskStatus::Todo, now()))
                .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_with_spinner_hidden_passes_output_through() {
        let value = tokio_test::block_on(with_spinner(false, "Loading", async { 42 }));
        assert_eq!(value, 42);
    }
}
