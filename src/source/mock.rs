//! In-memory data store.
//!
//! Serves a fixed workspace of projects and tasks, either seeded relative
//! to a reference instant or loaded from a JSON snapshot. Writes change
//! only this process's copy.

use crate::models::{Author, Comment, Member, Presence, Priority, Project, ProjectStats};
use crate::models::{ProjectStatus, Task, TaskFile, TaskStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Projects and tasks held together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// The mock backend.
#[derive(Debug, Clone)]
pub struct MockStore {
    workspace: Workspace,
    delay: std::time::Duration,
}

impl MockStore {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            delay: std::time::Duration::ZERO,
        }
    }

    /// Built-in sample workspace with dates relative to `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self::new(sample_workspace(now))
    }

    /// Load a workspace snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?;

        let workspace: Workspace = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file: {}", path.display()))?;

        info!(
            "Loaded {} projects and {} tasks from {}",
            workspace.projects.len(),
            workspace.tasks.len(),
            path.display()
        );
        Ok(Self::new(workspace))
    }

    /// Add an artificial delay before every answer.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn list_projects(&self) -> Vec<Project> {
        self.simulate_latency().await;
        self.workspace.projects.clone()
    }

    pub async fn project(&self, id: &str) -> Option<Project> {
        self.simulate_latency().await;
        self.workspace.projects.iter().find(|p| p.id == id).cloned()
    }

    pub async fn project_tasks(&self, project_id: &str) -> Vec<Task> {
        self.simulate_latency().await;
        self.workspace
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect()
    }

    pub async fn task(&self, id: &str) -> Option<Task> {
        self.simulate_latency().await;
        self.workspace.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Change a task's status in memory.
    pub async fn update_task_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Option<Task> {
        self.simulate_latency().await;
        let task = self.workspace.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = status;
        task.updated_at = Some(now);
        debug!("Mock store: task {} is now {}", id, status.key());
        Some(task.clone())
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn member(name: &str, role: &str, status: Presence) -> Member {
    Member {
        name: name.to_string(),
        role: role.to_string(),
        email: format!("{}@taskify.dev", name.split(' ').next().unwrap_or(name).to_lowercase()),
        status,
    }
}

fn comment(id: &str, author: &str, role: &str, content: &str, at: DateTime<Utc>) -> Comment {
    Comment {
        id: id.to_string(),
        author: Author {
            name: author.to_string(),
            role: role.to_string(),
        },
        content: content.to_string(),
        created_at: at,
    }
}

struct Seed {
    id: &'static str,
    project: &'static str,
    title: &'static str,
    status: TaskStatus,
    priority: Priority,
    due_in: Option<i64>,
    assignee: Option<&'static str>,
    created_ago: i64,
    updated_ago: i64,
}

fn sample_workspace(now: DateTime<Utc>) -> Workspace {
    let days = Duration::days;
    use Priority::*;
    use TaskStatus::*;

    let seeds = [
        Seed {
            id: "1",
            project: "1",
            title: "Design new homepage layout",
            status: Completed,
            priority: High,
            due_in: Some(-10),
            assignee: Some("Sarah Chen"),
            created_ago: 30,
            updated_ago: 12,
        },
        Seed {
            id: "2",
            project: "1",
            title: "Implement responsive navigation",
            status: InProgress,
            priority: High,
            due_in: Some(3),
            assignee: Some("Mike Johnson"),
            created_ago: 20,
            updated_ago: 2,
        },
        Seed {
            id: "3",
            project: "1",
            title: "Write copy for landing page",
            status: Review,
            priority: Medium,
            due_in: Some(5),
            assignee: Some("Emma Davis"),
            created_ago: 12,
            updated_ago: 1,
        },
        Seed {
            id: "4",
            project: "1",
            title: "Optimize hero images",
            status: Todo,
            priority: Low,
            due_in: Some(6),
            assignee: Some("Mike Johnson"),
            created_ago: 6,
            updated_ago: 6,
        },
        Seed {
            id: "5",
            project: "1",
            title: "Accessibility audit",
            status: Todo,
            priority: Medium,
            due_in: Some(2),
            assignee: None,
            created_ago: 4,
            updated_ago: 4,
        },
        Seed {
            id: "6",
            project: "1",
            title: "Set up analytics tracking",
            status: Completed,
            priority: Medium,
            due_in: Some(-3),
            assignee: Some("Sarah Chen"),
            created_ago: 18,
            updated_ago: 4,
        },
        Seed {
            id: "7",
            project: "1",
            title: "Migrate blog content",
            status: Todo,
            priority: High,
            due_in: Some(-2),
            assignee: Some("Emma Davis"),
            created_ago: 25,
            updated_ago: 20,
        },
        Seed {
            id: "8",
            project: "2",
            title: "Define API contract for sync",
            status: Completed,
            priority: High,
            due_in: Some(-20),
            assignee: Some("Alex Kim"),
            created_ago: 40,
            updated_ago: 25,
        },
        Seed {
            id: "9",
            project: "2",
            title: "Offline cache prototype",
            status: InProgress,
            priority: Medium,
            due_in: Some(9),
            assignee: Some("Alex Kim"),
            created_ago: 15,
            updated_ago: 3,
        },
        Seed {
            id: "10",
            project: "2",
            title: "Push notification permissions",
            status: Todo,
            priority: Low,
            due_in: Some(14),
            assignee: Some("Priya Patel"),
            created_ago: 8,
            updated_ago: 8,
        },
        Seed {
            id: "11",
            project: "2",
            title: "App store screenshots",
            status: Review,
            priority: Low,
            due_in: Some(1),
            assignee: Some("Priya Patel"),
            created_ago: 10,
            updated_ago: 5,
        },
    ];

    let mut tasks: Vec<Task> = seeds
        .iter()
        .map(|s| Task {
            id: s.id.to_string(),
            project_id: s.project.to_string(),
            title: s.title.to_string(),
            description: format!("{}.", s.title),
            status: s.status,
            priority: s.priority,
            due_date: s.due_in.map(|d| now + days(d)),
            assignee: s.assignee.map(String::from),
            comments: vec![],
            files: vec![],
            created_at: Some(now - days(s.created_ago)),
            updated_at: Some(now - days(s.updated_ago)),
        })
        .collect();

    tasks[1].comments = vec![
        comment(
            "c1",
            "Sarah Chen",
            "Designer",
            "Mobile breakpoints look off below 360px.",
            now - days(3),
        ),
        comment("c2", "Mike Johnson", "Developer", "Fixed in the latest push.", now - days(2)),
    ];
    tasks[2].comments = vec![comment(
        "c3",
        "John Smith",
        "Project Manager",
        "Please keep the headline under 60 characters.",
        now - days(16),
    )];
    tasks[0].files = vec![TaskFile {
        name: "homepage-v3.fig".to_string(),
        size: 2_457_600,
        uploaded_at: now - days(14),
    }];

    let projects = vec![
        Project {
            id: "1".to_string(),
            name: "Website Redesign".to_string(),
            description: "Refresh the marketing site with the new brand.".to_string(),
            icon: "🎨".to_string(),
            color: "blue".to_string(),
            category: "Design".to_string(),
            due_date: Some(now + days(30)),
            status: ProjectStatus::Active,
            owner: "John Smith".to_string(),
            members: vec![
                member("John Smith", "Project Manager", Presence::Online),
                member("Sarah Chen", "Designer", Presence::Online),
                member("Mike Johnson", "Developer", Presence::Offline),
                member("Emma Davis", "Copywriter", Presence::Offline),
            ],
            stats: ProjectStats::default(),
        },
        Project {
            id: "2".to_string(),
            name: "Mobile App".to_string(),
            description: "Companion app with offline sync.".to_string(),
            icon: "📱".to_string(),
            color: "green".to_string(),
            category: "Development".to_string(),
            due_date: Some(now + days(60)),
            status: ProjectStatus::Active,
            owner: "Alex Kim".to_string(),
            members: vec![
                member("Alex Kim", "Tech Lead", Presence::Online),
                member("Priya Patel", "Developer", Presence::Offline),
            ],
            stats: ProjectStats::default(),
        },
        Project {
            id: "3".to_string(),
            name: "Q3 Planning".to_string(),
            description: "Roadmap workshop notes.".to_string(),
            icon: "🗓️".to_string(),
            color: "purple".to_string(),
            category: "Planning".to_string(),
            due_date: None,
            status: ProjectStatus::Archived,
            owner: "John Smith".to_string(),
            members: vec![member("John Smith", "Project Manager", Presence::Online)],
            stats: ProjectStats::default(),
        },
    ];

    let projects = projects
        .into_iter()
        .map(|mut project| {
            let owned: Vec<Task> = tasks
                .iter()
                .filter(|t| t.project_id == project.id)
                .cloned()
                .collect();
            project.refresh_stats(&owned, now);
            project
        })
        .collect();

    Workspace { projects, tasks }
}
