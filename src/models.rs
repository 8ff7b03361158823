//! Data models for the dashboard.
//!
//! This module contains the core data structures shared by every view:
//! projects, tasks, comments, members and the signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Completed,
}

impl TaskStatus {
    /// Every status, in board column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Completed,
    ];

    /// Wire/CSV key of the status.
    pub fn key(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Completed => "completed",
        }
    }

    /// Position of the status in [`TaskStatus::ALL`].
    pub fn index(&self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Review => 2,
            TaskStatus::Completed => 3,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "To Do"),
            TaskStatus::InProgress => write!(f, "In Progress"),
            TaskStatus::Review => write!(f, "Review"),
            TaskStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Priority of a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Returns an emoji representation of the priority.
    pub fn emoji(&self) -> &'static str {
        match self {
            Priority::Low => "🟢",
            Priority::Medium => "🟡",
            Priority::High => "🔴",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "Active"),
            ProjectStatus::Completed => write!(f, "Completed"),
            ProjectStatus::Archived => write!(f, "Archived"),
        }
    }
}

/// Online presence of a project member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    #[default]
    Offline,
}

/// Author of a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// A comment left on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    pub author: Author,
    pub content: String,
    #[serde(with = "flexible_date")]
    pub created_at: DateTime<Utc>,
}

/// A file attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFile {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    #[serde(with = "flexible_date")]
    pub uploaded_at: DateTime<Utc>,
}

/// A unit of work inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default, with = "flexible_date::option")]
    pub due_date: Option<DateTime<Utc>>,
    /// Display name of the assigned member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub files: Vec<TaskFile>,
    #[serde(default, with = "flexible_date::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_date::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether the task is past due and still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_completed() && self.due_date.is_some_and(|due| due < now)
    }
}

/// A member of a project team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: Presence,
}

/// Precomputed counts carried with a project record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_percentage: u32,
}

impl ProjectStats {
    /// Computes a fresh snapshot from a task list.
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total_tasks: tasks.len(),
            ..Self::default()
        };

        for task in tasks {
            match task.status {
                TaskStatus::Completed => stats.completed_tasks += 1,
                TaskStatus::InProgress => stats.in_progress_tasks += 1,
                _ => {}
            }
            if task.is_overdue(now) {
                stats.overdue_tasks += 1;
            }
        }

        stats.completion_percentage = percentage(stats.completed_tasks, stats.total_tasks);
        stats
    }
}

/// A project and its team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, with = "flexible_date::option")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub stats: ProjectStats,
}

impl Project {
    /// Replaces the stats snapshot with one computed from `tasks`.
    pub fn refresh_stats(&mut self, tasks: &[Task], now: DateTime<Utc>) {
        self.stats = ProjectStats::from_tasks(tasks, now);
    }
}

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Rounded percentage of `part` in `whole`, 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

/// Serde adapter for ISO dates.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps and
/// bare `YYYY-MM-DD` dates (UTC midnight). Always writes RFC 3339.
pub mod flexible_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Parse an ISO date string.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_str(&super::format(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap()
    }

    fn task(status: TaskStatus, due_in_days: i64) -> Task {
        Task {
            id: "t1".to_string(),
            project_id: "p1".to_string(),
            title: "Write docs".to_string(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            due_date: Some(now() + Duration::days(due_in_days)),
            assignee: None,
            comments: vec![],
            files: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(TaskStatus::InProgress.key(), "in-progress");

        let parsed: TaskStatus = serde_json::from_str("\"review\"").unwrap();
        assert_eq!(parsed, TaskStatus::Review);
        assert!(serde_json::from_str::<TaskStatus>("\"blocked\"").is_err());
    }

    #[test]
    fn test_status_index_matches_all() {
        for (i, status) in TaskStatus::ALL.iter().enumerate() {
            assert_eq!(status.index(), i);
        }
    }

    #[test]
    fn test_parse_dates() {
        let date_only = flexible_date::parse("2024-03-15").unwrap();
        assert_eq!(date_only, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());

        let with_zone = flexible_date::parse("2024-03-15T10:30:00+02:00").unwrap();
        assert_eq!(with_zone, Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap());

        let millis = flexible_date::parse("2024-03-15T10:30:00.000Z").unwrap();
        assert_eq!(millis, Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap());

        assert!(flexible_date::parse("next tuesday").is_none());
    }

    #[test]
    fn test_task_from_backend_json() {
        let json = r#"{
            "id": "42",
            "projectId": "7",
            "title": "Ship it",
            "status": "in-progress",
            "priority": "high",
            "dueDate": "2024-07-01",
            "assignee": "Sarah Chen",
            "comments": [
                {"author": {"name": "Mike", "role": "Dev"}, "content": "On it", "createdAt": "2024-06-10T09:00:00Z"}
            ],
            "createdAt": "2024-06-01T09:00:00Z"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.assignee.as_deref(), Some("Sarah Chen"));
        assert_eq!(task.comments.len(), 1);
        assert!(task.updated_at.is_none());
        assert!(task.files.is_empty());
    }

    #[test]
    fn test_is_overdue() {
        assert!(task(TaskStatus::Todo, -1).is_overdue(now()));
        assert!(!task(TaskStatus::Completed, -1).is_overdue(now()));
        assert!(!task(TaskStatus::Todo, 1).is_overdue(now()));
    }

    #[test]
    fn test_project_stats_from_tasks() {
        let tasks = vec![
            task(TaskStatus::Completed, -3),
            task(TaskStatus::InProgress, -2),
            task(TaskStatus::Todo, 4),
        ];
        let stats = ProjectStats::from_tasks(&tasks, now());
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
        assert_eq!(stats.completion_percentage, 33);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(2, 4), 50);
        assert_eq!(percentage(2, 3), 67);
    }
}
