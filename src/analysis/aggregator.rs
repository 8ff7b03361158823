//! Task aggregation and project statistics.
//!
//! Every function here is a pure computation over a task list and a
//! reference instant. Nothing is cached; callers recompute whenever the
//! task list changes.

use crate::models::{percentage, Member, Priority, Project, Task, TaskStatus};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Window sizes used by the aggregations.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsWindows {
    /// Look-back for member activity, in days.
    pub activity_days: i64,
    /// Look-ahead for upcoming deadlines, in days.
    pub upcoming_days: i64,
    /// How many upcoming deadlines are shown before "+N more".
    pub upcoming_display_limit: usize,
    /// Number of daily burndown points.
    pub burndown_days: usize,
    /// Number of weekly completion points.
    pub completion_weeks: usize,
}

impl Default for AnalyticsWindows {
    fn default() -> Self {
        Self {
            activity_days: 14,
            upcoming_days: 7,
            upcoming_display_limit: 3,
            burndown_days: 14,
            completion_weeks: 8,
        }
    }
}

/// Headline counts for a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewCounts {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub completion_percent: u32,
}

impl OverviewCounts {
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let completed = tasks.iter().filter(|t| t.status.is_completed()).count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(now)).count();

        Self {
            total: tasks.len(),
            completed,
            overdue,
            completion_percent: percentage(completed, tasks.len()),
        }
    }

    pub fn incomplete(&self) -> usize {
        self.total - self.completed
    }
}

/// A project member with their recent-activity flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberActivity {
    pub member: Member,
    pub active: bool,
}

/// One point of a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub date: NaiveDate,
    pub value: usize,
}

/// Task count attributed to a member name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTally {
    pub name: String,
    pub count: usize,
}

/// A task due soon, as shown in the deadlines panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineEntry {
    pub task_id: String,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub assignee: Option<String>,
}

/// Upcoming deadlines truncated for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadlines {
    pub shown: Vec<DeadlineEntry>,
    /// Number of matching tasks not shown.
    pub more: usize,
}

impl UpcomingDeadlines {
    pub fn total(&self) -> usize {
        self.shown.len() + self.more
    }

    /// The "+N more" suffix, if anything was cut.
    pub fn more_label(&self) -> Option<String> {
        (self.more > 0).then(|| format!("+{} more", self.more))
    }
}

/// Everything the analytics view displays for one project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalytics {
    pub project: Project,
    pub generated_at: DateTime<Utc>,
    pub overview: OverviewCounts,
    pub members: Vec<MemberActivity>,
    pub upcoming: UpcomingDeadlines,
    pub burndown: Vec<SeriesPoint>,
    pub completion_rate: Vec<SeriesPoint>,
    /// Absent when no completed task has both timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_completion_days: Option<i64>,
    pub status_distribution: BTreeMap<TaskStatus, usize>,
    pub priority_distribution: BTreeMap<Priority, usize>,
    pub top_contributors: Vec<MemberTally>,
    pub assignment_load: Vec<MemberTally>,
}

impl ProjectAnalytics {
    /// Run every aggregation over a non-empty task list.
    pub fn compute(
        project: &Project,
        tasks: &[Task],
        now: DateTime<Utc>,
        windows: &AnalyticsWindows,
    ) -> Self {
        let active = active_member_names(tasks, now, windows.activity_days);

        Self {
            project: project.clone(),
            generated_at: now,
            overview: OverviewCounts::from_tasks(tasks, now),
            members: flag_active_members(&project.members, &active),
            upcoming: upcoming_deadlines(
                tasks,
                now,
                windows.upcoming_days,
                windows.upcoming_display_limit,
            ),
            burndown: burndown_series(tasks, now, windows.burndown_days),
            completion_rate: completion_rate_series(tasks, now, windows.completion_weeks),
            average_completion_days: average_completion_days(tasks),
            status_distribution: status_distribution(tasks),
            priority_distribution: priority_distribution(tasks),
            top_contributors: top_contributors(tasks),
            assignment_load: assignment_load(tasks),
        }
    }

    /// Number of members flagged active.
    pub fn active_member_count(&self) -> usize {
        self.members.iter().filter(|m| m.active).count()
    }
}

/// Result of asking for a project's analytics.
#[derive(Debug, Clone)]
pub enum AnalyticsOutcome {
    /// No project with the requested id.
    NotFound { project_id: String },
    /// The project exists but has no tasks.
    NoTasks { project: Project },
    Ready(Box<ProjectAnalytics>),
}

/// Compute analytics for `project`, using only tasks whose project id matches.
pub fn analyze_project(
    project_id: &str,
    project: Option<&Project>,
    tasks: &[Task],
    now: DateTime<Utc>,
    windows: &AnalyticsWindows,
) -> AnalyticsOutcome {
    let Some(project) = project.filter(|p| p.id == project_id) else {
        return AnalyticsOutcome::NotFound {
            project_id: project_id.to_string(),
        };
    };

    let project_tasks: Vec<Task> = tasks
        .iter()
        .filter(|t| t.project_id == project.id)
        .cloned()
        .collect();

    if project_tasks.is_empty() {
        return AnalyticsOutcome::NoTasks {
            project: project.clone(),
        };
    }

    AnalyticsOutcome::Ready(Box::new(ProjectAnalytics::compute(
        project,
        &project_tasks,
        now,
        windows,
    )))
}

/// Names of everyone who commented, or owns a task that was updated,
/// within the last `window_days`.
pub fn active_member_names(
    tasks: &[Task],
    now: DateTime<Utc>,
    window_days: i64,
) -> BTreeSet<String> {
    let since = shift_days(now, window_days.saturating_neg());
    let mut names = BTreeSet::new();

    for task in tasks {
        for comment in &task.comments {
            if comment.created_at >= since {
                names.insert(comment.author.name.clone());
            }
        }

        if let (Some(assignee), Some(updated)) = (&task.assignee, task.updated_at) {
            if updated >= since {
                names.insert(assignee.clone());
            }
        }
    }

    names
}

/// Flag each member whose display name is in `active`.
pub fn flag_active_members(members: &[Member], active: &BTreeSet<String>) -> Vec<MemberActivity> {
    members
        .iter()
        .map(|member| MemberActivity {
            member: member.clone(),
            active: active.contains(&member.name),
        })
        .collect()
}

/// Open tasks due strictly between `now` and `now + window_days`, in list order.
pub fn upcoming_tasks(tasks: &[Task], now: DateTime<Utc>, window_days: i64) -> Vec<&Task> {
    let until = shift_days(now, window_days);

    tasks
        .iter()
        .filter(|t| !t.status.is_completed())
        .filter(|t| t.due_date.is_some_and(|due| due > now && due < until))
        .collect()
}

/// Upcoming deadlines, truncated to `display_limit` entries.
pub fn upcoming_deadlines(
    tasks: &[Task],
    now: DateTime<Utc>,
    window_days: i64,
    display_limit: usize,
) -> UpcomingDeadlines {
    let upcoming = upcoming_tasks(tasks, now, window_days);
    let more = upcoming.len().saturating_sub(display_limit);

    let shown = upcoming
        .into_iter()
        .take(display_limit)
        .filter_map(|t| {
            Some(DeadlineEntry {
                task_id: t.id.clone(),
                title: t.title.clone(),
                due_date: t.due_date?,
                assignee: t.assignee.clone(),
            })
        })
        .collect();

    UpcomingDeadlines { shown, more }
}

/// Remaining work per day over the trailing `days` calendar days.
///
/// A task counts toward day D when it is not completed and was created on
/// or before D. Tasks without a creation timestamp are never counted.
pub fn burndown_series(tasks: &[Task], now: DateTime<Utc>, days: usize) -> Vec<SeriesPoint> {
    let today = now.date_naive();

    (0..days)
        .rev()
        .filter_map(|offset| {
            let date = today.checked_sub_days(Days::new(offset as u64))?;
            let end_of_day = start_of_day(date.succ_opt()?);
            let value = tasks
                .iter()
                .filter(|t| !t.status.is_completed())
                .filter(|t| t.created_at.is_some_and(|created| created < end_of_day))
                .count();

            Some(SeriesPoint {
                label: date.format("%b %d").to_string(),
                date,
                value,
            })
        })
        .collect()
}

/// Completed tasks per week over the trailing `weeks` weeks.
///
/// Weeks run Monday 00:00 UTC to the next Monday; a task lands in the
/// week containing its update timestamp.
pub fn completion_rate_series(
    tasks: &[Task],
    now: DateTime<Utc>,
    weeks: usize,
) -> Vec<SeriesPoint> {
    let current_week = week_start(now.date_naive());

    (0..weeks)
        .rev()
        .filter_map(|offset| {
            let back = Days::new((offset as u64).saturating_mul(7));
            let date = current_week.checked_sub_days(back)?;
            let start = start_of_day(date);
            let end = start_of_day(date.checked_add_days(Days::new(7))?);
            let value = tasks
                .iter()
                .filter(|t| t.status.is_completed())
                .filter(|t| t.updated_at.is_some_and(|u| u >= start && u < end))
                .count();

            Some(SeriesPoint {
                label: format!("Week of {}", date.format("%b %d")),
                date,
                value,
            })
        })
        .collect()
}

/// Mean time from creation to last update of completed tasks, in whole days.
pub fn average_completion_days(tasks: &[Task]) -> Option<i64> {
    let durations: Vec<i64> = tasks
        .iter()
        .filter(|t| t.status.is_completed())
        .filter_map(|t| Some((t.updated_at? - t.created_at?).num_seconds()))
        .collect();

    if durations.is_empty() {
        return None;
    }

    let mean_seconds = durations.iter().sum::<i64>() as f64 / durations.len() as f64;
    Some((mean_seconds / 86_400.0).round() as i64)
}

/// Task count for every status, zero-filled.
pub fn status_distribution(tasks: &[Task]) -> BTreeMap<TaskStatus, usize> {
    let mut dist: BTreeMap<TaskStatus, usize> =
        TaskStatus::ALL.iter().map(|s| (*s, 0)).collect();

    for task in tasks {
        *dist.entry(task.status).or_default() += 1;
    }

    dist
}

/// Task count for every priority, zero-filled.
pub fn priority_distribution(tasks: &[Task]) -> BTreeMap<Priority, usize> {
    let mut dist: BTreeMap<Priority, usize> = Priority::ALL.iter().map(|p| (*p, 0)).collect();

    for task in tasks {
        *dist.entry(task.priority).or_default() += 1;
    }

    dist
}

/// Completed tasks per assignee, most first.
pub fn top_contributors(tasks: &[Task]) -> Vec<MemberTally> {
    tally_descending(
        tasks
            .iter()
            .filter(|t| t.status.is_completed())
            .filter_map(|t| t.assignee.as_deref()),
    )
}

/// Tasks of any status per assignee, most first.
pub fn assignment_load(tasks: &[Task]) -> Vec<MemberTally> {
    tally_descending(tasks.iter().filter_map(|t| t.assignee.as_deref()))
}

/// Group tasks by due date, earliest first. Undated tasks are left out.
pub fn group_by_due_date(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();

    for task in tasks {
        if let Some(due) = task.due_date {
            grouped.entry(due.date_naive()).or_default().push(task);
        }
    }

    grouped
}

/// Generate a text summary of the analytics.
pub fn summary_text(analytics: &ProjectAnalytics) -> String {
    let overview = &analytics.overview;
    let mut lines = Vec::new();

    lines.push(format!(
        "Tasks: {} total, {} completed ({}%), {} open, {} overdue",
        overview.total,
        overview.completed,
        overview.completion_percent,
        overview.incomplete(),
        overview.overdue
    ));
    lines.push(format!(
        "Active members: {}/{}",
        analytics.active_member_count(),
        analytics.members.len()
    ));

    match analytics.average_completion_days {
        Some(days) => lines.push(format!("Average completion time: {} days", days)),
        None => lines.push("Average completion time: n/a".to_string()),
    }

    let mut deadlines = format!("Upcoming deadlines: {}", analytics.upcoming.total());
    if let Some(more) = analytics.upcoming.more_label() {
        deadlines.push_str(&format!(" ({} not shown)", more));
    }
    lines.push(deadlines);

    lines.join("\n")
}

fn tally_descending<'a>(names: impl Iterator<Item = &'a str>) -> Vec<MemberTally> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for name in names {
        *counts.entry(name).or_default() += 1;
    }

    let mut tallies: Vec<MemberTally> = counts
        .into_iter()
        .map(|(name, count)| MemberTally {
            name: name.to_string(),
            count,
        })
        .collect();

    tallies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tallies
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let back = Days::new(date.weekday().num_days_from_monday() as u64);
    date.checked_sub_days(back).unwrap_or(NaiveDate::MIN)
}

/// `now` moved by `days`, clamped to the representable range.
fn shift_days(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Comment, Presence, ProjectStats, ProjectStatus};
    use chrono::TimeZone;

    // Wednesday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()
    }

    fn days_ago(n: i64) -> DateTime<Utc> {
        now() - Duration::days(n)
    }

    fn create_test_task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            status,
            priority: Priority::Medium,
            due_date: None,
            assignee: None,
            comments: vec![],
            files: vec![],
            created_at: Some(days_ago(30)),
            updated_at: Some(days_ago(30)),
        }
    }

    fn member(name: &str) -> Member {
        Member {
            name: name.to_string(),
            role: "Developer".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            status: Presence::Online,
        }
    }

    fn create_test_project() -> Project {
        Project {
            id: "p1".to_string(),
            name: "Website Redesign".to_string(),
            description: String::new(),
            icon: "🎨".to_string(),
            color: "blue".to_string(),
            category: "Design".to_string(),
            due_date: None,
            status: ProjectStatus::Active,
            owner: "Ana".to_string(),
            members: vec![member("Ana"), member("Ben"), member("Cleo")],
            stats: ProjectStats::default(),
        }
    }

    #[test]
    fn test_overview_empty_list() {
        let counts = OverviewCounts::from_tasks(&[], now());
        assert_eq!(counts.total, 0);
        assert_eq!(counts.completion_percent, 0);
        assert_eq!(counts.incomplete(), 0);
    }

    #[test]
    fn test_overview_mixed_statuses() {
        let tasks = vec![
            create_test_task("1", TaskStatus::Completed),
            create_test_task("2", TaskStatus::Completed),
            create_test_task("3", TaskStatus::Todo),
            create_test_task("4", TaskStatus::Review),
        ];

        let counts = OverviewCounts::from_tasks(&tasks, now());
        assert_eq!(counts.total, 4);
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.completion_percent, 50);
        assert_eq!(counts.completed + counts.incomplete(), counts.total);

        let dist = status_distribution(&tasks);
        assert_eq!(dist[&TaskStatus::Todo], 1);
        assert_eq!(dist[&TaskStatus::InProgress], 0);
        assert_eq!(dist[&TaskStatus::Review], 1);
        assert_eq!(dist[&TaskStatus::Completed], 2);
        assert_eq!(dist.values().sum::<usize>(), tasks.len());
    }

    #[test]
    fn test_overdue_ignores_completed() {
        let mut late = create_test_task("1", TaskStatus::Todo);
        late.due_date = Some(days_ago(2));
        let mut done_late = create_test_task("2", TaskStatus::Completed);
        done_late.due_date = Some(days_ago(2));

        let counts = OverviewCounts::from_tasks(&[late, done_late], now());
        assert_eq!(counts.overdue, 1);
    }

    #[test]
    fn test_active_members_from_comments_and_updates() {
        let mut commented = create_test_task("1", TaskStatus::Todo);
        commented.comments.push(Comment {
            id: "c1".to_string(),
            author: Author {
                name: "Ben".to_string(),
                role: "Developer".to_string(),
            },
            content: "Looks good".to_string(),
            created_at: days_ago(3),
        });
        commented.comments.push(Comment {
            id: "c2".to_string(),
            author: Author {
                name: "Cleo".to_string(),
                role: "Designer".to_string(),
            },
            content: "Old note".to_string(),
            created_at: days_ago(20),
        });

        let mut updated = create_test_task("2", TaskStatus::InProgress);
        updated.assignee = Some("Ana".to_string());
        updated.updated_at = Some(days_ago(1));

        let mut stale = create_test_task("3", TaskStatus::InProgress);
        stale.assignee = Some("Cleo".to_string());

        let tasks = vec![commented, updated, stale];
        let active = active_member_names(&tasks, now(), 14);
        assert!(active.contains("Ana"));
        assert!(active.contains("Ben"));
        assert!(!active.contains("Cleo"));

        let flagged = flag_active_members(&create_test_project().members, &active);
        let flags: Vec<bool> = flagged.iter().map(|m| m.active).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn test_upcoming_deadlines_excludes_completed() {
        let mut open = create_test_task("1", TaskStatus::Todo);
        open.due_date = Some(now() + Duration::days(3));
        let mut done = create_test_task("2", TaskStatus::Completed);
        done.due_date = Some(now() + Duration::days(3));
        let mut far = create_test_task("3", TaskStatus::Todo);
        far.due_date = Some(now() + Duration::days(10));
        let mut past = create_test_task("4", TaskStatus::Todo);
        past.due_date = Some(days_ago(1));

        let tasks = vec![open, done, far, past];
        let upcoming = upcoming_tasks(&tasks, now(), 7);
        let ids: Vec<&str> = upcoming.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_upcoming_deadlines_truncation_keeps_list_order() {
        let tasks: Vec<Task> = [5, 1, 4, 2, 3]
            .iter()
            .enumerate()
            .map(|(i, days)| {
                let mut t = create_test_task(&i.to_string(), TaskStatus::InProgress);
                t.due_date = Some(now() + Duration::days(*days));
                t
            })
            .collect();

        let upcoming = upcoming_deadlines(&tasks, now(), 7, 3);
        let ids: Vec<&str> = upcoming.shown.iter().map(|d| d.task_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
        assert_eq!(upcoming.more, 2);
        assert_eq!(upcoming.more_label().as_deref(), Some("+2 more"));
        assert_eq!(upcoming.total(), 5);
    }

    #[test]
    fn test_burndown_has_one_point_per_day() {
        let series = burndown_series(&[], now(), 14);
        assert_eq!(series.len(), 14);
        assert_eq!(series[13].date, now().date_naive());
        assert_eq!(series[0].date, (now() - Duration::days(13)).date_naive());
        assert!(series.iter().all(|p| p.value == 0));
    }

    #[test]
    fn test_burndown_non_decreasing_without_completions() {
        let tasks: Vec<Task> = (0..10)
            .map(|i| {
                let mut t = create_test_task(&i.to_string(), TaskStatus::Todo);
                t.created_at = Some(days_ago(i * 2));
                t
            })
            .collect();

        let series = burndown_series(&tasks, now(), 14);
        assert_eq!(series.len(), 14);
        assert!(series.windows(2).all(|w| w[0].value <= w[1].value));
        assert_eq!(series[0].value, 3);
        assert_eq!(series[13].value, 10);
    }

    #[test]
    fn test_burndown_counts_task_created_later_same_day() {
        let mut t = create_test_task("1", TaskStatus::Todo);
        t.created_at = Some(now() + Duration::hours(2));

        let series = burndown_series(&[t], now(), 14);
        assert_eq!(series[13].value, 1);
        assert_eq!(series[12].value, 0);
    }

    #[test]
    fn test_completion_rate_weekly_buckets() {
        // Monday of the current week is 2024-06-10.
        let mut this_week = create_test_task("1", TaskStatus::Completed);
        this_week.updated_at = Some(Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());
        let mut last_week = create_test_task("2", TaskStatus::Completed);
        last_week.updated_at = Some(Utc.with_ymd_and_hms(2024, 6, 9, 23, 59, 0).unwrap());
        let mut not_done = create_test_task("3", TaskStatus::Review);
        not_done.updated_at = Some(days_ago(1));

        let series = completion_rate_series(&[this_week, last_week, not_done], now(), 8);
        assert_eq!(series.len(), 8);
        assert_eq!(series[7].date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(series[7].value, 1);
        assert_eq!(series[6].value, 1);
        assert_eq!(series.iter().map(|p| p.value).sum::<usize>(), 2);
    }

    #[test]
    fn test_average_completion_days() {
        assert_eq!(average_completion_days(&[create_test_task("1", TaskStatus::Todo)]), None);

        let mut fast = create_test_task("1", TaskStatus::Completed);
        fast.created_at = Some(days_ago(10));
        fast.updated_at = Some(days_ago(8));
        let mut slow = create_test_task("2", TaskStatus::Completed);
        slow.created_at = Some(days_ago(10));
        slow.updated_at = Some(days_ago(5));
        let mut missing = create_test_task("3", TaskStatus::Completed);
        missing.created_at = None;

        assert_eq!(average_completion_days(&[fast, slow, missing]), Some(4));
    }

    #[test]
    fn test_contributors_and_load_sorted_descending() {
        let mut tasks = Vec::new();
        for (i, (who, status)) in [
            ("Ben", TaskStatus::Completed),
            ("Ana", TaskStatus::Completed),
            ("Ben", TaskStatus::Completed),
            ("Ana", TaskStatus::Todo),
            ("Ana", TaskStatus::Review),
            ("Cleo", TaskStatus::Todo),
        ]
        .iter()
        .enumerate()
        {
            let mut t = create_test_task(&i.to_string(), *status);
            t.assignee = Some(who.to_string());
            tasks.push(t);
        }
        tasks.push(create_test_task("unassigned", TaskStatus::Completed));

        let top = top_contributors(&tasks);
        assert_eq!(top[0], MemberTally { name: "Ben".to_string(), count: 2 });
        assert_eq!(top[1], MemberTally { name: "Ana".to_string(), count: 1 });
        assert_eq!(top.len(), 2);

        let load = assignment_load(&tasks);
        let names: Vec<&str> = load.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Ben", "Cleo"]);
        assert_eq!(load[0].count, 3);
    }

    #[test]
    fn test_analyze_project_outcomes() {
        let project = create_test_project();
        let windows = AnalyticsWindows::default();

        let missing = analyze_project("nope", None, &[], now(), &windows);
        assert!(matches!(
            missing,
            AnalyticsOutcome::NotFound { ref project_id } if project_id == "nope"
        ));

        let mut other = create_test_task("x", TaskStatus::Todo);
        other.project_id = "p2".to_string();
        let empty = analyze_project("p1", Some(&project), &[other.clone()], now(), &windows);
        assert!(matches!(empty, AnalyticsOutcome::NoTasks { .. }));

        let tasks = vec![other, create_test_task("1", TaskStatus::Completed)];
        match analyze_project("p1", Some(&project), &tasks, now(), &windows) {
            AnalyticsOutcome::Ready(analytics) => {
                assert_eq!(analytics.overview.total, 1);
                assert_eq!(analytics.burndown.len(), 14);
                assert_eq!(analytics.completion_rate.len(), 8);
                assert_eq!(analytics.members.len(), 3);
            }
            other => panic!("expected analytics, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_windows_clamp_instead_of_overflowing() {
        let mut soon = create_test_task("1", TaskStatus::Todo);
        soon.due_date = Some(now() + Duration::days(3));
        soon.assignee = Some("Ana".to_string());
        let tasks = vec![soon];

        assert_eq!(upcoming_tasks(&tasks, now(), 1_000_000_000).len(), 1);
        assert_eq!(upcoming_tasks(&tasks, now(), i64::MAX).len(), 1);
        assert!(active_member_names(&tasks, now(), i64::MAX).contains("Ana"));
    }

    #[test]
    fn test_group_by_due_date_skips_undated() {
        let mut a = create_test_task("a", TaskStatus::Todo);
        a.due_date = Some(now() + Duration::days(2));
        let mut b = create_test_task("b", TaskStatus::Todo);
        b.due_date = Some(now() + Duration::days(2) + Duration::hours(1));
        let c = create_test_task("c", TaskStatus::Todo);

        let all = [a, b, c];
        let grouped = group_by_due_date(&all);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped.values().next().map(|v| v.len()), Some(2));
    }
}
