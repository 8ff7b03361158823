//! Analytics report generation.
//!
//! This module renders a project's analytics as a Markdown document with
//! text bar charts, or as JSON.

use crate::analysis::{summary_text, MemberActivity, MemberTally, ProjectAnalytics, SeriesPoint};
use crate::models::{Priority, Presence, TaskStatus};
use anyhow::Result;
use std::collections::BTreeMap;

/// Width of the longest bar in a chart, in characters.
const BAR_WIDTH: usize = 30;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(analytics: &ProjectAnalytics) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!(
        "# {} {} Analytics\n\n",
        analytics.project.icon, analytics.project.name
    ));

    output.push_str(&generate_overview_section(analytics));
    output.push_str(&generate_team_section(&analytics.members));
    output.push_str(&generate_deadlines_section(analytics));
    output.push_str(&generate_chart_section(
        &format!("Burndown (open tasks, last {} days)", analytics.burndown.len()),
        &analytics.burndown,
    ));
    output.push_str(&generate_chart_section(
        "Completed per Week",
        &analytics.completion_rate,
    ));
    output.push_str(&generate_distribution_section(
        &analytics.status_distribution,
        &analytics.priority_distribution,
    ));
    output.push_str(&generate_tally_section(
        "Top Contributors",
        "Completed",
        &analytics.top_contributors,
    ));
    output.push_str(&generate_tally_section(
        "Assignment Load",
        "Tasks",
        &analytics.assignment_load,
    ));

    // Footer
    output.push_str(&generate_footer(analytics));

    output
}

/// Generate a JSON report.
pub fn generate_json_report(analytics: &ProjectAnalytics) -> Result<String> {
    serde_json::to_string_pretty(analytics).map_err(Into::into)
}

/// Generate the overview section.
fn generate_overview_section(analytics: &ProjectAnalytics) -> String {
    let overview = &analytics.overview;
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Total | Completed | Overdue | Progress | Avg. Completion |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");

    let average = analytics
        .average_completion_days
        .map(|d| format!("{} days", d))
        .unwrap_or_else(|| "n/a".to_string());

    section.push_str(&format!(
        "| {} | {} | {} | {}% | {} |\n\n",
        overview.total, overview.completed, overview.overdue, overview.completion_percent, average
    ));

    section.push_str(&format!(
        "`{}` {}%\n\n",
        bar(overview.completion_percent as usize, 100, BAR_WIDTH),
        overview.completion_percent
    ));

    section
}

/// Generate the team section.
fn generate_team_section(members: &[MemberActivity]) -> String {
    if members.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Team\n\n");
    section.push_str("| Member | Role | Presence | Recently Active |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");

    for entry in members {
        let presence = match entry.member.status {
            Presence::Online => "🟢 online",
            Presence::Offline => "⚪ offline",
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            entry.member.name,
            entry.member.role,
            presence,
            if entry.active { "✅" } else { "" }
        ));
    }
    section.push('\n');

    section
}

/// Generate the upcoming deadlines section.
fn generate_deadlines_section(analytics: &ProjectAnalytics) -> String {
    let upcoming = &analytics.upcoming;
    let mut section = String::new();

    section.push_str("## Upcoming Deadlines\n\n");

    if upcoming.shown.is_empty() {
        section.push_str("Nothing due in the next week.\n\n");
        return section;
    }

    for entry in &upcoming.shown {
        let assignee = entry.assignee.as_deref().unwrap_or("Unassigned");
        section.push_str(&format!(
            "- **{}** due {} ({})\n",
            entry.title,
            entry.due_date.format("%a %b %d"),
            assignee
        ));
    }

    if let Some(more) = upcoming.more_label() {
        section.push_str(&format!("- {}\n", more));
    }
    section.push('\n');

    section
}

/// Generate a titled bar chart over a series.
fn generate_chart_section(title: &str, series: &[SeriesPoint]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));

    let max = series.iter().map(|p| p.value).max().unwrap_or(0);
    let label_width = series.iter().map(|p| p.label.len()).max().unwrap_or(0);

    section.push_str("```\n");
    for point in series {
        section.push_str(&format!(
            "{:<width$} | {} {}\n",
            point.label,
            bar(point.value, max, BAR_WIDTH),
            point.value,
            width = label_width
        ));
    }
    section.push_str("```\n\n");

    section
}

/// Generate the status and priority distribution tables.
fn generate_distribution_section(
    statuses: &BTreeMap<TaskStatus, usize>,
    priorities: &BTreeMap<Priority, usize>,
) -> String {
    let mut section = String::new();

    section.push_str("## Distribution\n\n");
    section.push_str("| Status | Tasks |\n");
    section.push_str("|:---|:---:|\n");
    for (status, count) in statuses {
        section.push_str(&format!("| {} | {} |\n", status, count));
    }
    section.push('\n');

    section.push_str("| Priority | Tasks |\n");
    section.push_str("|:---|:---:|\n");
    for (priority, count) in priorities.iter().rev() {
        section.push_str(&format!("| {} {} | {} |\n", priority.emoji(), priority, count));
    }
    section.push('\n');

    section
}

/// Generate a per-member tally table.
fn generate_tally_section(title: &str, column: &str, tallies: &[MemberTally]) -> String {
    if tallies.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));
    section.push_str(&format!("| Member | {} |\n", column));
    section.push_str("|:---|:---:|\n");

    for tally in tallies {
        section.push_str(&format!("| {} | {} |\n", tally.name, tally.count));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer(analytics: &ProjectAnalytics) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Generated by Taskify on {}*\n",
        analytics.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    footer
}

/// Short plain-text digest for the terminal.
pub fn generate_terminal_summary(analytics: &ProjectAnalytics) -> String {
    format!(
        "📊 {} {}\n{}",
        analytics.project.icon,
        analytics.project.name,
        summary_text(analytics)
            .lines()
            .map(|l| format!("   {}", l))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

/// A horizontal bar scaled so that `max` fills `width` cells.
pub fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cells = ((value as f64 / max as f64) * width as f64).round().max(1.0) as usize;
    "█".repeat(cells.min(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalyticsWindows, ProjectAnalytics};
    use crate::models::{Member, Project, ProjectStats, ProjectStatus, Task};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()
    }

    fn create_test_analytics() -> ProjectAnalytics {
        create_test_analytics_with_completed(2)
    }

    fn create_test_analytics_with_completed(completed: i64) -> ProjectAnalytics {
        let project = Project {
            id: "p1".to_string(),
            name: "Website Redesign".to_string(),
            description: String::new(),
            icon: "🎨".to_string(),
            color: "blue".to_string(),
            category: "Design".to_string(),
            due_date: None,
            status: ProjectStatus::Active,
            owner: "Ana".to_string(),
            members: vec![Member {
                name: "Ana".to_string(),
                role: "Lead".to_string(),
                email: "ana@example.com".to_string(),
                status: Presence::Online,
            }],
            stats: ProjectStats::default(),
        };

        let tasks: Vec<Task> = (0..5)
            .map(|i| Task {
                id: i.to_string(),
                project_id: "p1".to_string(),
                title: format!("Task {}", i),
                description: String::new(),
                status: if i < completed { TaskStatus::Completed } else { TaskStatus::Todo },
                priority: Priority::Medium,
                due_date: Some(now() + Duration::days(i + 1)),
                assignee: Some("Ana".to_string()),
                comments: vec![],
                files: vec![],
                created_at: Some(now() - Duration::days(10)),
                updated_at: Some(now() - Duration::days(1)),
            })
            .collect();

        ProjectAnalytics::compute(&project, &tasks, now(), &AnalyticsWindows::default())
    }

    #[test]
    fn test_generate_markdown_report() {
        let analytics = create_test_analytics();
        let markdown = generate_markdown_report(&analytics);

        assert!(markdown.contains("# 🎨 Website Redesign Analytics"));
        assert!(markdown.contains("## Overview"));
        assert!(markdown.contains("| 5 | 2 | 0 | 40% | 9 days |"));
        assert!(markdown.contains("## Burndown"));
        assert!(markdown.contains("## Completed per Week"));
        assert!(markdown.contains("| In Progress | 0 |"));
        assert!(markdown.contains("## Top Contributors"));
        assert!(markdown.contains("✅"));
    }

    #[test]
    fn test_deadlines_section_without_overflow() {
        let analytics = create_test_analytics();
        let section = generate_deadlines_section(&analytics);

        // Three open tasks due within a week, all shown.
        assert_eq!(section.matches("- **").count(), 3);
        assert!(!section.contains("more"));
    }

    #[test]
    fn test_deadlines_section_shows_more_suffix() {
        // Five open tasks due within a week; three fit the panel.
        let analytics = create_test_analytics_with_completed(0);
        let section = generate_deadlines_section(&analytics);

        assert_eq!(section.matches("- **").count(), 3);
        assert!(section.contains("- +2 more\n"));
    }

    #[test]
    fn test_burndown_title_follows_window() {
        let analytics = create_test_analytics();
        let markdown = generate_markdown_report(&analytics);
        assert!(markdown.contains("## Burndown (open tasks, last 14 days)"));

        let mut shorter = analytics.clone();
        shorter.burndown.truncate(7);
        assert!(generate_markdown_report(&shorter).contains("last 7 days"));
    }

    #[test]
    fn test_generate_json_report() {
        let analytics = create_test_analytics();
        let json = generate_json_report(&analytics).unwrap();

        assert!(json.contains("\"overview\""));
        assert!(json.contains("\"burndown\""));
        assert!(json.contains("\"in-progress\": 0"));
        assert!(json.contains("\"averageCompletionDays\": 9"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 10, 30), "");
        assert_eq!(bar(5, 0, 30), "");
        assert_eq!(bar(10, 10, 30).chars().count(), 30);
        assert_eq!(bar(5, 10, 30).chars().count(), 15);
        assert_eq!(bar(1, 1000, 30).chars().count(), 1);
    }
}
