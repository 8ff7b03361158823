//! Plain-text views for the terminal: project list, kanban board,
//! task list, calendar and task detail.

use crate::analysis::group_by_due_date;
use crate::kanban::KanbanBoard;
use crate::models::{Project, Task};
use crate::state::Preferences;
use chrono::{DateTime, Utc};

/// One line per project with its progress.
pub fn render_projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects yet. Create one with `taskify create-project`.\n".to_string();
    }

    let mut out = String::new();
    for project in projects {
        out.push_str(&format!(
            "{} [{}] {} ({}, {})\n     {}/{} tasks done ({}%), {} overdue, {} members\n",
            project.icon,
            project.id,
            project.name,
            project.category,
            project.status,
            project.stats.completed_tasks,
            project.stats.total_tasks,
            project.stats.completion_percentage,
            project.stats.overdue_tasks,
            project.members.len()
        ));
    }
    out
}

/// Columns of the board, one block per status.
pub fn render_board(board: &KanbanBoard) -> String {
    let mut out = String::new();

    for (status, cards) in board.columns() {
        out.push_str(&format!("── {} ({}) ──\n", status, cards.len()));
        if cards.is_empty() {
            out.push_str("   (empty)\n");
        }
        for (index, task) in cards.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}. {} {} [{}]{}\n",
                index,
                task.priority.emoji(),
                task.title,
                task.id,
                task.assignee
                    .as_deref()
                    .map(|a| format!(" @{}", a))
                    .unwrap_or_default()
            ));
        }
        out.push('\n');
    }

    out
}

/// Flat task list with checkboxes.
pub fn render_list(tasks: &[&Task], now: DateTime<Utc>) -> String {
    if tasks.is_empty() {
        return "No tasks match.\n".to_string();
    }

    let mut out = String::new();
    for task in tasks {
        let check = if task.status.is_completed() { "[x]" } else { "[ ]" };
        let due = task
            .due_date
            .map(|d| format!(" due {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        let overdue = if task.is_overdue(now) { " ⚠️ overdue" } else { "" };

        out.push_str(&format!(
            "{} {} [{}] ({}, {}){}{}\n",
            check,
            task.title,
            task.id,
            task.status,
            task.priority,
            due,
            overdue
        ));
    }
    out
}

/// Tasks grouped under their due dates.
pub fn render_calendar(tasks: &[Task]) -> String {
    let grouped = group_by_due_date(tasks);
    if grouped.is_empty() {
        return "No dated tasks.\n".to_string();
    }

    let mut out = String::new();
    for (date, day_tasks) in grouped {
        out.push_str(&format!("{}\n", date.format("%a %Y-%m-%d")));
        for task in day_tasks {
            out.push_str(&format!("   • {} ({})\n", task.title, task.status));
        }
    }

    let undated = tasks.iter().filter(|t| t.due_date.is_none()).count();
    if undated > 0 {
        out.push_str(&format!("\n{} task(s) without a due date\n", undated));
    }

    out
}

/// Full detail of a task.
pub fn render_task(task: &Task) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} [{}]\n", task.title, task.id));
    out.push_str(&format!(
        "   Status: {} | Priority: {} {}\n",
        task.status,
        task.priority.emoji(),
        task.priority
    ));
    out.push_str(&format!(
        "   Assignee: {}\n",
        task.assignee.as_deref().unwrap_or("Unassigned")
    ));
    if let Some(due) = task.due_date {
        out.push_str(&format!("   Due: {}\n", due.format("%Y-%m-%d")));
    }
    if !task.description.is_empty() {
        out.push_str(&format!("\n   {}\n", task.description));
    }

    if !task.files.is_empty() {
        out.push_str("\n   Files:\n");
        for file in &task.files {
            out.push_str(&format!(
                "     📎 {} ({}, {})\n",
                file.name,
                human_size(file.size),
                file.uploaded_at.format("%Y-%m-%d")
            ));
        }
    }

    if !task.comments.is_empty() {
        out.push_str("\n   Comments:\n");
        for comment in &task.comments {
            out.push_str(&format!(
                "     {} ({}) {}: {}\n",
                comment.author.name,
                comment.author.role,
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.content
            ));
        }
    }

    out
}

/// Current preferences.
pub fn render_preferences(prefs: &Preferences) -> String {
    format!(
        "Sidebar collapsed: {}\nTheme: {:?}\nMobile navigation: {}\n",
        prefs.sidebar_collapsed,
        prefs.theme,
        prefs.nav_items.join(" › ")
    )
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
