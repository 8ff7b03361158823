//! CSV export of a project's tasks.
//!
//! Each cell is JSON-stringified, so strings come out double-quoted with
//! JSON escapes. Absent values are empty cells.

use crate::models::{flexible_date, Task};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

/// MIME type of the export.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Column names, in order.
pub const CSV_HEADER: [&str; 7] = [
    "id",
    "title",
    "status",
    "assignee",
    "dueDate",
    "createdAt",
    "updatedAt",
];

/// File name of the export for a project.
pub fn export_file_name(project_name: &str) -> String {
    let safe: String = project_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!("{}-tasks.csv", safe)
}

/// Render the task list as CSV: a header row, then one row per task.
pub fn generate_csv(tasks: &[Task]) -> String {
    let mut rows = Vec::with_capacity(tasks.len() + 1);
    rows.push(CSV_HEADER.join(","));

    for task in tasks {
        let cells = [
            cell(Some(task.id.as_str())),
            cell(Some(task.title.as_str())),
            cell(Some(task.status.key())),
            cell(task.assignee.as_deref()),
            date_cell(task.due_date),
            date_cell(task.created_at),
            date_cell(task.updated_at),
        ];
        rows.push(cells.join(","));
    }

    rows.join("\n")
}

/// Write the CSV export to `path`.
pub fn write_csv(tasks: &[Task], path: &Path) -> Result<()> {
    let content = generate_csv(tasks);
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write CSV export to {}", path.display()))?;

    info!(
        "Exported {} tasks to {} ({})",
        tasks.len(),
        path.display(),
        CSV_MIME_TYPE
    );
    Ok(())
}

fn cell(value: Option<&str>) -> String {
    value
        .map(|v| serde_json::to_string(v).unwrap_or_default())
        .unwrap_or_default()
}

fn date_cell(value: Option<DateTime<Utc>>) -> String {
    cell(value.map(|dt| flexible_date::format(&dt)).as_deref())
}
