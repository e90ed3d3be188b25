//! Plain-text rendering of a `TodoState`.

use chrono::NaiveDate;
use todo_sync::{Priority, TodoItem, TodoState};

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

/// Long-form date, e.g. `May 1, 2024`.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn render_item(item: &TodoItem) -> String {
    let check = if item.completed { 'x' } else { ' ' };
    let mut line = format!("[{check}] {}  ({})", item.title, priority_label(item.priority));
    if let Some(due) = item.due_date {
        line.push_str(&format!("  due: {}", format_due_date(due)));
    }
    line.push_str(&format!("  #{}\n", item.id));
    line
}

pub fn render(state: &TodoState) -> String {
    if let Some(error) = state.error() {
        return format!("Error: {error}\nRun the command again to retry.\n");
    }

    let mut out = String::new();
    let filter = state.filter();
    let mut scope = Vec::new();
    if let Some(completed) = filter.completed {
        scope.push(if completed { "completed" } else { "open" }.to_string());
    }
    if let Some(priority) = filter.priority {
        scope.push(format!("{} priority", priority_label(priority).to_lowercase()));
    }
    if !scope.is_empty() {
        out.push_str(&format!("Showing {}\n", scope.join(", ")));
    }

    if state.todos().is_empty() {
        out.push_str("No to-dos.\n");
        return out;
    }
    for item in state.todos() {
        out.push_str(&render_item(item));
    }
    out
}
