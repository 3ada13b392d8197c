//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde_json::Value;

use crate::api::{Pagination, ResourceKind};
use crate::crud::FetchError;
use crate::events::{Event, Notification};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Render an event from the bus
pub fn print_event(event: &Event) {
    match event {
        Event::Notify(Notification::Success { message, .. }) => success(message),
        Event::Notify(Notification::Error { title, message }) => {
            error(&format!("{}: {}", title, message))
        }
        Event::SessionRefreshed => info("Session refreshed"),
        Event::RedirectToLogin { .. } => {
            warn("Your session has ended. Run 'marine-axis login' to sign in again.")
        }
    }
}

/// Format a record status as a colored string
pub fn format_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "active" | "published" | "approved" | "confirmed" | "completed" => {
            status.green().to_string()
        }
        "inactive" | "rejected" | "cancelled" | "suspended" => status.red().to_string(),
        "pending" | "draft" => status.yellow().to_string(),
        _ => status.to_string(),
    }
}

fn status_color(status: &str) -> Color {
    match status.to_lowercase().as_str() {
        "active" | "published" | "approved" | "confirmed" | "completed" => Color::Green,
        "inactive" | "rejected" | "cancelled" | "suspended" => Color::Red,
        _ => Color::Yellow,
    }
}

/// First string-ish field among `keys`
pub fn field(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| match record.get(*k) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "-".to_string())
}

/// Print a table of records
pub fn print_record_table(kind: ResourceKind, records: &[Value], pagination: Option<&Pagination>) {
    if records.is_empty() {
        info(&format!("No {} found", kind));
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
            Cell::new("Created").fg(Color::Cyan),
        ]);

    for record in records {
        let status = field(record, &["status", "state"]);
        table.add_row(vec![
            Cell::new(field(record, &["id", "_id"])),
            Cell::new(field(record, &["name", "title", "subject", "email"])),
            Cell::new(&status).fg(status_color(&status)),
            Cell::new(field(record, &["createdAt", "created_at"])),
        ]);
    }

    println!("{table}");

    if let Some(p) = pagination {
        println!(
            "  Page {} of {} ({} total)",
            p.page,
            p.total_pages.max(1),
            p.total
        );
    }
}

/// Inline error panel for a failed list fetch
pub fn print_fetch_error(err: &FetchError) {
    eprintln!("{}", "Failed to load data".red().bold());
    eprintln!("  {} {}", "Message:".bold(), err.message);
    if let Some(status) = err.status {
        eprintln!("  {} {}", "Status:".bold(), status);
    }
    eprintln!("  {} {}", "URL:".bold(), err.url);
}

/// Confirm an action with the user
pub fn confirm(message: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_fallbacks() {
        let record = json!({"_id": "v1", "title": "Hull survey", "views": 3});
        assert_eq!(field(&record, &["id", "_id"]), "v1");
        assert_eq!(field(&record, &["name", "title"]), "Hull survey");
        assert_eq!(field(&record, &["views"]), "3");
        assert_eq!(field(&record, &["missing"]), "-");
    }
}
