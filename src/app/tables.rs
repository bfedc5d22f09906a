use std::fmt::Write as _;

use crate::admin::{BulkOutcome, ContentTable, PluginTable, Settings, UserTable};

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

pub fn render_plugins(table: &PluginTable) -> String {
    let rows = table.visible();
    if rows.is_empty() {
        return t!("admin.no_plugins").to_string();
    }

    let mut out = format!(
        "{:<24} {:<10} {:<14} {:>10} {:>6}  {}\n",
        "SLUG", "VERSION", "STATUS", "DOWNLOADS", "RATING", "NAME"
    );
    for plugin in rows {
        let _ = writeln!(
            out,
            "{:<24} {:<10} {:<14} {:>10} {:>6.1}  {}",
            truncate(&plugin.slug, 24),
            truncate(&plugin.version, 10),
            plugin.status.to_string(),
            plugin.downloads,
            plugin.rating,
            plugin.name
        );
    }

    let counts: Vec<String> = table
        .status_counts()
        .into_iter()
        .map(|(status, count)| format!("{status}={count}"))
        .collect();
    let _ = write!(out, "\n{}", counts.join(" "));
    out
}

pub fn render_users(table: &UserTable) -> String {
    let rows = table.visible();
    if rows.is_empty() {
        return t!("admin.no_users").to_string();
    }

    let mut out = format!(
        "{:<20} {:<28} {:<10} {:<20} {}\n",
        "USERNAME", "EMAIL", "STATUS", "ROLES", "LAST LOGIN"
    );
    for user in rows {
        let last_login = user.last_login.map_or_else(
            || "never".to_string(),
            |at| at.format("%Y-%m-%d").to_string(),
        );
        let _ = writeln!(
            out,
            "{:<20} {:<28} {:<10} {:<20} {}",
            truncate(&user.username, 20),
            truncate(&user.email, 28),
            user.status.to_string(),
            truncate(&user.roles.join(","), 20),
            last_login
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn render_content(table: &ContentTable) -> String {
    let rows = table.visible();
    if rows.is_empty() {
        return t!("admin.no_content", kind = table.kind().to_string()).to_string();
    }

    let mut out = format!(
        "{:<14} {:<32} {:<10} {:<16} {}\n",
        "ID", "TITLE", "STATUS", "AUTHOR", "UPDATED"
    );
    for item in rows {
        let _ = writeln!(
            out,
            "{:<14} {:<32} {:<10} {:<16} {}",
            truncate(&item.id, 14),
            truncate(&item.title, 32),
            item.status.to_string(),
            truncate(&item.author, 16),
            item.modified_at().format("%Y-%m-%d")
        );
    }

    let counts: Vec<String> = table
        .status_counts()
        .into_iter()
        .map(|(status, count)| format!("{status}={count}"))
        .collect();
    let _ = write!(out, "\n{}", counts.join(" "));
    out
}

/// One line per failure after a `done/attempted` summary.
pub fn render_outcome(action: &str, outcome: &BulkOutcome) -> String {
    let mut out = format!(
        "{action}: {}/{} succeeded",
        outcome.succeeded.len(),
        outcome.attempted()
    );
    if !outcome.skipped.is_empty() {
        let _ = write!(out, ", skipped {}", outcome.skipped.join(", "));
    }
    for (key, message) in &outcome.failed {
        let _ = write!(out, "\n  ✗ {key}: {message}");
    }
    out
}

pub fn render_settings(settings: &Settings) -> String {
    let value = settings.to_value();
    let mut out = format!("[{}]", settings.section());
    if let Some(fields) = value.as_object() {
        for (key, value) in fields {
            let shown = value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_string);
            let _ = write!(out, "\n{key} = {shown}");
        }
    }
    out
}
