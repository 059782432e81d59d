//! Output formatting helpers for human-readable and JSON output.

use profile_sync::{Profile, clock::format_millis};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    // Calculate column widths (max of header and all row values)
    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_line.join("  ").trim_end());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .take(col_count)
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

/// Lowercase wire name of a serializable unit value (`"dark"`, `"synced"`).
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => "-".to_string(),
    }
}

fn profile_rows(profile: &Profile) -> Vec<Vec<String>> {
    let user = profile
        .user
        .as_ref()
        .map(|u| match &u.display_name {
            Some(name) => format!("{name} ({})", u.username),
            None => u.username.clone(),
        })
        .unwrap_or_else(|| "-".to_string());
    let settings = &profile.settings;

    let mut rows = vec![
        vec!["user".to_string(), user],
        vec!["logged in".to_string(), profile.is_logged_in().to_string()],
        vec!["theme".to_string(), label(&settings.theme)],
        vec!["language".to_string(), settings.language.clone()],
        vec!["notifications".to_string(), settings.notifications.to_string()],
        vec!["auto sync".to_string(), settings.auto_sync.to_string()],
        vec!["compact mode".to_string(), settings.compact_mode.to_string()],
        vec!["sync status".to_string(), profile.sync_status.to_string()],
        vec!["last sync".to_string(), format_millis(profile.last_sync_at)],
    ];
    if let Some(error) = &profile.last_sync_error {
        rows.push(vec!["last error".to_string(), error.clone()]);
    }
    rows
}

/// Print a profile in the selected format.
pub fn print_profile(
    profile: &Profile,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Human => {
            print_table(&["FIELD", "VALUE"], &profile_rows(profile));
            Ok(())
        }
    }
}
