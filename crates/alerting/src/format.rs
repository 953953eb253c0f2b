//! Notification decision and SMS body rendering

use crate::webhook::Alert;

/// Longest SMS body, in Unicode scalar values
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Suffix marking a truncated body
pub const ELLIPSIS: &str = "...";

const CRITICAL: &str = "critical";
const FIRING: &str = "firing";

/// Only critical alerts that are firing (or carry no status) are sent.
pub fn should_notify(alert: &Alert) -> bool {
    if alert.severity() != Some(CRITICAL) {
        return false;
    }
    alert.status.is_empty() || alert.status == FIRING
}

/// Render the SMS body for an alert.
///
/// ```text
/// ALERT <alertname> [<severity>]
/// Instance: <instance>
/// <description>
/// ```
///
/// The result never exceeds [`MAX_MESSAGE_CHARS`] characters.
pub fn format_message(alert: &Alert) -> String {
    let description = alert
        .annotation("description")
        .filter(|d| !d.is_empty())
        .or_else(|| alert.annotation("summary").filter(|s| !s.is_empty()))
        .unwrap_or("No description");

    let message = format!(
        "ALERT {} [{}]\nInstance: {}\n{}",
        or_default(alert.alertname(), "unknown"),
        or_default(alert.severity(), "n/a"),
        or_default(alert.instance(), "n/a"),
        description,
    );

    truncate(message)
}

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}

fn truncate(message: String) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message;
    }

    let keep = MAX_MESSAGE_CHARS - ELLIPSIS.chars().count();
    let mut truncated: String = message.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
