//! Display helpers for alert categories and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categories offered by the alert form. Alerts may carry any category
/// text; unknown ones are displayed like [`AlertCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCategory {
    Emergency,
    Fire,
    Traffic,
    Weather,
    Community,
    Other,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 6] = [
        AlertCategory::Emergency,
        AlertCategory::Fire,
        AlertCategory::Traffic,
        AlertCategory::Weather,
        AlertCategory::Community,
        AlertCategory::Other,
    ];

    /// Exact, case-sensitive match on the display label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertCategory::Emergency => "Emergency",
            AlertCategory::Fire => "Fire",
            AlertCategory::Traffic => "Traffic",
            AlertCategory::Weather => "Weather",
            AlertCategory::Community => "Community",
            AlertCategory::Other => "Other",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AlertCategory::Emergency => "#DC2626",
            AlertCategory::Fire => "#EA580C",
            AlertCategory::Traffic => "#2563EB",
            AlertCategory::Weather => "#7C3AED",
            AlertCategory::Community => "#059669",
            AlertCategory::Other => "#6B7280",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AlertCategory::Emergency => "🚨",
            AlertCategory::Fire => "🔥",
            AlertCategory::Traffic => "🚗",
            AlertCategory::Weather => "⛈️",
            AlertCategory::Community => "🏘️",
            AlertCategory::Other => "❗",
        }
    }
}

pub fn category_color(category: &str) -> &'static str {
    AlertCategory::from_label(category)
        .unwrap_or(AlertCategory::Other)
        .color()
}

pub fn category_icon(category: &str) -> &'static str {
    AlertCategory::from_label(category)
        .unwrap_or(AlertCategory::Other)
        .icon()
}

/// Renders `timestamp` relative to `now`.
///
/// Older than seven full days shows the date (`Mar 04`); timestamps in the
/// future read as "Just now".
pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);
    let days = diff.num_days();
    let seconds = diff.num_seconds();

    if days > 7 {
        timestamp.format("%b %d").to_string()
    } else if days > 0 {
        plural(days, "day")
    } else if seconds > 3600 {
        plural(seconds / 3600, "hour")
    } else if seconds > 60 {
        plural(seconds / 60, "minute")
    } else {
        "Just now".to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
