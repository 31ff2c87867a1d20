//! Alert domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum description length in characters, measured after sanitization.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Maximum category length in characters.
pub const MAX_CATEGORY_LENGTH: usize = 50;

/// Author name shown when the author record cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A geotagged incident report scoped to one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub community_id: i64,
    pub user_id: i64,
    pub category: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub is_resolved: bool,
    pub is_premium_feature: bool,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub community_id: i64,
    pub user_id: i64,
    pub category: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

/// An alert joined with its author's display name as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredAlert {
    pub alert: Alert,
    /// `None` when the author row is missing.
    pub author_name: Option<String>,
}

/// An alert with a resolved author name, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertWithAuthor {
    #[serde(flatten)]
    pub alert: Alert,
    pub author_name: String,
}

impl From<AuthoredAlert> for AlertWithAuthor {
    fn from(authored: AuthoredAlert) -> Self {
        let author_name = authored
            .author_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        Self {
            alert: authored.alert,
            author_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert() -> Alert {
        Alert {
            id: 1,
            community_id: 2,
            user_id: 3,
            category: "Fire".to_string(),
            description: "Smoke near the school".to_string(),
            latitude: -26.2,
            longitude: 28.04,
            timestamp: Utc::now(),
            is_resolved: false,
            is_premium_feature: false,
        }
    }

    #[test]
    fn test_author_name_kept() {
        let view: AlertWithAuthor = AuthoredAlert {
            alert: alert(),
            author_name: Some("Sipho".to_string()),
        }
        .into();
        assert_eq!(view.author_name, "Sipho");
    }

    #[test]
    fn test_missing_author_falls_back_to_unknown() {
        let view: AlertWithAuthor = AuthoredAlert {
            alert: alert(),
            author_name: None,
        }
        .into();
        assert_eq!(view.author_name, UNKNOWN_AUTHOR);

        let blank: AlertWithAuthor = AuthoredAlert {
            alert: alert(),
            author_name: Some("  ".to_string()),
        }
        .into();
        assert_eq!(blank.author_name, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_alert_with_author_serializes_flat() {
        let view: AlertWithAuthor = AuthoredAlert {
            alert: alert(),
            author_name: Some("Sipho".to_string()),
        }
        .into();
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["category"], "Fire");
        assert_eq!(value["author_name"], "Sipho");
        assert_eq!(value["is_resolved"], false);
    }
}
