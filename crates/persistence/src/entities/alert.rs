//! Alert entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Alert, AuthoredAlert};
use sqlx::FromRow;

/// Database row mapping for the alerts table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertEntity {
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

impl From<AlertEntity> for Alert {
    fn from(entity: AlertEntity) -> Self {
        Self {
            id: entity.id,
            community_id: entity.community_id,
            user_id: entity.user_id,
            category: entity.category,
            description: entity.description,
            latitude: entity.latitude,
            longitude: entity.longitude,
            timestamp: entity.timestamp,
            is_resolved: entity.is_resolved,
            is_premium_feature: entity.is_premium_feature,
        }
    }
}

/// Alert row LEFT JOINed with its author's display name.
#[derive(Debug, Clone, FromRow)]
pub struct AuthoredAlertEntity {
    #[sqlx(flatten)]
    pub alert: AlertEntity,
    pub author_name: Option<String>,
}

impl From<AuthoredAlertEntity> for AuthoredAlert {
    fn from(entity: AuthoredAlertEntity) -> Self {
        Self {
            alert: entity.alert.into(),
            author_name: entity.author_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::AlertWithAuthor;

    #[test]
    fn test_missing_author_row_maps_to_unknown() {
        let entity = AuthoredAlertEntity {
            alert: AlertEntity {
                id: 1,
                community_id: 2,
                user_id: 3,
                category: "Weather".to_string(),
                description: "Hail".to_string(),
                latitude: 0.0,
                longitude: 0.0,
                timestamp: Utc::now(),
                is_resolved: false,
                is_premium_feature: false,
            },
            author_name: None,
        };

        let view = AlertWithAuthor::from(AuthoredAlert::from(entity));
        assert_eq!(view.author_name, "Unknown");
        assert_eq!(view.alert.category, "Weather");
    }
}
