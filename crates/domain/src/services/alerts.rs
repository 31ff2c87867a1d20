//! Alert ledger: posting, listing, resolving and reporting alerts.

use std::sync::Arc;

use chrono::Utc;
use shared::crypto::mask_email;
use shared::sanitize::{sanitize_plain_text, sanitize_rich_text};
use shared::validation::{parse_latitude, parse_longitude};
use tracing::info;

use crate::errors::AlertError;
use crate::models::alert::{MAX_CATEGORY_LENGTH, MAX_DESCRIPTION_LENGTH};
use crate::models::{AlertWithAuthor, NewAlert, User};
use crate::services::policy::{can_resolve, within_reach};
use crate::stores::{AlertStore, CommunityStore};

/// Raw alert form input. Coordinates stay strings until parsed here.
#[derive(Debug, Clone, Default)]
pub struct AlertDraft {
    pub category: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
}

pub struct AlertLedger {
    alerts: Arc<dyn AlertStore>,
    communities: Arc<dyn CommunityStore>,
}

impl AlertLedger {
    pub fn new(alerts: Arc<dyn AlertStore>, communities: Arc<dyn CommunityStore>) -> Self {
        Self {
            alerts,
            communities,
        }
    }

    /// Alerts of a community, newest first.
    pub async fn list_for_community(
        &self,
        community_id: i64,
        include_resolved: bool,
    ) -> Result<Vec<AlertWithAuthor>, AlertError> {
        let alerts = self
            .alerts
            .list_for_community(community_id, include_resolved)
            .await?;
        Ok(alerts.into_iter().map(AlertWithAuthor::from).collect())
    }

    /// Posts an alert and returns its id.
    ///
    /// Unparseable or out-of-range coordinates are stored as 0.
    pub async fn create(
        &self,
        community_id: i64,
        user_id: i64,
        draft: AlertDraft,
    ) -> Result<i64, AlertError> {
        let category = sanitize_plain_text(draft.category.trim());
        let description = sanitize_rich_text(draft.description.trim());

        if category.trim().is_empty() || description.trim().is_empty() {
            return Err(AlertError::MissingFields);
        }
        if category.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(AlertError::CategoryTooLong);
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(AlertError::DescriptionTooLong);
        }

        let alert = self
            .alerts
            .insert(NewAlert {
                community_id,
                user_id,
                category,
                description,
                latitude: parse_latitude(&draft.latitude),
                longitude: parse_longitude(&draft.longitude),
                timestamp: Utc::now(),
            })
            .await?;

        info!(
            alert_id = alert.id,
            community_id,
            user_id,
            category = %alert.category,
            "Alert posted"
        );
        Ok(alert.id)
    }

    pub async fn get_alert(&self, alert_id: i64) -> Result<AlertWithAuthor, AlertError> {
        self.alerts
            .find_with_author(alert_id)
            .await?
            .map(AlertWithAuthor::from)
            .ok_or(AlertError::NotFound)
    }

    /// Marks an alert resolved. Only an admin whose reach includes the
    /// alert's community may do this.
    pub async fn resolve(&self, alert_id: i64, acting_user: &User) -> Result<(), AlertError> {
        if !can_resolve(acting_user) {
            return Err(AlertError::PermissionDenied);
        }

        let alert = self
            .alerts
            .find_by_id(alert_id)
            .await?
            .ok_or(AlertError::NotFound)?;
        let community = self
            .communities
            .find_by_id(alert.community_id)
            .await?
            .ok_or(AlertError::NotFound)?;
        if !within_reach(acting_user, &community) {
            return Err(AlertError::PermissionDenied);
        }

        if !self.alerts.mark_resolved(alert_id).await? {
            return Err(AlertError::NotFound);
        }

        info!(alert_id, resolved_by = acting_user.id, "Alert resolved");
        Ok(())
    }

    /// Records a content report in the audit log. Nothing is persisted.
    pub fn report(&self, alert_id: Option<i64>, reporter: &User) -> Result<(), AlertError> {
        let alert_id = alert_id.ok_or(AlertError::MissingAlertId)?;

        info!(
            target: "audit",
            event = "alert_reported",
            alert_id,
            reporter_id = reporter.id,
            reporter_email = %mask_email(&reporter.email),
            reported_at = %Utc::now().to_rfc3339(),
            "Alert reported"
        );
        Ok(())
    }
}
