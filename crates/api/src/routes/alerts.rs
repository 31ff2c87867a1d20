//! Alert routes: listing, posting, resolving and reporting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::errors::{CommunityError, PolicyError};
use domain::models::{AlertWithAuthor, LimitedAction};
use domain::services::{category_color, category_icon, format_time_ago, AlertDraft};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, CurrentUser};
use crate::middleware::metrics::{record_alert_posted, record_limit_refusal};

/// An alert decorated for display.
#[derive(Debug, Clone, Serialize)]
pub struct AlertResponse {
    #[serde(flatten)]
    pub alert: AlertWithAuthor,
    pub color: &'static str,
    pub icon: &'static str,
    pub time_ago: String,
}

impl AlertResponse {
    fn new(alert: AlertWithAuthor, now: chrono::DateTime<Utc>) -> Self {
        let category = alert.alert.category.as_str();
        Self {
            color: category_color(category),
            icon: category_icon(category),
            time_ago: format_time_ago(alert.alert.timestamp, now),
            alert,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAlertsQuery {
    #[serde(default)]
    pub include_resolved: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRequest {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Any JSON value; only numbers and strings can yield a position.
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
}

/// Raw coordinate text for the domain parser. Other JSON types become blank,
/// which the parser stores as `0.0`.
fn raw_coordinate(value: Option<Value>) -> String {
    match value {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}

impl From<CreateAlertRequest> for AlertDraft {
    fn from(request: CreateAlertRequest) -> Self {
        Self {
            category: request.category,
            description: request.description,
            latitude: raw_coordinate(request.latitude),
            longitude: raw_coordinate(request.longitude),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportAlertRequest {
    pub alert_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportAlertResponse {
    pub message: &'static str,
}

/// GET /api/v1/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<Vec<AlertResponse>>, ApiError> {
    let community_id = user.community_id.ok_or(CommunityError::NotMember)?;
    let alerts = state
        .alerts()
        .list_for_community(community_id, query.include_resolved)
        .await?;

    let now = Utc::now();
    Ok(Json(
        alerts
            .into_iter()
            .map(|alert| AlertResponse::new(alert, now))
            .collect(),
    ))
}

/// Post an alert to the caller's community, subject to the monthly cap.
///
/// POST /api/v1/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    ApiJson(request): ApiJson<CreateAlertRequest>,
) -> Result<(StatusCode, Json<AlertResponse>), ApiError> {
    let community_id = user.community_id.ok_or(CommunityError::NotMember)?;
    let community = state.communities().get_info(community_id).await?;

    state
        .policy()
        .check_community_limit(&community, LimitedAction::PostAlert)
        .await
        .map_err(|e| {
            if matches!(e, PolicyError::LimitReached(_)) {
                record_limit_refusal("post_alert");
            }
            ApiError::from(e)
        })?;

    let ledger = state.alerts();
    let alert_id = ledger
        .create(community_id, user.id, AlertDraft::from(request))
        .await?;
    let alert = ledger.get_alert(alert_id).await?;
    record_alert_posted(&alert.alert.category);

    Ok((
        StatusCode::CREATED,
        Json(AlertResponse::new(alert, Utc::now())),
    ))
}

/// POST /api/v1/alerts/:alert_id/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    Path(alert_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.alerts().resolve(alert_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/alerts/report
pub async fn report_alert(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    ApiJson(request): ApiJson<ReportAlertRequest>,
) -> Result<(StatusCode, Json<ReportAlertResponse>), ApiError> {
    state.alerts().report(request.alert_id, &user)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ReportAlertResponse {
            message: "Thank you. The report has been recorded for review.",
        }),
    ))
}
