//! Business (white-label tenant) domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subscription::SubscriptionTier;

pub const DEFAULT_BRAND_NAME: &str = "iZwi";
pub const DEFAULT_BRAND_COLOR: &str = "#1F2937";

/// A white-label tenant owning zero or more communities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub contact_email: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub contact_email: Option<String>,
    pub subscription_tier: SubscriptionTier,
}

/// Branding applied to a community's pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub business_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub is_white_labeled: bool,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            business_name: DEFAULT_BRAND_NAME.to_string(),
            logo_url: None,
            primary_color: DEFAULT_BRAND_COLOR.to_string(),
            is_white_labeled: false,
        }
    }
}

impl From<&Business> for Branding {
    fn from(business: &Business) -> Self {
        Self {
            business_name: business.name.clone(),
            logo_url: business.logo_url.clone(),
            primary_color: business.primary_color.clone(),
            is_white_labeled: true,
        }
    }
}
