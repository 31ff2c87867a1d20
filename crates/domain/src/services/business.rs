//! Business registry and white-label branding.

use std::sync::Arc;

use shared::sanitize::sanitize_plain_text;
use shared::validation::{fits_url_column, validate_email, validate_hex_color};
use tracing::info;

use crate::errors::BusinessError;
use crate::models::business::DEFAULT_BRAND_COLOR;
use crate::models::{Branding, Business, Community, NewBusiness, SubscriptionTier};
use crate::stores::{BusinessStore, CommunityStore};

const MAX_BUSINESS_NAME_LENGTH: usize = 100;

/// Input for [`BusinessRegistry::create_business`].
#[derive(Debug, Clone, Default)]
pub struct BusinessDraft {
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub contact_email: Option<String>,
    pub subscription_tier: SubscriptionTier,
}

pub struct BusinessRegistry {
    businesses: Arc<dyn BusinessStore>,
    communities: Arc<dyn CommunityStore>,
}

impl BusinessRegistry {
    pub fn new(businesses: Arc<dyn BusinessStore>, communities: Arc<dyn CommunityStore>) -> Self {
        Self {
            businesses,
            communities,
        }
    }

    pub async fn create_business(&self, draft: BusinessDraft) -> Result<Business, BusinessError> {
        let name = sanitize_plain_text(draft.name.trim());
        if name.is_empty() {
            return Err(BusinessError::NameRequired);
        }
        if name.chars().count() > MAX_BUSINESS_NAME_LENGTH {
            return Err(BusinessError::NameTooLong);
        }

        let primary_color = match clean_optional(draft.primary_color) {
            Some(color) if validate_hex_color(&color) => color,
            Some(_) => return Err(BusinessError::InvalidColor),
            None => DEFAULT_BRAND_COLOR.to_string(),
        };

        let contact_email = clean_optional(draft.contact_email);
        if let Some(email) = &contact_email {
            if !validate_email(email) {
                return Err(BusinessError::InvalidEmailFormat);
            }
        }

        let logo_url = clean_optional(draft.logo_url);
        if logo_url.as_deref().is_some_and(|url| !fits_url_column(url)) {
            return Err(BusinessError::LogoUrlTooLong);
        }

        let business = self
            .businesses
            .insert(NewBusiness {
                name,
                logo_url,
                primary_color,
                contact_email,
                subscription_tier: draft.subscription_tier,
            })
            .await?;

        info!(business_id = business.id, tier = %business.subscription_tier, "Business created");
        Ok(business)
    }

    /// Active businesses only.
    pub async fn get_business(&self, business_id: i64) -> Result<Business, BusinessError> {
        self.businesses
            .find_active(business_id)
            .await?
            .ok_or(BusinessError::NotFound)
    }

    pub async fn get_business_communities(
        &self,
        business_id: i64,
    ) -> Result<Vec<Community>, BusinessError> {
        Ok(self.communities.list_by_business(business_id).await?)
    }

    /// Branding of the community's active business, or the iZwi defaults.
    pub async fn community_branding(&self, community_id: i64) -> Result<Branding, BusinessError> {
        Ok(self
            .businesses
            .find_active_for_community(community_id)
            .await?
            .map(|business| Branding::from(&business))
            .unwrap_or_default())
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| sanitize_plain_text(v.trim()))
        .filter(|v| !v.is_empty())
}
