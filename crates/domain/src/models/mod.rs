//! Domain models for iZwi.

pub mod alert;
pub mod business;
pub mod community;
pub mod subscription;
pub mod user;

pub use alert::{Alert, AlertWithAuthor, AuthoredAlert, NewAlert};
pub use business::{Branding, Business, NewBusiness};
pub use community::{BoundaryPolicy, Community, NewCommunity};
pub use subscription::{
    CommunityUsage, LimitedAction, SubscriptionLimits, SubscriptionTier, UpgradePrompt,
};
pub use user::{NewUser, Role, User};
