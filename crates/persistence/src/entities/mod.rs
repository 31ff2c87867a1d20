//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert;
pub mod business;
pub mod community;
pub mod user;

pub use alert::{AlertEntity, AuthoredAlertEntity};
pub use business::BusinessEntity;
pub use community::CommunityEntity;
pub use user::{RoleDb, SubscriptionTierDb, UserEntity};
