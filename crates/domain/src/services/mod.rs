//! Domain services for iZwi.
//!
//! Services hold `Arc`s of the store traits they need and are cheap to
//! construct per request.

pub mod alerts;
pub mod business;
pub mod community;
pub mod identity;
pub mod policy;
pub mod presentation;

pub use alerts::{AlertDraft, AlertLedger};
pub use business::{BusinessDraft, BusinessRegistry};
pub use community::{CommunityRegistry, CommunitySettings};
pub use identity::{IdentityService, Registration};
pub use policy::{
    can_moderate, can_resolve, check_premium_access, subscription_limits, upgrade_prompt,
    within_reach, AccessPolicy,
};
pub use presentation::{category_color, category_icon, format_time_ago, AlertCategory};
