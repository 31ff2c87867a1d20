//! Invite slug generation.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// Length of a community invite slug.
pub const INVITE_SLUG_LENGTH: usize = 10;

/// Generates a random invite slug of [`INVITE_SLUG_LENGTH`] characters drawn
/// from `[A-Za-z0-9]` using the operating system's CSPRNG.
///
/// Uniqueness is not guaranteed; callers check the store and retry.
pub fn generate_invite_slug() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(INVITE_SLUG_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns true if `slug` has the shape produced by [`generate_invite_slug`].
pub fn is_well_formed_invite_slug(slug: &str) -> bool {
    slug.len() == INVITE_SLUG_LENGTH && slug.chars().all(|c| c.is_ascii_alphanumeric())
}
