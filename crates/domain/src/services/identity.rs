//! Identity and credential management.

use std::sync::Arc;

use shared::crypto::{email_fingerprint, mask_email};
use shared::password::{hash_password, verify_against_dummy, verify_password};
use shared::sanitize::sanitize_plain_text;
use shared::validation::{fits_url_column, is_strong_enough_password, validate_email};
use tracing::{info, warn};

use crate::errors::AuthError;
use crate::models::{NewUser, Role, SubscriptionTier, User};
use crate::stores::UserStore;

/// Maximum display name length in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Input for [`IdentityService::register`].
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub community_id: Option<i64>,
    pub business_id: Option<i64>,
    pub role: Option<Role>,
}

/// Registers and authenticates users.
pub struct IdentityService {
    users: Arc<dyn UserStore>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Checks an email/password pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !validate_email(email) {
            return Err(AuthError::InvalidEmailFormat);
        }

        let email = normalize_email(email);
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                verify_against_dummy(password);
                warn!(
                    email = %mask_email(&email),
                    email_fp = %email_fingerprint(&email),
                    "Login failed: unknown email"
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        if !valid {
            warn!(user_id = user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = user.id, "Login succeeded");
        Ok(user)
    }

    /// Shape checks on a would-be account's credentials. Touches no store.
    pub fn check_credentials(email: &str, password: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !validate_email(email) {
            return Err(AuthError::InvalidEmailFormat);
        }
        if !is_strong_enough_password(password) {
            return Err(AuthError::WeakPassword);
        }
        Ok(())
    }

    /// Creates an account.
    ///
    /// Role defaults to Business when a business is given, Member when a
    /// community is given, Admin otherwise. Business accounts start Premium.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        Self::check_credentials(&registration.email, &registration.password)?;
        let email = registration.email.trim();

        let display_name = sanitize_display_name(registration.display_name.as_deref())?;
        let email = normalize_email(email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let role = registration.role.unwrap_or(match (
            registration.business_id,
            registration.community_id,
        ) {
            (Some(_), _) => Role::Business,
            (None, Some(_)) => Role::Member,
            (None, None) => Role::Admin,
        });
        let subscription_tier = if role == Role::Business {
            SubscriptionTier::Premium
        } else {
            SubscriptionTier::Free
        };

        let password_hash = hash_password(&registration.password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let user = self
            .users
            .insert(NewUser {
                email,
                password_hash,
                display_name,
                avatar_url: None,
                community_id: registration.community_id,
                business_id: registration.business_id,
                role,
                subscription_tier,
            })
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration.
                if e.is_unique_violation_on("email") {
                    AuthError::EmailAlreadyRegistered
                } else {
                    AuthError::Store(e)
                }
            })?;

        info!(
            user_id = user.id,
            role = %user.role,
            community_id = ?user.community_id,
            business_id = ?user.business_id,
            "User registered"
        );
        Ok(user)
    }

    /// Fresh read of a user record.
    pub async fn get_user(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Updates display name and avatar. `None` leaves a field unchanged.
    pub async fn update_profile(
        &self,
        user: &User,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, AuthError> {
        let display_name = match display_name {
            Some(name) => sanitize_display_name(Some(name))?,
            None => user.display_name.clone(),
        };
        let avatar_url = match avatar_url {
            Some(url) => Some(sanitize_plain_text(url.trim())).filter(|u| !u.is_empty()),
            None => user.avatar_url.clone(),
        };
        if avatar_url.as_deref().is_some_and(|url| !fits_url_column(url)) {
            return Err(AuthError::AvatarUrlTooLong);
        }

        self.users
            .update_profile(user.id, &display_name, avatar_url.as_deref())
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Emails are stored trimmed, sanitized and lowercased.
pub fn normalize_email(email: &str) -> String {
    sanitize_plain_text(email.trim()).to_lowercase()
}

fn sanitize_display_name(name: Option<&str>) -> Result<String, AuthError> {
    let name = sanitize_plain_text(name.unwrap_or_default().trim());
    if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AuthError::DisplayNameTooLong);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    fn service(store: &Arc<InMemoryStore>) -> IdentityService {
        IdentityService::new(store.clone())
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_admin_free() {
        let store = InMemoryStore::new();
        let user = service(&store)
            .register(registration("nomsa@example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.subscription_tier, SubscriptionTier::Free);
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_role_resolution() {
        let store = InMemoryStore::new();
        let svc = service(&store);

        let member = svc
            .register(Registration {
                community_id: Some(9),
                ..registration("member@example.com", "password123")
            })
            .await
            .unwrap();
        assert_eq!(member.role, Role::Member);
        assert_eq!(member.subscription_tier, SubscriptionTier::Free);

        let business = svc
            .register(Registration {
                business_id: Some(4),
                community_id: Some(9),
                ..registration("biz@example.com", "password123")
            })
            .await
            .unwrap();
        assert_eq!(business.role, Role::Business);
        assert_eq!(business.subscription_tier, SubscriptionTier::Premium);

        let explicit = svc
            .register(Registration {
                role: Some(Role::Member),
                ..registration("explicit@example.com", "password123")
            })
            .await
            .unwrap();
        assert_eq!(explicit.role, Role::Member);
    }

    #[tokio::test]
    async fn test_register_invalid_email_makes_no_record() {
        let store = InMemoryStore::new();
        let result = service(&store)
            .register(registration("not-an-email", "password123"))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidEmailFormat)));
        assert_eq!(store.user_count().await, 0);
    }

    #[test]
    fn test_check_credentials() {
        assert!(IdentityService::check_credentials("ok@example.com", "password123").is_ok());
        assert!(matches!(
            IdentityService::check_credentials(" ", "password123"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            IdentityService::check_credentials("nope", "password123"),
            Err(AuthError::InvalidEmailFormat)
        ));
        assert!(matches!(
            IdentityService::check_credentials("ok@example.com", "short"),
            Err(AuthError::WeakPassword)
        ));
    }

    #[tokio::test]
    async fn test_register_overlong_email_makes_no_record() {
        let store = InMemoryStore::new();
        let email = format!("{}@example.com", "a".repeat(120));
        let result = service(&store)
            .register(registration(&email, "password123"))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidEmailFormat)));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_short_password_makes_no_record() {
        let store = InMemoryStore::new();
        let result = service(&store)
            .register(registration("ok@example.com", "1234567"))
            .await;

        assert!(matches!(result, Err(AuthError::WeakPassword)));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_missing_credentials() {
        let store = InMemoryStore::new();
        let svc = service(&store);
        assert!(matches!(
            svc.register(registration("", "password123")).await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            svc.register(registration("a@example.com", "")).await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = InMemoryStore::new();
        let svc = service(&store);
        svc.register(registration("dup@example.com", "password123"))
            .await
            .unwrap();

        let result = svc
            .register(registration("  DUP@example.com ", "different-pass"))
            .await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyRegistered)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_sanitizes_display_name() {
        let store = InMemoryStore::new();
        let user = service(&store)
            .register(Registration {
                display_name: Some("<b>Lerato</b>".to_string()),
                ..registration("lerato@example.com", "password123")
            })
            .await
            .unwrap();
        assert_eq!(user.display_name, "Lerato");
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let store = InMemoryStore::new();
        let svc = service(&store);
        let registered = svc
            .register(registration("login@example.com", "password123"))
            .await
            .unwrap();

        let user = svc
            .authenticate("login@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let store = InMemoryStore::new();
        let svc = service(&store);
        svc.register(registration("login@example.com", "password123"))
            .await
            .unwrap();

        assert!(matches!(
            svc.authenticate("login@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.authenticate("nobody@example.com", "password123").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.authenticate("bad-email", "password123").await,
            Err(AuthError::InvalidEmailFormat)
        ));
        assert!(matches!(
            svc.authenticate("", "").await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_get_user_missing() {
        let store = InMemoryStore::new();
        assert!(matches!(
            service(&store).get_user(404).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = InMemoryStore::new();
        let svc = service(&store);
        let user = svc
            .register(registration("profile@example.com", "password123"))
            .await
            .unwrap();

        let updated = svc
            .update_profile(&user, Some(" <i>Zanele</i> "), Some("https://cdn.example.com/z.png"))
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Zanele");
        assert_eq!(updated.avatar_url.as_deref(), Some("https://cdn.example.com/z.png"));

        let unchanged = svc.update_profile(&updated, None, None).await.unwrap();
        assert_eq!(unchanged.display_name, "Zanele");

        let too_long = "x".repeat(MAX_DISPLAY_NAME_LENGTH + 1);
        assert!(matches!(
            svc.update_profile(&updated, Some(&too_long), None).await,
            Err(AuthError::DisplayNameTooLong)
        ));

        let long_url = format!("https://cdn.example.com/{}.png", "a".repeat(240));
        assert!(matches!(
            svc.update_profile(&updated, None, Some(&long_url)).await,
            Err(AuthError::AvatarUrlTooLong)
        ));
        let stored = svc.get_user(updated.id).await.unwrap();
        assert_eq!(stored.avatar_url.as_deref(), Some("https://cdn.example.com/z.png"));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_persistence() {
        let store = InMemoryStore::new();
        store.set_failing(true);
        let err = service(&store)
            .authenticate("any@example.com", "password123")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Persistence);
    }
}
