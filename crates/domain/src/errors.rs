//! Error taxonomy shared by all domain services.
//!
//! Each service has its own error enum; every variant maps onto one
//! [`ErrorKind`], which is all the transport layer needs to pick a status
//! code and decide whether the message is safe to show.

use thiserror::Error;

/// Coarse classification of domain failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the message is shown verbatim.
    Validation,
    PermissionDenied,
    NotFound,
    /// Uniqueness clash; the message tells the caller what to change.
    Conflict,
    /// Storage failure; details are logged, never shown.
    Persistence,
    Unauthenticated,
    /// A subscription quota or premium gate refused the action.
    LimitExceeded,
}

/// Failure reported by a store implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// True if this is a unique violation on a constraint whose name
    /// contains `fragment`.
    pub fn is_unique_violation_on(&self, fragment: &str) -> bool {
        matches!(self, StoreError::UniqueViolation(constraint) if constraint.contains(fragment))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL error code 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Identity and credential failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmailFormat,

    #[error("Password must be at least 8 characters long")]
    WeakPassword,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Display name must be 100 characters or fewer")]
    DisplayNameTooLong,

    #[error("Avatar URL must be 255 characters or fewer")]
    AvatarUrlTooLong,

    #[error("User not found")]
    UserNotFound,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidEmailFormat
            | AuthError::WeakPassword
            | AuthError::DisplayNameTooLong
            | AuthError::AvatarUrlTooLong => ErrorKind::Validation,
            AuthError::EmailAlreadyRegistered => ErrorKind::Conflict,
            AuthError::InvalidCredentials => ErrorKind::Unauthenticated,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Hashing(_) | AuthError::Store(_) => ErrorKind::Persistence,
        }
    }
}

/// Community registry failures.
#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("Community name is required")]
    NameRequired,

    #[error("Community name must be 100 characters or fewer")]
    NameTooLong,

    #[error("A community with this name already exists. Please choose a different name.")]
    NameAlreadyExists,

    #[error("Invalid boundary data format")]
    InvalidBoundaryFormat,

    #[error("You do not have permission to manage this community")]
    PermissionDenied,

    #[error("Community not found")]
    NotFound,

    #[error("Member not found")]
    MemberNotFound,

    #[error("You already belong to a community")]
    AlreadyMember,

    #[error("You do not belong to a community")]
    NotMember,

    #[error("Use leave instead of removing yourself")]
    CannotRemoveSelf,

    #[error("Could not allocate a unique invite link. Please try again.")]
    InviteSlugUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommunityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommunityError::NameRequired
            | CommunityError::NameTooLong
            | CommunityError::InvalidBoundaryFormat
            | CommunityError::NotMember
            | CommunityError::CannotRemoveSelf => ErrorKind::Validation,
            CommunityError::NameAlreadyExists
            | CommunityError::AlreadyMember
            | CommunityError::InviteSlugUnavailable => ErrorKind::Conflict,
            CommunityError::PermissionDenied => ErrorKind::PermissionDenied,
            CommunityError::NotFound | CommunityError::MemberNotFound => ErrorKind::NotFound,
            CommunityError::Store(_) => ErrorKind::Persistence,
        }
    }
}

/// Alert ledger failures.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Category and description are required")]
    MissingFields,

    #[error("Description must be 500 characters or fewer")]
    DescriptionTooLong,

    #[error("Category must be 50 characters or fewer")]
    CategoryTooLong,

    #[error("Alert ID is required")]
    MissingAlertId,

    #[error("Admin access required")]
    PermissionDenied,

    #[error("Alert not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AlertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AlertError::MissingFields
            | AlertError::DescriptionTooLong
            | AlertError::CategoryTooLong
            | AlertError::MissingAlertId => ErrorKind::Validation,
            AlertError::PermissionDenied => ErrorKind::PermissionDenied,
            AlertError::NotFound => ErrorKind::NotFound,
            AlertError::Store(_) => ErrorKind::Persistence,
        }
    }
}

/// Access and subscription-limit refusals.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Please log in to access this feature.")]
    LoginRequired,

    /// Carries the full user-facing message.
    #[error("{0}")]
    PremiumRequired(String),

    /// Carries the full user-facing message naming the limit.
    #[error("{0}")]
    LimitReached(String),

    #[error("Community not found")]
    CommunityNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PolicyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::LoginRequired => ErrorKind::Unauthenticated,
            PolicyError::PremiumRequired(_) | PolicyError::LimitReached(_) => {
                ErrorKind::LimitExceeded
            }
            PolicyError::CommunityNotFound => ErrorKind::NotFound,
            PolicyError::Store(_) => ErrorKind::Persistence,
        }
    }
}

/// Business registry failures.
#[derive(Debug, Error)]
pub enum BusinessError {
    #[error("Business name is required")]
    NameRequired,

    #[error("Business name must be 100 characters or fewer")]
    NameTooLong,

    #[error("Brand color must be a hex value like #1F2937")]
    InvalidColor,

    #[error("Please enter a valid contact email address")]
    InvalidEmailFormat,

    #[error("Logo URL must be 255 characters or fewer")]
    LogoUrlTooLong,

    #[error("Business not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BusinessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BusinessError::NameRequired
            | BusinessError::NameTooLong
            | BusinessError::InvalidColor
            | BusinessError::InvalidEmailFormat
            | BusinessError::LogoUrlTooLong => ErrorKind::Validation,
            BusinessError::NotFound => ErrorKind::NotFound,
            BusinessError::Store(_) => ErrorKind::Persistence,
        }
    }
}
