use domain::models::BoundaryPolicy;
use domain::services::CommunitySettings;
use serde::Deserialize;
use shared::jwt::{JwtConfig, JwtError};
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Session token configuration
    pub jwt: JwtAuthConfig,
    #[serde(default)]
    pub communities: CommunitiesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per user per minute on authenticated routes; 0 disables.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Only enable behind proper TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

/// Session token settings.
///
/// RS256 is used when both PEM keys are set; otherwise `secret` signs
/// tokens with HS256.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    #[serde(default)]
    pub private_key: String,

    #[serde(default)]
    pub public_key: String,

    #[serde(default)]
    pub secret: String,

    /// Standard session lifetime (default: 86400 = 24 hours)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    /// "Remember me" session lifetime (default: 259200 = 3 days)
    #[serde(default = "default_remember_me_ttl")]
    pub remember_me_ttl_secs: i64,

    /// Clock skew tolerance
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

impl JwtAuthConfig {
    fn has_key_pair(&self) -> bool {
        !self.private_key.is_empty() && !self.public_key.is_empty()
    }

    /// Builds the signing configuration.
    pub fn build(&self) -> Result<JwtConfig, JwtError> {
        if self.has_key_pair() {
            JwtConfig::from_rsa_pem(
                &self.private_key,
                &self.public_key,
                self.session_ttl_secs,
                self.remember_me_ttl_secs,
                self.leeway_secs,
            )
        } else {
            JwtConfig::from_secret(
                &self.secret,
                self.session_ttl_secs,
                self.remember_me_ttl_secs,
                self.leeway_secs,
            )
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunitiesConfig {
    /// `strict` rejects boundaries that are not JSON, `lenient` stores
    /// them as sanitized text.
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,

    #[serde(default = "default_invite_slug_attempts")]
    pub invite_slug_attempts: u32,
}

impl Default for CommunitiesConfig {
    fn default() -> Self {
        Self {
            boundary_policy: BoundaryPolicy::default(),
            invite_slug_attempts: default_invite_slug_attempts(),
        }
    }
}

impl CommunitiesConfig {
    pub fn settings(&self) -> CommunitySettings {
        CommunitySettings {
            boundary_policy: self.boundary_policy,
            invite_slug_attempts: self.invite_slug_attempts,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    100
}
fn default_session_ttl() -> i64 {
    shared::jwt::DEFAULT_SESSION_TTL_SECS
}
fn default_remember_me_ttl() -> i64 {
    shared::jwt::DEFAULT_REMEMBER_ME_TTL_SECS
}
fn default_jwt_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}
fn default_invite_slug_attempts() -> u32 {
    5
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with IZWI__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("IZWI").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 1048576

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 100
            hsts_enabled = false

            [jwt]
            secret = "test-secret-that-is-at-least-32-bytes-long"
            session_ttl_secs = 86400
            remember_me_ttl_secs = 259200
            leeway_secs = 30

            [communities]
            boundary_policy = "strict"
            invite_slug_attempts = 5
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the caller so partial configs can be tested.
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "IZWI__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if !self.jwt.has_key_pair() && self.jwt.secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "jwt.private_key/jwt.public_key or jwt.secret must be set".to_string(),
            ));
        }

        if self.jwt.session_ttl_secs <= 0 || self.jwt.remember_me_ttl_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "JWT lifetimes must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
