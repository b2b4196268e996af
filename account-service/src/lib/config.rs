use std::env;

use auth::Argon2Config;
use chrono::Duration;
use chrono::Utc;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

use crate::user::models::PasswordPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub environment: AppEnvironment,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub argon2: Argon2Settings,
    pub password_policy: PasswordPolicyConfig,
    pub admin: AdminConfig,
}

/// Deployment environment the service runs in.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Testing,
    Staging,
    Production,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Testing => "testing",
            AppEnvironment::Staging => "staging",
            AppEnvironment::Production => "production",
        }
    }

    /// Staging and production get the strict checks.
    pub fn is_production_like(&self) -> bool {
        matches!(self, AppEnvironment::Staging | AppEnvironment::Production)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
}

impl JwtConfig {
    /// Access token lifetime.
    ///
    /// # Errors
    /// * `NonPositiveTtl` - Zero or negative
    /// * `TtlOutOfRange` - A token issued now would expire past the datetime range
    pub fn access_ttl(&self) -> Result<Duration, ConfigValidationError> {
        bounded_ttl(
            "jwt.access_token_expire_minutes",
            self.access_token_expire_minutes,
            Duration::try_minutes,
        )
    }

    /// Refresh token lifetime, with the same checks as `access_ttl`.
    pub fn refresh_ttl(&self) -> Result<Duration, ConfigValidationError> {
        bounded_ttl(
            "jwt.refresh_token_expire_days",
            self.refresh_token_expire_days,
            Duration::try_days,
        )
    }
}

fn bounded_ttl(
    key: &'static str,
    amount: i64,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigValidationError> {
    if amount <= 0 {
        return Err(ConfigValidationError::NonPositiveTtl(key));
    }

    unit(amount)
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or(ConfigValidationError::TtlOutOfRange(key))
}

#[derive(Debug, Deserialize, Clone)]
pub struct Argon2Settings {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl From<&Argon2Settings> for Argon2Config {
    fn from(settings: &Argon2Settings) -> Self {
        Argon2Config {
            memory_cost: settings.memory_cost,
            time_cost: settings.time_cost,
            parallelism: settings.parallelism,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordPolicyConfig {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digits: bool,
    pub require_special: bool,
}

impl From<&PasswordPolicyConfig> for PasswordPolicy {
    fn from(config: &PasswordPolicyConfig) -> Self {
        PasswordPolicy {
            min_length: config.min_length,
            require_uppercase: config.require_uppercase,
            require_lowercase: config.require_lowercase,
            require_digits: config.require_digits,
            require_special: config.require_special,
        }
    }
}

/// Initial superuser seeded on startup.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub username: String,
    pub password: Option<String>,
}

/// Reasons a loaded configuration is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("jwt.secret must be at least {min} characters (got {actual})")]
    SecretTooShort { min: usize, actual: usize },

    #[error("jwt.secret contains the weak pattern '{0}' and cannot be used in staging or production")]
    WeakSecret(String),

    #[error("{0} must be positive")]
    NonPositiveTtl(&'static str),

    #[error("{0} is too large")]
    TtlOutOfRange(&'static str),

    #[error("argon2 parameters rejected: {0}")]
    InvalidArgon2(String),

    #[error("password_policy.min_length must be between 1 and {max}")]
    InvalidPasswordPolicy { max: usize },

    #[error("admin.password must be set in staging and production")]
    MissingAdminPassword,

    #[error("admin.password must be at least {min} characters")]
    AdminPasswordTooShort { min: usize },
}

impl Config {
    pub const MIN_SECRET_LENGTH: usize = 32;
    pub const MIN_ADMIN_PASSWORD_LENGTH: usize = 32;

    const WEAK_SECRET_PATTERNS: [&'static str; 7] = [
        "change-in-production",
        "changeme",
        "change_me",
        "your-super-secret",
        "secret-key",
        "password",
        "default",
    ];

    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    ///
    /// The result is validated before it is returned.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.http_port", 8000)?
            .set_default("server.cors_origins", vec!["*"])?
            .set_default("database.max_connections", 10)?
            .set_default("jwt.access_token_expire_minutes", 30)?
            .set_default("jwt.refresh_token_expire_days", 7)?
            .set_default("argon2.memory_cost", 65536)?
            .set_default("argon2.time_cost", 3)?
            .set_default("argon2.parallelism", 4)?
            .set_default("password_policy.min_length", 8)?
            .set_default("password_policy.require_uppercase", true)?
            .set_default("password_policy.require_lowercase", true)?
            .set_default("password_policy.require_digits", true)?
            .set_default("password_policy.require_special", true)?
            .set_default("admin.email", "admin@example.com")?
            .set_default("admin.username", "admin")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(config)
    }

    /// Check cross-field constraints that deserialization cannot express.
    ///
    /// # Errors
    /// First violated constraint
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.validate_secret()?;

        self.jwt.access_ttl()?;
        self.jwt.refresh_ttl()?;

        auth::PasswordHasher::new(&Argon2Config::from(&self.argon2))
            .map_err(|e| ConfigValidationError::InvalidArgon2(e.to_string()))?;

        let policy = &self.password_policy;
        if policy.min_length == 0 || policy.min_length > PasswordPolicy::MAX_LENGTH {
            return Err(ConfigValidationError::InvalidPasswordPolicy {
                max: PasswordPolicy::MAX_LENGTH,
            });
        }

        match &self.admin.password {
            None if self.environment.is_production_like() => {
                Err(ConfigValidationError::MissingAdminPassword)
            }
            Some(password) if password.chars().count() < Self::MIN_ADMIN_PASSWORD_LENGTH => {
                Err(ConfigValidationError::AdminPasswordTooShort {
                    min: Self::MIN_ADMIN_PASSWORD_LENGTH,
                })
            }
            _ => Ok(()),
        }
    }

    fn validate_secret(&self) -> Result<(), ConfigValidationError> {
        let length = self.jwt.secret.chars().count();
        if length < Self::MIN_SECRET_LENGTH {
            return Err(ConfigValidationError::SecretTooShort {
                min: Self::MIN_SECRET_LENGTH,
                actual: length,
            });
        }

        if self.environment.is_production_like() {
            let lowered = self.jwt.secret.to_lowercase();
            if let Some(pattern) = Self::WEAK_SECRET_PATTERNS
                .iter()
                .find(|pattern| lowered.contains(*pattern))
            {
                return Err(ConfigValidationError::WeakSecret(pattern.to_string()));
            }
        }

        Ok(())
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::from(&self.password_policy)
    }
}
