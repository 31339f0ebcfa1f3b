//! Application configuration loaded from TOML
//!
//! Every section falls back to its defaults, so a partial file (or no file at
//! all) yields a runnable development setup.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{IdentitySettings, LockoutPolicy, PasswordPolicy, TokenSettings};
use crate::infrastructure::crypto::SigningKey;
use crate::infrastructure::{DatabaseConfig, SmtpSettings};

pub const CONFIG_ENV: &str = "TOOLS_CONFIG";

/// Upper bounds are one year.
const MAX_MINUTES: RangeInclusive<i64> = 1..=525_600;
const MAX_HOURS: RangeInclusive<i64> = 1..=8_760;
const BCRYPT_COST: RangeInclusive<i64> = 4..=31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub auth: AuthSection,
    pub email: EmailSection,
    pub cep: CepSection,
    pub swagger: SwaggerSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Seconds allowed for in-flight requests after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            shutdown_timeout: 30,
        }
    }
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub run_migrations: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DatabaseConfig::default().url,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub security_key: String,
    pub algorithm: String,
    pub valid_issuer: String,
    pub valid_audience: String,
    pub subject: String,
    pub expires_in_minutes: i64,
    pub require_confirmed_account: bool,
    pub claims: BTreeMap<String, String>,
    pub password: PasswordSection,
    pub lockout: LockoutSection,
    pub confirmation: ConfirmationSection,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            security_key: "change-me-development-signing-key-0123456789".to_string(),
            algorithm: "HS256".to_string(),
            valid_issuer: "tools-api".to_string(),
            valid_audience: "tools-clients".to_string(),
            subject: "HYPER.IO PROJECTS L.T.D.A".to_string(),
            expires_in_minutes: 60,
            require_confirmed_account: false,
            claims: BTreeMap::from([("Admin".to_string(), "1".to_string())]),
            password: PasswordSection::default(),
            lockout: LockoutSection::default(),
            confirmation: ConfirmationSection::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSection {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_non_alphanumeric: bool,
    pub hash_cost: u32,
}

impl Default for PasswordSection {
    fn default() -> Self {
        Self {
            required_length: 8,
            require_digit: true,
            require_uppercase: true,
            require_lowercase: false,
            require_non_alphanumeric: false,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutSection {
    pub max_failed_attempts: i32,
    pub lockout_minutes: i64,
}

impl Default for LockoutSection {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationSection {
    pub code_lifetime_hours: i64,
}

impl Default for ConfirmationSection {
    fn default() -> Self {
        Self {
            code_lifetime_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSection {
    /// When false, activation invites are kept in memory and logged
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub starttls: bool,
    pub from: String,
    pub activation_url: String,
}

impl Default for EmailSection {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            starttls: true,
            from: "TOOLS.API <no-reply@localhost>".to_string(),
            activation_url: "http://localhost:5000/activate".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CepSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for CepSection {
    fn default() -> Self {
        Self {
            base_url: "https://viacep.com.br".to_string(),
            timeout_secs: 10,
        }
    }
}

impl CepSection {
    pub fn timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaggerSection {
    pub api_version: String,
    pub api_description: String,
}

impl Default for SwaggerSection {
    fn default() -> Self {
        Self {
            api_version: "v1".to_string(),
            api_description: "TOOLS.API".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// `~/.config/tools-api/config.toml` (platform equivalent)
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tools-api")
        .join("config.toml")
}

/// Explicit path, then `TOOLS_CONFIG`, then the per-user default.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

impl AppConfig {
    /// Read `path`. A missing file gives the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::load_optional(path)?.unwrap_or_default())
    }

    /// Like [`AppConfig::load`] but reports a missing file as `None`, so the
    /// caller can log it once tracing is up.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signing_key()?;

        in_range("auth.expires_in_minutes", self.auth.expires_in_minutes, MAX_MINUTES)?;
        in_range(
            "auth.lockout.lockout_minutes",
            self.auth.lockout.lockout_minutes,
            MAX_MINUTES,
        )?;
        in_range(
            "auth.lockout.max_failed_attempts",
            self.auth.lockout.max_failed_attempts.into(),
            1..=i64::from(i32::MAX),
        )?;
        in_range(
            "auth.confirmation.code_lifetime_hours",
            self.auth.confirmation.code_lifetime_hours,
            MAX_HOURS,
        )?;
        in_range(
            "auth.password.hash_cost",
            self.auth.password.hash_cost.into(),
            BCRYPT_COST,
        )?;
        if self.auth.password.required_length == 0 {
            return Err(ConfigError::Invalid(
                "auth.password.required_length must be at least 1".into(),
            ));
        }

        let base = url::Url::parse(&self.cep.base_url)
            .map_err(|e| ConfigError::Invalid(format!("cep.base_url: {}", e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "cep.base_url must be http(s), got {}",
                base.scheme()
            )));
        }

        Ok(())
    }

    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        SigningKey::new(&self.auth.security_key, &self.auth.algorithm)
            .map_err(|e| ConfigError::Invalid(format!("auth.security_key: {}", e)))
    }

    pub fn identity_settings(&self) -> IdentitySettings {
        let password = &self.auth.password;
        IdentitySettings {
            password: PasswordPolicy {
                required_length: password.required_length,
                require_digit: password.require_digit,
                require_uppercase: password.require_uppercase,
                require_lowercase: password.require_lowercase,
                require_non_alphanumeric: password.require_non_alphanumeric,
            },
            lockout: LockoutPolicy {
                max_failed_attempts: self.auth.lockout.max_failed_attempts,
                duration: minutes(self.auth.lockout.lockout_minutes),
            },
            require_confirmed_account: self.auth.require_confirmed_account,
            confirmation_code_lifetime: Duration::try_hours(
                self.auth.confirmation.code_lifetime_hours,
            )
            .unwrap_or(Duration::MAX),
            hash_cost: password.hash_cost,
        }
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            subject: self.auth.subject.clone(),
            issuer: self.auth.valid_issuer.clone(),
            audience: self.auth.valid_audience.clone(),
            expires_in: minutes(self.auth.expires_in_minutes),
            claims: self.auth.claims.clone(),
        }
    }

    pub fn smtp_settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.email.smtp_host.clone(),
            port: self.email.smtp_port,
            username: self.email.smtp_username.clone(),
            password: self.email.smtp_password.clone(),
            starttls: self.email.starttls,
            from: self.email.from.clone(),
            activation_url: self.email.activation_url.clone(),
        }
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
        }
    }
}

fn in_range(name: &str, value: i64, range: RangeInclusive<i64>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// Unvalidated input saturates instead of panicking.
fn minutes(value: i64) -> Duration {
    Duration::try_minutes(value).unwrap_or(Duration::MAX)
}
