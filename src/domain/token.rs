//! Access tokens

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Signed, time-limited credential handed to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// What goes into a token besides the key and the clock
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub subject: String,
    pub issuer: String,
    pub audience: String,
    pub expires_in: Duration,
    pub claims: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing key is empty")]
    EmptyKey,

    #[error("signing key must be at least {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("claim '{0}' is reserved")]
    ReservedClaim(String),

    #[error("token lifetime of {0} overflows the expiry timestamp")]
    LifetimeOverflow(Duration),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Builds signed tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, settings: &TokenSettings) -> Result<AccessToken, TokenError>;
}
