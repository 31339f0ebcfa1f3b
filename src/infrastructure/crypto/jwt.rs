//! JWT Token handling

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{AccessToken, TokenError, TokenIssuer, TokenSettings};
use crate::shared::SharedClock;

/// Registered claim names a caller may not override.
const RESERVED_CLAIMS: &[&str] = &["sub", "iss", "aud", "iat", "nbf", "exp"];

/// Parse an HMAC algorithm name (`HS256`, `HS384`, `HS512`).
pub fn parse_algorithm(name: &str) -> Result<Algorithm, TokenError> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(TokenError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Minimum secret size in bytes: the HMAC output length.
pub fn min_key_len(algorithm: Algorithm) -> usize {
    match algorithm {
        Algorithm::HS384 => 48,
        Algorithm::HS512 => 64,
        _ => 32,
    }
}

fn check_key(secret: &[u8], algorithm: Algorithm) -> Result<(), TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptyKey);
    }
    let min = min_key_len(algorithm);
    if secret.len() < min {
        return Err(TokenError::KeyTooShort {
            min,
            actual: secret.len(),
        });
    }
    Ok(())
}

/// Server-held HMAC secret, checked for length on construction
#[derive(Clone)]
pub struct SigningKey {
    secret: Vec<u8>,
    algorithm: Algorithm,
}

impl SigningKey {
    pub fn new(secret: impl AsRef<[u8]>, algorithm: &str) -> Result<Self, TokenError> {
        let algorithm = parse_algorithm(algorithm)?;
        let secret = secret.as_ref().to_vec();
        check_key(&secret, algorithm)?;
        Ok(Self { secret, algorithm })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (service principal)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Application claims, e.g. `Admin = "1"`
    #[serde(flatten)]
    pub claims: BTreeMap<String, String>,
}

impl TokenClaims {
    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).map(String::as_str)
    }
}

/// Build and sign a token. Pure apart from `now`, which the caller supplies.
pub fn issue_token(
    secret: &[u8],
    algorithm: Algorithm,
    settings: &TokenSettings,
    now: DateTime<Utc>,
) -> Result<AccessToken, TokenError> {
    check_key(secret, algorithm)?;

    if let Some(name) = settings
        .claims
        .keys()
        .find(|k| RESERVED_CLAIMS.contains(&k.as_str()))
    {
        return Err(TokenError::ReservedClaim(name.clone()));
    }

    let expires_at = now
        .checked_add_signed(settings.expires_in)
        .ok_or(TokenError::LifetimeOverflow(settings.expires_in))?;
    let claims = TokenClaims {
        sub: settings.subject.clone(),
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
        exp: expires_at.timestamp(),
        claims: settings.claims.clone(),
    };

    let token = encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(secret),
    )?;

    Ok(AccessToken {
        token,
        token_type: "Bearer".to_string(),
        expires_at,
    })
}

/// Verify signature, issuer, audience and lifetime, and decode the claims.
pub fn verify_token(
    token: &str,
    key: &SigningKey,
    issuer: &str,
    audience: &str,
) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(key.algorithm());
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    validation.validate_nbf = true;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(key.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// [`TokenIssuer`] signing with a configured HMAC key
pub struct JwtTokenIssuer {
    key: SigningKey,
    clock: SharedClock,
}

impl JwtTokenIssuer {
    pub fn new(key: SigningKey, clock: SharedClock) -> Self {
        Self { key, clock }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, settings: &TokenSettings) -> Result<AccessToken, TokenError> {
        issue_token(
            self.key.as_bytes(),
            self.key.algorithm(),
            settings,
            self.clock.now(),
        )
    }
}
