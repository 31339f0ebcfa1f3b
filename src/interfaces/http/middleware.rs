//! Bearer authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::TokenError;
use crate::infrastructure::crypto::{verify_token, SigningKey, TokenClaims};
use crate::shared::{ApiResponse, NoticeCode};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// Key and expected issuer/audience for incoming tokens
#[derive(Clone, Debug)]
pub struct AuthState {
    pub key: SigningKey,
    pub issuer: String,
    pub audience: String,
}

/// Verified token principal, inserted into request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
    pub claims: TokenClaims,
}

impl AuthenticatedPrincipal {
    pub fn is_admin(&self) -> bool {
        self.claims.claim("Admin") == Some("1")
    }
}

/// Extract token from `Authorization: Bearer <token>` header
pub fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Require a valid bearer token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(
        token,
        &auth_state.key,
        &auth_state.issuer,
        &auth_state.audience,
    ) {
        Ok(claims) => {
            let principal = AuthenticatedPrincipal {
                subject: claims.sub.clone(),
                claims,
            };
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(TokenError::Jwt(e))
            if matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ) =>
        {
            auth_error_response(AuthError::ExpiredToken)
        }
        Err(e) => {
            debug!(error = %e, "Bearer token rejected");
            auth_error_response(AuthError::InvalidToken)
        }
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Token de autenticação ausente.",
        AuthError::InvalidToken => "Token de autenticação inválido.",
        AuthError::ExpiredToken => "Token de autenticação expirado.",
    };

    ApiResponse::<()>::error(NoticeCode::ErrorUnauthorized, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("bearer abc"), Some("abc"));
        assert_eq!(extract_token("Basic dXNlcg=="), None);
        assert_eq!(extract_token("Bearer "), None);
    }
}
