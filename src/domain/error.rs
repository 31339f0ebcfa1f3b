//! Domain errors

use thiserror::Error;

use super::account::IdentityError;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The credential store refused the request; one entry per violated rule.
    #[error("Rejected: {}", describe(.0))]
    Rejected(Vec<IdentityError>),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Token error: {0}")]
    Token(String),
}

fn describe(errors: &[IdentityError]) -> String {
    errors
        .iter()
        .map(|e| e.description.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail error: {0}")]
    Mail(String),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        match e {
            InfraError::Database(_) => DomainError::Storage(e.to_string()),
            InfraError::Http(_) => DomainError::Upstream(e.to_string()),
            InfraError::Mail(_) => DomainError::Notification(e.to_string()),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
