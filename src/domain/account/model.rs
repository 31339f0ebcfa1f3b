use chrono::{DateTime, Utc};

/// Registered identity and credential record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub access_failed_count: i32,
    pub lockout_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_end.is_some_and(|end| end > now)
    }
}

/// Registration input; the password is plaintext and only lives for the request.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Login input, used once and discarded
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Account id + e-mail confirmation code
#[derive(Clone, Debug)]
pub struct ActivationRequest {
    pub account_id: String,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityErrorCode {
    InvalidUserName,
    InvalidEmail,
    DuplicateUserName,
    DuplicateEmail,
    PasswordTooShort,
    PasswordRequiresDigit,
    PasswordRequiresUpper,
    PasswordRequiresLower,
    PasswordRequiresNonAlphanumeric,
    InvalidToken,
}

/// One rule the credential store refused a request for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    pub code: IdentityErrorCode,
    pub description: String,
}

impl IdentityError {
    pub fn new(code: IdentityErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    pub fn invalid_user_name(username: &str) -> Self {
        Self::new(
            IdentityErrorCode::InvalidUserName,
            format!("Nome de usuário '{username}' é inválido, pode conter apenas letras ou dígitos."),
        )
    }

    pub fn invalid_email(email: &str) -> Self {
        Self::new(
            IdentityErrorCode::InvalidEmail,
            format!("E-mail '{email}' é inválido."),
        )
    }

    pub fn duplicate_user_name(username: &str) -> Self {
        Self::new(
            IdentityErrorCode::DuplicateUserName,
            format!("Nome de usuário '{username}' já está em uso."),
        )
    }

    pub fn duplicate_email(email: &str) -> Self {
        Self::new(
            IdentityErrorCode::DuplicateEmail,
            format!("E-mail '{email}' já está em uso."),
        )
    }

    pub fn invalid_token() -> Self {
        Self::new(IdentityErrorCode::InvalidToken, "Token inválido.")
    }
}

/// Result of a password verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Succeeded,
    Failed,
    LockedOut,
    /// Password matched but the account may not sign in yet (unconfirmed e-mail).
    NotAllowed,
}
