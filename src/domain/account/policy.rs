//! Identity rules shared by every credential store implementation
//!
//! Password complexity, username/e-mail shape and lockout arithmetic live
//! here so the SeaORM and in-memory stores cannot drift apart.

use chrono::{DateTime, Duration, Utc};
use validator::ValidateEmail;

use super::model::{IdentityError, IdentityErrorCode, NewAccount};

const ALLOWED_USERNAME_SYMBOLS: &[char] = &['-', '.', '_', '@', '+'];

/// Lookup key for usernames and e-mails; every store compares on this.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}

/// `now + by`, saturating at the latest representable instant.
pub fn saturating_after(now: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 8,
            require_digit: true,
            require_uppercase: true,
            require_lowercase: false,
            require_non_alphanumeric: false,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> Vec<IdentityError> {
        let mut errors = Vec::new();

        if password.chars().count() < self.required_length {
            errors.push(IdentityError::new(
                IdentityErrorCode::PasswordTooShort,
                format!(
                    "As senhas devem conter pelo menos {} caracteres.",
                    self.required_length
                ),
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_alphanumeric()) {
            errors.push(IdentityError::new(
                IdentityErrorCode::PasswordRequiresNonAlphanumeric,
                "As senhas devem conter pelo menos um caractere não alfanumérico.",
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(IdentityError::new(
                IdentityErrorCode::PasswordRequiresDigit,
                "As senhas devem conter pelo menos um dígito ('0'-'9').",
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            errors.push(IdentityError::new(
                IdentityErrorCode::PasswordRequiresLower,
                "As senhas devem conter pelo menos uma letra minúscula ('a'-'z').",
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            errors.push(IdentityError::new(
                IdentityErrorCode::PasswordRequiresUpper,
                "As senhas devem conter pelo menos uma letra maiúscula ('A'-'Z').",
            ));
        }

        errors
    }
}

/// Username and e-mail shape checks (uniqueness is the store's job).
pub fn validate_profile(account: &NewAccount) -> Vec<IdentityError> {
    let mut errors = Vec::new();

    let username_ok = !account.username.trim().is_empty()
        && account
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_USERNAME_SYMBOLS.contains(&c));
    if !username_ok {
        errors.push(IdentityError::invalid_user_name(&account.username));
    }

    if account.email.trim().is_empty() || !account.email.validate_email() {
        errors.push(IdentityError::invalid_email(&account.email));
    }

    errors
}

#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    pub max_failed_attempts: i32,
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            duration: Duration::minutes(5),
        }
    }
}

impl LockoutPolicy {
    pub fn is_exceeded(&self, failed_count: i32) -> bool {
        failed_count >= self.max_failed_attempts
    }

    pub fn lockout_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        saturating_after(now, self.duration)
    }

    /// New `(access_failed_count, lockout_end)` after a failed password check.
    pub fn register_failure(
        &self,
        failed_count: i32,
        lockout_end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> (i32, Option<DateTime<Utc>>) {
        let count = failed_count.saturating_add(1);
        if self.is_exceeded(count) {
            (0, Some(self.lockout_end(now)))
        } else {
            (count, lockout_end)
        }
    }
}

/// Credential store configuration
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub password: PasswordPolicy,
    pub lockout: LockoutPolicy,
    /// Refuse sign-in (as `NotAllowed`) until the e-mail is confirmed.
    pub require_confirmed_account: bool,
    pub confirmation_code_lifetime: Duration,
    pub hash_cost: u32,
}

impl IdentitySettings {
    pub fn code_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        saturating_after(now, self.confirmation_code_lifetime)
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            password: PasswordPolicy::default(),
            lockout: LockoutPolicy::default(),
            require_confirmed_account: false,
            confirmation_code_lifetime: Duration::hours(24),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.into(),
            email: email.into(),
            password: "Abcdef1!".into(),
            first_name: None,
            last_name: None,
            phone_number: None,
        }
    }

    #[test]
    fn strong_password_passes_default_policy() {
        assert!(PasswordPolicy::default().validate("Abcdef1!").is_empty());
    }

    #[test]
    fn weak_password_reports_every_rule() {
        let codes: Vec<_> = PasswordPolicy::default()
            .validate("abc")
            .into_iter()
            .map(|e| e.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                IdentityErrorCode::PasswordTooShort,
                IdentityErrorCode::PasswordRequiresDigit,
                IdentityErrorCode::PasswordRequiresUpper,
            ]
        );
    }

    #[test]
    fn optional_rules_are_off_by_default() {
        let strict = PasswordPolicy {
            require_lowercase: true,
            require_non_alphanumeric: true,
            ..PasswordPolicy::default()
        };
        assert!(PasswordPolicy::default().validate("ABCDEFG1").is_empty());
        assert_eq!(strict.validate("ABCDEFG1").len(), 2);
    }

    #[test]
    fn profile_rejects_blank_username_and_bad_email() {
        let errors = validate_profile(&new_account(" ", "not-an-email"));
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![IdentityErrorCode::InvalidUserName, IdentityErrorCode::InvalidEmail]
        );
        assert!(validate_profile(&new_account("ana.silva", "ana@x.com")).is_empty());
    }

    #[test]
    fn lockout_engages_on_threshold() {
        let policy = LockoutPolicy::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(policy.register_failure(0, None, now), (1, None));
        assert_eq!(
            policy.register_failure(4, None, now),
            (0, Some(now + Duration::minutes(5)))
        );
    }

    #[test]
    fn huge_durations_saturate() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let policy = LockoutPolicy {
            max_failed_attempts: 1,
            duration: Duration::MAX,
        };
        assert_eq!(
            policy.register_failure(0, None, now),
            (0, Some(DateTime::<Utc>::MAX_UTC))
        );

        let settings = IdentitySettings {
            confirmation_code_lifetime: Duration::MAX,
            ..IdentitySettings::default()
        };
        assert_eq!(settings.code_expiry(now), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn keys_ignore_case_and_surrounding_space() {
        assert_eq!(normalize_key(" Ana@X.com "), "ANA@X.COM");
        assert_eq!(normalize_key("joão"), normalize_key("JOÃO"));
    }
}
