//! In-memory credential store for development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::account::{normalize_key, validate_profile};
use crate::domain::{
    Account, CredentialStore, DomainError, DomainResult, IdentityError, IdentitySettings,
    NewAccount, SignInOutcome,
};
use crate::infrastructure::crypto::confirmation::{generate_code, hash_code};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::shared::SharedClock;

struct StoredCode {
    account_id: String,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
}

/// [`CredentialStore`] backed by `DashMap`s
///
/// `usernames` and `emails` map normalized keys to account ids and play the
/// role of the unique indexes on the SQL tables.
pub struct InMemoryCredentialStore {
    accounts: DashMap<String, Account>,
    usernames: DashMap<String, String>,
    emails: DashMap<String, String>,
    codes: DashMap<String, StoredCode>,
    settings: IdentitySettings,
    clock: SharedClock,
}

impl InMemoryCredentialStore {
    pub fn new(settings: IdentitySettings, clock: SharedClock) -> Self {
        Self {
            accounts: DashMap::new(),
            usernames: DashMap::new(),
            emails: DashMap::new(),
            codes: DashMap::new(),
            settings,
            clock,
        }
    }

    fn id_by_username(&self, username: &str) -> Option<String> {
        self.usernames
            .get(&normalize_key(username))
            .map(|id| id.value().clone())
    }

    /// Claim both keys for `id`, or neither.
    fn reserve(&self, id: &str, dto: &NewAccount) -> DomainResult<()> {
        let username_key = normalize_key(&dto.username);
        match self.usernames.entry(username_key.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Rejected(vec![
                    IdentityError::duplicate_user_name(&dto.username),
                ]));
            }
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
            }
        }

        match self.emails.entry(normalize_key(&dto.email)) {
            Entry::Occupied(_) => {
                self.usernames.remove(&username_key);
                Err(DomainError::Rejected(vec![IdentityError::duplicate_email(
                    &dto.email,
                )]))
            }
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_account(&self, dto: NewAccount) -> DomainResult<Account> {
        let mut errors = validate_profile(&dto);
        if self.id_by_username(&dto.username).is_some() {
            errors.push(IdentityError::duplicate_user_name(&dto.username));
        }
        if self.emails.contains_key(&normalize_key(&dto.email)) {
            errors.push(IdentityError::duplicate_email(&dto.email));
        }
        errors.extend(self.settings.password.validate(&dto.password));
        if !errors.is_empty() {
            return Err(DomainError::Rejected(errors));
        }

        let password_hash = hash_password(&dto.password, self.settings.hash_cost)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))?;

        let id = uuid::Uuid::new_v4().to_string();
        self.reserve(&id, &dto)?;

        let now = self.clock.now();
        let account = Account {
            id,
            username: dto.username,
            email: dto.email,
            password_hash,
            email_confirmed: false,
            first_name: dto.first_name,
            last_name: dto.last_name,
            phone_number: dto.phone_number,
            access_failed_count: 0,
            lockout_end: None,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &str,
        lockout_on_failure: bool,
    ) -> DomainResult<SignInOutcome> {
        let Some(id) = self.id_by_username(username) else {
            return Ok(SignInOutcome::Failed);
        };
        let Some(mut account) = self.accounts.get_mut(&id) else {
            return Ok(SignInOutcome::Failed);
        };

        let now = self.clock.now();
        if account.is_locked_out(now) {
            return Ok(SignInOutcome::LockedOut);
        }

        let valid = verify_password(password, &account.password_hash)
            .map_err(|e| DomainError::Storage(format!("Failed to verify password: {}", e)))?;

        if valid {
            account.access_failed_count = 0;
            account.updated_at = now;
            if self.settings.require_confirmed_account && !account.email_confirmed {
                return Ok(SignInOutcome::NotAllowed);
            }
            return Ok(SignInOutcome::Succeeded);
        }

        if lockout_on_failure {
            let (count, lockout_end) = self.settings.lockout.register_failure(
                account.access_failed_count,
                account.lockout_end,
                now,
            );
            account.access_failed_count = count;
            account.lockout_end = lockout_end;
            account.updated_at = now;
            if account.is_locked_out(now) {
                return Ok(SignInOutcome::LockedOut);
            }
        }

        Ok(SignInOutcome::Failed)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        Ok(self.accounts.get(id).map(|a| a.clone()))
    }

    async fn generate_confirmation_code(&self, account: &Account) -> DomainResult<String> {
        let code = generate_code();
        self.codes.insert(
            hash_code(&code),
            StoredCode {
                account_id: account.id.clone(),
                expires_at: self.settings.code_expiry(self.clock.now()),
                consumed_at: None,
            },
        );
        Ok(code)
    }

    async fn confirm_email(&self, account: &Account, code: &str) -> DomainResult<()> {
        let now = self.clock.now();
        {
            let Some(mut stored) = self.codes.get_mut(&hash_code(code)) else {
                return Err(DomainError::Rejected(vec![IdentityError::invalid_token()]));
            };
            let usable = stored.account_id == account.id
                && stored.consumed_at.is_none()
                && stored.expires_at > now;
            if !usable {
                return Err(DomainError::Rejected(vec![IdentityError::invalid_token()]));
            }
            stored.consumed_at = Some(now);
        }

        let Some(mut stored_account) = self.accounts.get_mut(&account.id) else {
            return Err(DomainError::Rejected(vec![IdentityError::invalid_token()]));
        };
        stored_account.email_confirmed = true;
        stored_account.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::IdentityErrorCode;
    use crate::shared::FixedClock;

    fn settings() -> IdentitySettings {
        IdentitySettings {
            hash_cost: 4,
            ..IdentitySettings::default()
        }
    }

    fn new_account(username: &str, email: &str, password: &str) -> NewAccount {
        NewAccount {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: Some("Ana".into()),
            last_name: None,
            phone_number: None,
        }
    }

    fn store_at(clock: Arc<FixedClock>) -> InMemoryCredentialStore {
        InMemoryCredentialStore::new(settings(), clock)
    }

    fn start() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn rejected_codes(result: DomainResult<Account>) -> Vec<IdentityErrorCode> {
        match result {
            Err(DomainError::Rejected(errors)) => errors.into_iter().map(|e| e.code).collect(),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_stores_hash_and_starts_unconfirmed() {
        let store = store_at(start());
        let account = store
            .create_account(new_account("ana", "ana@x.com", "Abcdef1!"))
            .await
            .unwrap();

        assert!(!account.email_confirmed);
        assert_ne!(account.password_hash, "Abcdef1!");
        assert_eq!(
            store.find_by_id(&account.id).await.unwrap(),
            Some(account.clone())
        );
    }

    #[tokio::test]
    async fn duplicates_and_weak_password_are_collected() {
        let store = store_at(start());
        store
            .create_account(new_account("ana", "ana@x.com", "Abcdef1!"))
            .await
            .unwrap();

        let codes = rejected_codes(
            store
                .create_account(new_account("ANA", "Ana@X.com", "short"))
                .await,
        );
        assert_eq!(
            codes,
            vec![
                IdentityErrorCode::DuplicateUserName,
                IdentityErrorCode::DuplicateEmail,
                IdentityErrorCode::PasswordTooShort,
                IdentityErrorCode::PasswordRequiresDigit,
                IdentityErrorCode::PasswordRequiresUpper,
            ]
        );
    }

    #[tokio::test]
    async fn lockout_after_repeated_failures() {
        let clock = start();
        let store = store_at(clock.clone());
        store
            .create_account(new_account("ana", "ana@x.com", "Abcdef1!"))
            .await
            .unwrap();

        for _ in 0..4 {
            assert_eq!(
                store.verify_password("ana", "wrong", true).await.unwrap(),
                SignInOutcome::Failed
            );
        }
        assert_eq!(
            store.verify_password("ana", "wrong", true).await.unwrap(),
            SignInOutcome::LockedOut
        );
        // correct password is refused while locked
        assert_eq!(
            store.verify_password("ana", "Abcdef1!", true).await.unwrap(),
            SignInOutcome::LockedOut
        );

        clock.advance(Duration::minutes(6));
        assert_eq!(
            store.verify_password("ana", "Abcdef1!", true).await.unwrap(),
            SignInOutcome::Succeeded
        );
    }

    #[tokio::test]
    async fn unknown_user_fails() {
        let store = store_at(start());
        assert_eq!(
            store.verify_password("ghost", "Abcdef1!", true).await.unwrap(),
            SignInOutcome::Failed
        );
    }

    #[tokio::test]
    async fn unconfirmed_account_is_not_allowed_when_required() {
        let store = InMemoryCredentialStore::new(
            IdentitySettings {
                require_confirmed_account: true,
                ..settings()
            },
            start(),
        );
        store
            .create_account(new_account("ana", "ana@x.com", "Abcdef1!"))
            .await
            .unwrap();

        assert_eq!(
            store.verify_password("ana", "Abcdef1!", true).await.unwrap(),
            SignInOutcome::NotAllowed
        );
    }

    #[tokio::test]
    async fn confirmation_code_is_single_use() {
        let store = store_at(start());
        let account = store
            .create_account(new_account("ana", "ana@x.com", "Abcdef1!"))
            .await
            .unwrap();
        let code = store.generate_confirmation_code(&account).await.unwrap();

        store.confirm_email(&account, &code).await.unwrap();
        let confirmed = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(confirmed.email_confirmed);

        assert!(matches!(
            store.confirm_email(&account, &code).await,
            Err(DomainError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn expired_or_foreign_code_is_rejected() {
        let clock = start();
        let store = store_at(clock.clone());
        let ana = store
            .create_account(new_account("ana", "ana@x.com", "Abcdef1!"))
            .await
            .unwrap();
        let bia = store
            .create_account(new_account("bia", "bia@x.com", "Abcdef1!"))
            .await
            .unwrap();

        let code = store.generate_confirmation_code(&ana).await.unwrap();
        assert!(store.confirm_email(&bia, &code).await.is_err());

        clock.advance(Duration::hours(25));
        assert!(store.confirm_email(&ana, &code).await.is_err());
        assert!(!store.find_by_id(&ana.id).await.unwrap().unwrap().email_confirmed);
    }

    #[tokio::test]
    async fn keys_match_across_case_and_padding() {
        let store = store_at(start());
        store
            .create_account(new_account("ana", "ana@ação.com.br", "Abcdef1!"))
            .await
            .unwrap();

        let codes = rejected_codes(
            store
                .create_account(new_account("bia", "ANA@AÇÃO.COM.BR", "Abcdef1!"))
                .await,
        );
        assert_eq!(codes, vec![IdentityErrorCode::DuplicateEmail]);

        let codes = rejected_codes(
            store
                .create_account(new_account(" ANA ", "bia@x.com", "Abcdef1!"))
                .await,
        );
        assert!(codes.contains(&IdentityErrorCode::DuplicateUserName));

        assert_eq!(
            store.verify_password(" Ana ", "Abcdef1!", true).await.unwrap(),
            SignInOutcome::Succeeded
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_registrations_yield_one_account() {
        let store = Arc::new(store_at(start()));

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create_account(new_account("ana", &format!("ana{}@x.com", i), "Abcdef1!"))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::Rejected(errors)) => {
                    assert_eq!(errors[0].code, IdentityErrorCode::DuplicateUserName);
                }
                Err(other) => panic!("expected rejection, got {:?}", other),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.accounts.len(), 1);
        assert_eq!(store.emails.len(), 1);
    }
}
