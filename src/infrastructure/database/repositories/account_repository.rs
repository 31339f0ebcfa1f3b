use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};

use crate::domain::account::{normalize_key, validate_profile};
use crate::domain::{
    Account, CredentialStore, DomainError, DomainResult, IdentityError, IdentitySettings,
    InfraError, NewAccount, SignInOutcome,
};
use crate::infrastructure::crypto::confirmation::{generate_code, hash_code};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::infrastructure::database::entities::{account, confirmation_code};
use crate::shared::SharedClock;

/// SeaORM-backed [`CredentialStore`]
pub struct SeaOrmCredentialStore {
    db: DatabaseConnection,
    settings: IdentitySettings,
    clock: SharedClock,
}

impl SeaOrmCredentialStore {
    pub fn new(db: DatabaseConnection, settings: IdentitySettings, clock: SharedClock) -> Self {
        Self {
            db,
            settings,
            clock,
        }
    }

    async fn find_by_normalized_username(
        &self,
        username: &str,
    ) -> DomainResult<Option<account::Model>> {
        account::Entity::find()
            .filter(account::Column::NormalizedUsername.eq(normalize_key(username)))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Username and e-mail collisions with existing rows, in that order.
    async fn duplicates(&self, dto: &NewAccount) -> DomainResult<Vec<IdentityError>> {
        let mut errors = Vec::new();
        let username_taken = account::Entity::find()
            .filter(account::Column::NormalizedUsername.eq(normalize_key(&dto.username)))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_some();
        if username_taken {
            errors.push(IdentityError::duplicate_user_name(&dto.username));
        }
        let email_taken = account::Entity::find()
            .filter(account::Column::NormalizedEmail.eq(normalize_key(&dto.email)))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_some();
        if email_taken {
            errors.push(IdentityError::duplicate_email(&dto.email));
        }
        Ok(errors)
    }

    /// Count one failed attempt in SQL and lock the account once the
    /// threshold is reached. Returns whether the account is now locked.
    async fn record_failure(
        &self,
        id: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> DomainResult<bool> {
        let txn = self.db.begin().await.map_err(db_err)?;

        account::Entity::update_many()
            .col_expr(
                account::Column::AccessFailedCount,
                Expr::col(account::Column::AccessFailedCount).add(1),
            )
            .col_expr(account::Column::UpdatedAt, Expr::value(now))
            .filter(account::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let count = account::Entity::find_by_id(id.to_string())
            .one(&txn)
            .await
            .map_err(db_err)?
            .map(|m| m.access_failed_count)
            .unwrap_or_default();

        let lockout = &self.settings.lockout;
        let locked = lockout.is_exceeded(count);
        if locked {
            account::Entity::update_many()
                .col_expr(account::Column::AccessFailedCount, Expr::value(0))
                .col_expr(
                    account::Column::LockoutEnd,
                    Expr::value(Some(lockout.lockout_end(now))),
                )
                .filter(account::Column::Id.eq(id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(locked)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(model: account::Model) -> Account {
    Account {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        email_confirmed: model.email_confirmed,
        first_name: model.first_name,
        last_name: model.last_name,
        phone_number: model.phone_number,
        access_failed_count: model.access_failed_count,
        lockout_end: model.lockout_end,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

// ── Store implementation ────────────────────────────────────────

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn create_account(&self, dto: NewAccount) -> DomainResult<Account> {
        let normalized_username = normalize_key(&dto.username);
        let normalized_email = normalize_key(&dto.email);

        let mut errors = validate_profile(&dto);
        errors.extend(self.duplicates(&dto).await?);
        errors.extend(self.settings.password.validate(&dto.password));
        if !errors.is_empty() {
            return Err(DomainError::Rejected(errors));
        }

        let password_hash = hash_password(&dto.password, self.settings.hash_cost)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))?;

        let now = self.clock.now();
        let new_account = account::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(dto.username.clone()),
            normalized_username: Set(normalized_username),
            email: Set(dto.email.clone()),
            normalized_email: Set(normalized_email),
            password_hash: Set(password_hash),
            email_confirmed: Set(false),
            first_name: Set(dto.first_name.clone()),
            last_name: Set(dto.last_name.clone()),
            phone_number: Set(dto.phone_number.clone()),
            access_failed_count: Set(0),
            lockout_end: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // A concurrent insert can still win the race between the checks and here.
        let model = match new_account.insert(&self.db).await {
            Ok(model) => model,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let errors = self.duplicates(&dto).await?;
                if errors.is_empty() {
                    return Err(db_err(e));
                }
                return Err(DomainError::Rejected(errors));
            }
            Err(e) => return Err(db_err(e)),
        };

        Ok(model_to_domain(model))
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &str,
        lockout_on_failure: bool,
    ) -> DomainResult<SignInOutcome> {
        let Some(model) = self.find_by_normalized_username(username).await? else {
            return Ok(SignInOutcome::Failed);
        };

        let now = self.clock.now();
        if model.lockout_end.is_some_and(|end| end > now) {
            return Ok(SignInOutcome::LockedOut);
        }

        let valid = verify_password(password, &model.password_hash)
            .map_err(|e| DomainError::Storage(format!("Failed to verify password: {}", e)))?;

        if valid {
            if model.access_failed_count != 0 {
                account::Entity::update_many()
                    .col_expr(account::Column::AccessFailedCount, Expr::value(0))
                    .col_expr(account::Column::UpdatedAt, Expr::value(now))
                    .filter(account::Column::Id.eq(model.id.as_str()))
                    .exec(&self.db)
                    .await
                    .map_err(db_err)?;
            }
            if self.settings.require_confirmed_account && !model.email_confirmed {
                return Ok(SignInOutcome::NotAllowed);
            }
            return Ok(SignInOutcome::Succeeded);
        }

        if !lockout_on_failure {
            return Ok(SignInOutcome::Failed);
        }

        if self.record_failure(&model.id, now).await? {
            Ok(SignInOutcome::LockedOut)
        } else {
            Ok(SignInOutcome::Failed)
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        let model = account::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn generate_confirmation_code(&self, account: &Account) -> DomainResult<String> {
        let code = generate_code();
        let now = self.clock.now();

        let row = confirmation_code::ActiveModel {
            code_hash: Set(hash_code(&code)),
            account_id: Set(account.id.clone()),
            expires_at: Set(self.settings.code_expiry(now)),
            consumed_at: Set(None),
            created_at: Set(now),
        };
        row.insert(&self.db).await.map_err(db_err)?;

        Ok(code)
    }

    async fn confirm_email(&self, account: &Account, code: &str) -> DomainResult<()> {
        let now = self.clock.now();
        let code_hash = hash_code(code);
        let rejected = || DomainError::Rejected(vec![IdentityError::invalid_token()]);

        let Some(stored) = confirmation_code::Entity::find_by_id(code_hash.clone())
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Err(rejected());
        };
        if stored.account_id != account.id
            || stored.consumed_at.is_some()
            || stored.expires_at <= now
        {
            return Err(rejected());
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        // Only one caller can flip consumed_at from NULL.
        let consumed = confirmation_code::Entity::update_many()
            .col_expr(confirmation_code::Column::ConsumedAt, Expr::value(now))
            .filter(confirmation_code::Column::CodeHash.eq(code_hash))
            .filter(confirmation_code::Column::ConsumedAt.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if consumed.rows_affected != 1 {
            return Err(rejected());
        }

        account::Entity::update_many()
            .col_expr(account::Column::EmailConfirmed, Expr::value(true))
            .col_expr(account::Column::UpdatedAt, Expr::value(now))
            .filter(account::Column::Id.eq(account.id.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::domain::{IdentityErrorCode, LockoutPolicy};
    use crate::infrastructure::database::migrator::Migrator;
    use crate::shared::FixedClock;

    async fn setup() -> (SeaOrmCredentialStore, Arc<FixedClock>) {
        setup_with(IdentitySettings {
            hash_cost: 4,
            ..IdentitySettings::default()
        })
        .await
    }

    async fn setup_with(settings: IdentitySettings) -> (SeaOrmCredentialStore, Arc<FixedClock>) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        (SeaOrmCredentialStore::new(db, settings, clock.clone()), clock)
    }

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.into(),
            email: email.into(),
            password: "Abcdef1!".into(),
            first_name: Some("Ana".into()),
            last_name: Some("Silva".into()),
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let (store, _) = setup().await;
        let account = store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();

        let found = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(found.username, "ana");
        assert_eq!(found.last_name.as_deref(), Some("Silva"));
        assert!(!found.email_confirmed);
        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicates_are_case_insensitive() {
        let (store, _) = setup().await;
        store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();

        match store.create_account(new_account("Ana", "ANA@x.com")).await {
            Err(DomainError::Rejected(errors)) => {
                let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
                assert_eq!(
                    codes,
                    vec![
                        IdentityErrorCode::DuplicateUserName,
                        IdentityErrorCode::DuplicateEmail
                    ]
                );
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failures_lock_the_account_until_expiry() {
        let (store, clock) = setup().await;
        store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();

        for _ in 0..4 {
            assert_eq!(
                store.verify_password("ana", "nope", true).await.unwrap(),
                SignInOutcome::Failed
            );
        }
        assert_eq!(
            store.verify_password("ANA", "nope", true).await.unwrap(),
            SignInOutcome::LockedOut
        );
        assert_eq!(
            store.verify_password("ana", "Abcdef1!", true).await.unwrap(),
            SignInOutcome::LockedOut
        );

        clock.advance(Duration::minutes(5) + Duration::seconds(1));
        assert_eq!(
            store.verify_password("ana", "Abcdef1!", true).await.unwrap(),
            SignInOutcome::Succeeded
        );
    }

    #[tokio::test]
    async fn failures_without_lockout_do_not_count() {
        let (store, _) = setup().await;
        let account = store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();

        for _ in 0..6 {
            store.verify_password("ana", "nope", false).await.unwrap();
        }
        let stored = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.access_failed_count, 0);
        assert!(stored.lockout_end.is_none());
    }

    #[tokio::test]
    async fn confirmation_round_trip() {
        let (store, clock) = setup().await;
        let account = store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();
        let expired = store.generate_confirmation_code(&account).await.unwrap();
        clock.advance(Duration::hours(25));
        let code = store.generate_confirmation_code(&account).await.unwrap();

        assert!(store.confirm_email(&account, &expired).await.is_err());
        assert!(store.confirm_email(&account, "forged").await.is_err());

        store.confirm_email(&account, &code).await.unwrap();
        assert!(store.find_by_id(&account.id).await.unwrap().unwrap().email_confirmed);

        // single use
        assert!(matches!(
            store.confirm_email(&account, &code).await,
            Err(DomainError::Rejected(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failures_are_all_counted() {
        let (store, _) = setup_with(IdentitySettings {
            hash_cost: 4,
            lockout: LockoutPolicy {
                max_failed_attempts: 1000,
                ..LockoutPolicy::default()
            },
            ..IdentitySettings::default()
        })
        .await;
        let account = store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();

        let store = Arc::new(store);
        let attempts: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.verify_password("ana", "nope", true).await })
            })
            .collect();
        for attempt in attempts {
            assert_eq!(attempt.await.unwrap().unwrap(), SignInOutcome::Failed);
        }

        let stored = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.access_failed_count, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failures_lock_exactly_once() {
        let (store, _) = setup().await;
        let account = store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();

        let store = Arc::new(store);
        let attempts: Vec<_> = (0..5)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.verify_password("ana", "nope", true).await })
            })
            .collect();
        let mut locked = 0;
        for attempt in attempts {
            if attempt.await.unwrap().unwrap() == SignInOutcome::LockedOut {
                locked += 1;
            }
        }

        assert_eq!(locked, 1);
        let stored = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.access_failed_count, 0);
        assert!(stored.lockout_end.is_some());
    }

    #[tokio::test]
    async fn unique_index_violation_is_classified() {
        let (store, _) = setup().await;
        store
            .create_account(new_account("ana", "ana@x.com"))
            .await
            .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clash = account::ActiveModel {
            id: Set("clash".into()),
            username: Set("bia".into()),
            normalized_username: Set(normalize_key("bia")),
            email: Set(" Ana@X.com".into()),
            normalized_email: Set(normalize_key(" Ana@X.com")),
            password_hash: Set("x".into()),
            email_confirmed: Set(false),
            first_name: Set(None),
            last_name: Set(None),
            phone_number: Set(None),
            access_failed_count: Set(0),
            lockout_end: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let err = clash.insert(&store.db).await.unwrap_err();
        assert!(matches!(
            err.sql_err(),
            Some(SqlErr::UniqueConstraintViolation(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_registrations_yield_one_account() {
        let (store, _) = setup().await;
        let store = Arc::new(store);

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create_account(new_account("ana", "ana@x.com"))
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
    }
}
