use async_trait::async_trait;

use super::{Account, NewAccount, SignInOutcome};
use crate::domain::DomainResult;

/// Persistence and verification of accounts.
///
/// Validation failures come back as `DomainError::Rejected`; any other
/// error means the store itself failed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_account(&self, account: NewAccount) -> DomainResult<Account>;

    async fn verify_password(
        &self,
        username: &str,
        password: &str,
        lockout_on_failure: bool,
    ) -> DomainResult<SignInOutcome>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>>;

    /// Issue a single-use, time-limited code proving control of the e-mail.
    async fn generate_confirmation_code(&self, account: &Account) -> DomainResult<String>;

    /// Consume `code` and mark the e-mail confirmed.
    async fn confirm_email(&self, account: &Account, code: &str) -> DomainResult<()>;
}
