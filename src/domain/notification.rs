//! Outbound notifications

use async_trait::async_trait;

use super::DomainResult;

/// Delivers account e-mails.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send the activation invite; `code` is already URL-encoded.
    async fn send_invite(
        &self,
        recipients: &[String],
        subject: &str,
        account_id: &str,
        code: &str,
    ) -> DomainResult<()>;
}
