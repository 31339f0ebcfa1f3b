//! Sender used when SMTP delivery is disabled

use async_trait::async_trait;
use tracing::info;

use super::activation_link;
use crate::domain::{DomainResult, NotificationSender};

/// Writes the activation link to the log and keeps nothing.
pub struct LoggingNotificationSender {
    activation_url: String,
}

impl LoggingNotificationSender {
    pub fn new(activation_url: impl Into<String>) -> Self {
        Self {
            activation_url: activation_url.into(),
        }
    }
}

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send_invite(
        &self,
        recipients: &[String],
        subject: &str,
        account_id: &str,
        code: &str,
    ) -> DomainResult<()> {
        let link = activation_link(&self.activation_url, account_id, code);
        info!(recipients = ?recipients, subject, %link, "Activation e-mail (not delivered)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_invite_succeeds_without_retaining_it() {
        let sender = LoggingNotificationSender::new("https://tools.local/activate");
        for i in 0..1_000 {
            sender
                .send_invite(&["ana@x.com".into()], "Ativação", &i.to_string(), "abc")
                .await
                .unwrap();
        }
        assert_eq!(
            std::mem::size_of_val(&sender),
            std::mem::size_of::<String>()
        );
    }
}
