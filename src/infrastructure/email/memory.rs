//! Outbox sender for tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::activation_link;
use crate::domain::{DomainError, DomainResult, NotificationSender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentInvite {
    pub recipients: Vec<String>,
    pub subject: String,
    pub account_id: String,
    pub code: String,
    pub link: String,
}

/// Records invites instead of delivering them. The outbox is unbounded.
pub struct InMemoryNotificationSender {
    activation_url: String,
    outbox: Mutex<Vec<SentInvite>>,
    failure: Option<String>,
}

impl InMemoryNotificationSender {
    pub fn new(activation_url: impl Into<String>) -> Self {
        Self {
            activation_url: activation_url.into(),
            outbox: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Sender whose every delivery fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new("http://localhost/activate")
        }
    }

    pub fn sent(&self) -> Vec<SentInvite> {
        match self.outbox.lock() {
            Ok(outbox) => outbox.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl NotificationSender for InMemoryNotificationSender {
    async fn send_invite(
        &self,
        recipients: &[String],
        subject: &str,
        account_id: &str,
        code: &str,
    ) -> DomainResult<()> {
        if let Some(ref message) = self.failure {
            return Err(DomainError::Notification(message.clone()));
        }

        let link = activation_link(&self.activation_url, account_id, code);
        let invite = SentInvite {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            account_id: account_id.to_string(),
            code: code.to_string(),
            link,
        };
        match self.outbox.lock() {
            Ok(mut outbox) => outbox.push(invite),
            Err(poisoned) => poisoned.into_inner().push(invite),
        }
        Ok(())
    }
}
