//! SMTP delivery through `lettre`

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::activation_link;
use crate::domain::{DomainResult, InfraError, NotificationSender};

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub starttls: bool,
    pub from: String,
    pub activation_url: String,
}

pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    activation_url: String,
}

fn mail_err(e: impl std::fmt::Display) -> InfraError {
    InfraError::Mail(e.to_string())
}

impl SmtpNotificationSender {
    pub fn new(settings: &SmtpSettings) -> Result<Self, InfraError> {
        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(mail_err)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };
        let mut builder = builder.port(settings.port);
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = settings.from.parse::<Mailbox>().map_err(mail_err)?;
        info!(host = %settings.host, port = settings.port, "SMTP sender configured");

        Ok(Self {
            transport: builder.build(),
            from,
            activation_url: settings.activation_url.clone(),
        })
    }

    fn render(&self, link: &str) -> String {
        format!(
            "<p>Olá!</p>\
             <p>Para ativar sua conta, <a href=\"{link}\">clique aqui</a>.</p>\
             <p>Se você não solicitou este cadastro, ignore esta mensagem.</p>"
        )
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_invite(
        &self,
        recipients: &[String],
        subject: &str,
        account_id: &str,
        code: &str,
    ) -> DomainResult<()> {
        let link = activation_link(&self.activation_url, account_id, code);
        let body = self.render(&link);

        for recipient in recipients {
            let to = recipient.parse::<Mailbox>().map_err(mail_err)?;
            let message = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(subject)
                .header(ContentType::TEXT_HTML)
                .body(body.clone())
                .map_err(mail_err)?;

            self.transport.send(message).await.map_err(mail_err)?;
            debug!(recipient = %recipient, account_id, "Activation e-mail sent");
        }

        Ok(())
    }
}
