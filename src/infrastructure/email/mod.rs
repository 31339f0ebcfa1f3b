//! Outbound e-mail

mod logging;
mod memory;
mod smtp;

pub use logging::LoggingNotificationSender;
pub use memory::{InMemoryNotificationSender, SentInvite};
pub use smtp::{SmtpNotificationSender, SmtpSettings};

/// `{base}?accountId={id}&code={code}`; `code` must already be URL-encoded.
pub fn activation_link(base: &str, account_id: &str, code: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}accountId={account_id}&code={code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_appends_query() {
        assert_eq!(
            activation_link("https://app.local/activate", "42", "a%2Bb"),
            "https://app.local/activate?accountId=42&code=a%2Bb"
        );
        assert_eq!(
            activation_link("https://app.local/activate?lang=pt", "42", "c"),
            "https://app.local/activate?lang=pt&accountId=42&code=c"
        );
    }
}
