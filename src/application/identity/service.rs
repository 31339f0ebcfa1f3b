//! Account registration, sign-in and activation
//!
//! Register, Authenticate and Activate. Every operation is total: collaborator
//! failures are caught here and turned into an [`ApiResponse`] envelope, so
//! HTTP handlers and GraphQL resolvers only serialize what they get back.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{
    AccessToken, ActivationRequest, CredentialStore, Credentials, DomainError, NewAccount,
    NotificationSender, SignInOutcome, TokenIssuer, TokenSettings,
};
use crate::infrastructure::crypto::confirmation::encode_code;
use crate::shared::{ApiResponse, Notice, NoticeCode};

pub const MSG_CREATED: &str = "Usuário criado com sucesso.";
pub const MSG_UNAUTHORIZED: &str = "Usuário não autorizado.";
pub const MSG_ACTIVATED: &str = "Usuário ativado com sucesso.";
pub const MSG_ACTIVATION_FAILED: &str = "Falha ao ativar usuário.";
pub const INVITE_SUBJECT: &str = "Link de ativação do usuário";

const SERVICE: &str = "AccountService";

/// Orchestrates registration, login and activation over the identity ports.
///
/// Collaborators are trait objects so the same service runs against SeaORM +
/// SMTP in production and the in-memory implementations in tests.
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn NotificationSender>,
    issuer: Arc<dyn TokenIssuer>,
    token_settings: TokenSettings,
}

fn record(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "account_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

fn server_error<T>(method: &'static str, e: &DomainError) -> ApiResponse<T> {
    error!(service = SERVICE, method, error = %e, "Operation failed");
    record(method, "error");
    ApiResponse::error(NoticeCode::ServerErrorInternalServerError, e.to_string())
}

impl AccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn NotificationSender>,
        issuer: Arc<dyn TokenIssuer>,
        token_settings: TokenSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            issuer,
            token_settings,
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Create the account, then e-mail it an activation link.
    ///
    /// The invite is awaited inline; if delivery fails the account stays
    /// created and the caller gets a server-error envelope.
    pub async fn register(&self, request: NewAccount) -> ApiResponse<AccessToken> {
        info!(service = SERVICE, method = "register", username = %request.username, "Called");

        let account = match self.store.create_account(request).await {
            Ok(account) => account,
            Err(DomainError::Rejected(errors)) => {
                warn!(
                    service = SERVICE,
                    method = "register",
                    errors = errors.len(),
                    "Registration rejected"
                );
                record("register", "rejected");
                return ApiResponse::failure(
                    errors
                        .into_iter()
                        .map(|e| Notice::new(NoticeCode::ErrorBadRequest, e.description))
                        .collect(),
                );
            }
            Err(e) => return server_error("register", &e),
        };

        let code = match self.store.generate_confirmation_code(&account).await {
            Ok(code) => code,
            Err(e) => return server_error("register", &e),
        };

        let delivered = self
            .notifier
            .send_invite(
                &[account.email.clone()],
                INVITE_SUBJECT,
                &account.id,
                &encode_code(&code),
            )
            .await;
        if let Err(e) = delivered {
            return server_error("register", &e);
        }

        info!(service = SERVICE, account_id = %account.id, "Account registered");
        record("register", "success");
        ApiResponse::success_with(Notice::new(NoticeCode::SuccessCreated, MSG_CREATED))
    }

    // ── Authentication ──────────────────────────────────────────

    /// Verify the password (lockout engaged) and issue an access token.
    pub async fn authenticate(&self, credentials: Credentials) -> ApiResponse<AccessToken> {
        info!(service = SERVICE, method = "authenticate", username = %credentials.username, "Called");

        let outcome = match self
            .store
            .verify_password(&credentials.username, &credentials.password, true)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return server_error("authenticate", &e),
        };

        if outcome != SignInOutcome::Succeeded {
            warn!(
                service = SERVICE,
                username = %credentials.username,
                outcome = ?outcome,
                "Authentication refused"
            );
            record("authenticate", "unauthorized");
            return ApiResponse::error(NoticeCode::ErrorUnauthorized, MSG_UNAUTHORIZED);
        }

        match self.issuer.issue(&self.token_settings) {
            Ok(token) => {
                record("authenticate", "success");
                ApiResponse::success(token)
            }
            Err(e) => server_error("authenticate", &DomainError::Token(e.to_string())),
        }
    }

    // ── Activation ──────────────────────────────────────────────

    /// Confirm the account's e-mail with a code from the invite.
    pub async fn activate(&self, request: ActivationRequest) -> ApiResponse<AccessToken> {
        info!(service = SERVICE, method = "activate", account_id = %request.account_id, "Called");

        let account = match self.store.find_by_id(&request.account_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!(service = SERVICE, account_id = %request.account_id, "Unknown account");
                record("activate", "rejected");
                return ApiResponse::error(NoticeCode::ErrorBadRequest, MSG_ACTIVATION_FAILED);
            }
            Err(e) => return server_error("activate", &e),
        };

        match self.store.confirm_email(&account, &request.code).await {
            Ok(()) => {
                info!(service = SERVICE, account_id = %account.id, "Account activated");
                record("activate", "success");
                ApiResponse::success_with(Notice::new(NoticeCode::SuccessOk, MSG_ACTIVATED))
            }
            Err(DomainError::Rejected(_)) => {
                warn!(service = SERVICE, account_id = %account.id, "Activation code refused");
                record("activate", "rejected");
                ApiResponse::error(NoticeCode::ErrorBadRequest, MSG_ACTIVATION_FAILED)
            }
            Err(e) => server_error("activate", &e),
        }
    }
}
