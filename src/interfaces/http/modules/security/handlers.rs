//! Anonymous account endpoints

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use tracing::info;

use super::dto::{ActivateUserRequest, CreateRequest, LoginRequest};
use crate::application::AccountService;
use crate::domain::AccessToken;
use crate::interfaces::http::common::ValidatedJson;
use crate::shared::ApiResponse;

#[derive(Clone)]
pub struct SecurityState {
    pub accounts: Arc<AccountService>,
}

fn timed(operation: &'static str, started: Instant) {
    info!(
        controller = "SecurityController",
        operation,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
}

#[utoipa::path(
    post,
    path = "/security/create",
    tag = "Security",
    summary = "Criar usuário.",
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Account created, activation e-mail sent", body = ApiResponse<AccessToken>),
        (status = 400, description = "Rejected by the identity rules", body = ApiResponse<AccessToken>),
        (status = 500, description = "Unexpected failure", body = ApiResponse<AccessToken>)
    )
)]
pub async fn create(
    State(state): State<SecurityState>,
    ValidatedJson(request): ValidatedJson<CreateRequest>,
) -> ApiResponse<AccessToken> {
    let started = Instant::now();
    let response = state.accounts.register(request.into()).await;
    timed("Criar usuário", started);
    response
}

#[utoipa::path(
    post,
    path = "/security/authentication",
    tag = "Security",
    summary = "Autenticação do usuário",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = ApiResponse<AccessToken>),
        (status = 401, description = "Usuário não autorizado.", body = ApiResponse<AccessToken>),
        (status = 500, description = "Unexpected failure", body = ApiResponse<AccessToken>)
    )
)]
pub async fn authentication(
    State(state): State<SecurityState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResponse<AccessToken> {
    let started = Instant::now();
    let response = state.accounts.authenticate(request.into()).await;
    timed("Autenticar usuário", started);
    response
}

#[utoipa::path(
    post,
    path = "/security/activate",
    tag = "Security",
    summary = "Ativar usuário",
    request_body = ActivateUserRequest,
    responses(
        (status = 200, description = "Usuário ativado com sucesso.", body = ApiResponse<AccessToken>),
        (status = 400, description = "Falha ao ativar usuário.", body = ApiResponse<AccessToken>),
        (status = 500, description = "Unexpected failure", body = ApiResponse<AccessToken>)
    )
)]
pub async fn activate(
    State(state): State<SecurityState>,
    ValidatedJson(request): ValidatedJson<ActivateUserRequest>,
) -> ApiResponse<AccessToken> {
    let started = Instant::now();
    let response = state.accounts.activate(request.into()).await;
    timed("Ativar usuário", started);
    response
}
