//! CEP lookup endpoint

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Extension;
use tracing::debug;

use super::dto::CepQuery;
use crate::application::CepService;
use crate::domain::Address;
use crate::interfaces::http::middleware::AuthenticatedPrincipal;
use crate::shared::ApiResponse;

#[derive(Clone)]
pub struct CepState {
    pub ceps: Arc<CepService>,
}

#[utoipa::path(
    get,
    path = "/api/cep",
    tag = "CEP",
    params(CepQuery),
    responses(
        (status = 200, description = "Address found", body = ApiResponse<Address>),
        (status = 400, description = "CEP inválido.", body = ApiResponse<Address>),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "CEP não encontrado.", body = ApiResponse<Address>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_cep(
    State(state): State<CepState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    Query(query): Query<CepQuery>,
) -> ApiResponse<Address> {
    debug!(subject = %principal.subject, admin = principal.is_admin(), cep = query.cep, "CEP lookup");
    state.ceps.lookup_number(query.cep).await
}
