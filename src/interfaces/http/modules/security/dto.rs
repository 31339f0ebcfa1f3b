//! Account request DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{ActivationRequest, Credentials, NewAccount};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    #[serde(alias = "userName")]
    #[validate(length(min = 1, max = 256, message = "nome de usuário é obrigatório"))]
    pub username: String,
    #[validate(length(min = 1, max = 256, message = "e-mail é obrigatório"))]
    pub email: String,
    #[validate(length(min = 1, message = "senha é obrigatória"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
}

impl From<CreateRequest> for NewAccount {
    fn from(r: CreateRequest) -> Self {
        NewAccount {
            username: r.username,
            email: r.email,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            phone_number: r.phone_number,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "nome de usuário é obrigatório"))]
    pub username: String,
    #[validate(length(min = 1, message = "senha é obrigatória"))]
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(r: LoginRequest) -> Self {
        Credentials {
            username: r.username,
            password: r.password,
        }
    }
}

/// Body of `POST /security/activate`, as produced by the activation link.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActivateUserRequest {
    #[serde(rename = "usuarioId", alias = "accountId")]
    #[validate(length(min = 1, message = "usuário é obrigatório"))]
    pub account_id: String,
    #[serde(rename = "codigo", alias = "code")]
    #[validate(length(min = 1, message = "código é obrigatório"))]
    pub code: String,
}

impl From<ActivateUserRequest> for ActivationRequest {
    fn from(r: ActivateUserRequest) -> Self {
        ActivationRequest {
            account_id: r.account_id,
            code: r.code,
        }
    }
}
