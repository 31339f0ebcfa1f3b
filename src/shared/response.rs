//! Uniform response envelope
//!
//! Every account, CEP and config operation answers with the same wrapper:
//! `{"success": bool, "data": T | null, "notices": [{"code", "message"}]}`.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome code attached to a [`Notice`].
///
/// Serialized by variant name (`"SuccessCreated"`, `"ErrorUnauthorized"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum NoticeCode {
    #[serde(rename = "SuccessOK")]
    SuccessOk,
    SuccessCreated,
    SuccessAccepted,
    ErrorBadRequest,
    ErrorUnauthorized,
    ErrorForbidden,
    ErrorNotFound,
    ErrorConflict,
    ServerErrorInternalServerError,
    ServerErrorServiceUnavailable,
}

impl NoticeCode {
    pub fn status(self) -> StatusCode {
        match self {
            Self::SuccessOk => StatusCode::OK,
            Self::SuccessCreated => StatusCode::CREATED,
            Self::SuccessAccepted => StatusCode::ACCEPTED,
            Self::ErrorBadRequest => StatusCode::BAD_REQUEST,
            Self::ErrorUnauthorized => StatusCode::UNAUTHORIZED,
            Self::ErrorForbidden => StatusCode::FORBIDDEN,
            Self::ErrorNotFound => StatusCode::NOT_FOUND,
            Self::ErrorConflict => StatusCode::CONFLICT,
            Self::ServerErrorInternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServerErrorServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn is_client_error(self) -> bool {
        self.status().is_client_error()
    }

    pub fn is_server_error(self) -> bool {
        self.status().is_server_error()
    }
}

/// One outcome detail of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    pub code: NoticeCode,
    pub message: String,
}

impl Notice {
    pub fn new(code: NoticeCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` when the operation succeeded
    pub success: bool,
    /// Payload, `null` when absent
    pub data: Option<T>,
    /// Ordered outcome details
    #[serde(default)]
    pub notices: Vec<Notice>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            notices: Vec::new(),
        }
    }

    pub fn success_with(notice: Notice) -> Self {
        Self {
            success: true,
            data: None,
            notices: vec![notice],
        }
    }

    pub fn failure(notices: Vec<Notice>) -> Self {
        Self {
            success: false,
            data: None,
            notices,
        }
    }

    pub fn error(code: NoticeCode, message: impl Into<String>) -> Self {
        Self::failure(vec![Notice::new(code, message)])
    }

    /// HTTP status carried by the first notice, `200 OK` when there is none.
    pub fn status(&self) -> StatusCode {
        self.notices
            .first()
            .map(|n| n.code.status())
            .unwrap_or(StatusCode::OK)
    }
}
