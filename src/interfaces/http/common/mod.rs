//! Shared HTTP plumbing

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::shared::ApiResponse;

/// Envelopes answer with the status of their first notice.
impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
