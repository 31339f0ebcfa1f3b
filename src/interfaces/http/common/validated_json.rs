//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value.
//! Both malformed JSON and validation failures are answered with a
//! `400` envelope carrying one `ErrorBadRequest` notice per problem.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::shared::{ApiResponse, Notice, NoticeCode};

/// An extractor that deserializes JSON and validates it.
///
/// # Usage
///
/// ```ignore
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct LoginRequest {
///     #[validate(length(min = 1, message = "username é obrigatório"))]
///     username: String,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<LoginRequest>) {
///     // `body` is guaranteed to pass validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
pub enum ValidatedJsonRejection {
    /// JSON parsing failed.
    JsonError(JsonRejection),
    /// Validation failed.
    ValidationError(validator::ValidationErrors),
}

impl ValidatedJsonRejection {
    fn notices(&self) -> Vec<Notice> {
        match self {
            Self::JsonError(rejection) => vec![Notice::new(
                NoticeCode::ErrorBadRequest,
                format!("JSON inválido: {}", rejection.body_text()),
            )],
            Self::ValidationError(errors) => {
                let mut notices: Vec<Notice> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            let msg = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            Notice::new(NoticeCode::ErrorBadRequest, format!("{}: {}", field, msg))
                        })
                    })
                    .collect();
                // field_errors() is a HashMap
                notices.sort_by(|a, b| a.message.cmp(&b.message));

                if notices.is_empty() {
                    notices.push(Notice::new(
                        NoticeCode::ErrorBadRequest,
                        "Falha de validação.",
                    ));
                }
                notices
            }
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        ApiResponse::<()>::failure(self.notices()).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(length(min = 1, max = 10, message = "nome obrigatório"))]
        name: String,
        #[validate(range(min = 1, max = 100))]
        age: u32,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    async fn send(req: Request<Body>) -> axum::http::Response<Body> {
        use tower::Service;
        let mut svc = app().into_service();
        svc.call(req).await.unwrap()
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn envelope(resp: axum::http::Response<Body>) -> ApiResponse<()> {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let resp = send(json_request(r#"{"name": "Alice", "age": 30}"#)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_400_envelope() {
        let resp = send(json_request("not json")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = envelope(resp).await;
        assert!(!body.success);
        assert_eq!(body.notices.len(), 1);
        assert_eq!(body.notices[0].code, NoticeCode::ErrorBadRequest);
    }

    #[tokio::test]
    async fn validation_failure_lists_every_field() {
        let resp = send(json_request(r#"{"name": "", "age": 0}"#)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = envelope(resp).await;
        assert_eq!(body.notices.len(), 2);
        assert!(body
            .notices
            .iter()
            .any(|n| n.message == "name: nome obrigatório"));
        assert!(body.notices.iter().any(|n| n.message.starts_with("age: ")));
    }
}
