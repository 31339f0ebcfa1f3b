use crate::shared::{ApiResponse, Notice, NoticeCode};

pub const MSG_OPTIONS: &str = "Headers suportados pela aplicação.";

#[utoipa::path(
    options,
    path = "/api/config/options",
    tag = "Config",
    responses(
        (status = 200, description = "Supported headers", body = ApiResponse<String>)
    )
)]
pub async fn options() -> ApiResponse<String> {
    ApiResponse::success_with(Notice::new(NoticeCode::SuccessOk, MSG_OPTIONS))
}
