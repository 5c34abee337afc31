//! HTTP 에러 본문.
//!
//! 모든 실패 응답은 `{code, message, details?, timestamp?}` 형태입니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 에러 응답 본문.
///
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Username already exists",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 기계가 읽는 코드 (`UNAUTHORIZED`, `VALIDATION_ERROR` 등)
    pub code: String,
    pub message: String,
    /// 필드별 검증 에러 등
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Unix 초
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 현재 시각을 찍어 생성합니다.
    ///
    /// ```
    /// use bootlang_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("NOT_FOUND", "User not found");
    /// assert_eq!(error.code, "NOT_FOUND");
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 상태 코드와 본문 쌍. axum이 그대로 응답으로 변환합니다.
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// 핸들러 반환 타입.
///
/// 도메인 에러(`AuthError`)는 `?`로 자동 변환됩니다.
///
/// ```ignore
/// async fn me(CurrentUser(user): CurrentUser) -> ApiResult<Json<UserInfo>> {
///     Ok(Json(UserInfo::from(&user)))
/// }
/// ```
pub type ApiResult<T> = Result<T, ApiError>;

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (status, Json(ApiErrorResponse::new(code, message)))
}

/// 400 Bad Request.
pub fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
}

/// 404 Not Found.
pub fn not_found(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "NOT_FOUND", message)
}

/// 409 Conflict.
pub fn conflict(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::CONFLICT, "CONFLICT", message)
}

/// 500 Internal Server Error. 내부 원인은 응답에 노출하지 않습니다.
pub fn internal_error() -> ApiError {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error",
    )
}

/// 요청 본문 검증 실패 (400).
///
/// 첫 번째 필드 에러 메시지를 `message`로, 전체 에러를 `details`로 사용합니다.
pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    let message = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".to_string());

    let details = serde_json::to_value(&errors).unwrap_or(Value::Null);

    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::with_details(
            "VALIDATION_ERROR",
            message,
            details,
        )),
    )
}
