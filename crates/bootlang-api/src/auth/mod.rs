//! 인증 및 권한 부여.
//!
//! 비밀번호 해싱, JWT 세션 토큰, 세션 해석, 관리자 권한 검사를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`hash_password`] / [`verify_password`]: Argon2id 비밀번호 해싱
//! - [`TokenCodec`]: 세션 토큰 발급/검증
//! - [`SessionResolver`]: 토큰 → 사용자 해석
//! - [`require_admin`]: 관리자 권한 검사
//! - [`CurrentUser`] / [`AdminUser`]: Axum 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

mod gate;
mod jwt;
mod middleware;
mod password;
mod session;

pub use gate::{ensure_not_self, require_admin};
pub use jwt::{Claims, JwtError, TokenCodec, VerifiedClaims};
pub use middleware::{bearer_token, AdminUser, CurrentUser};
pub use password::{
    hash_password, hash_password_blocking, validate_password_strength, verify_password,
    verify_password_blocking, PasswordError, MIN_PASSWORD_CHARS,
};
pub use session::SessionResolver;

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bootlang_core::{DirectoryError, UniqueField};

use crate::error::{internal_error, ApiError, ApiErrorResponse};

/// 인증/인가 에러.
///
/// 만료된 토큰과 변조된 토큰은 구분하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("stored password hash is malformed")]
    MalformedHash,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("password hashing failed")]
    HashingFailed,

    #[error("token issuance failed: {0}")]
    TokenIssue(#[from] JwtError),

    #[error("account directory error: {0}")]
    Directory(#[from] DirectoryError),
}

impl AuthError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::Directory(DirectoryError::Duplicate(_)) => StatusCode::CONFLICT,
            AuthError::Directory(DirectoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AuthError::MalformedHash
            | AuthError::HashingFailed
            | AuthError::TokenIssue(_)
            | AuthError::Directory(DirectoryError::Database(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }

    /// 클라이언트에 노출할 메시지 (4xx 전용).
    fn public_message(&self) -> String {
        match self {
            AuthError::Directory(DirectoryError::Duplicate(UniqueField::Username)) => {
                "Username already exists".to_string()
            }
            AuthError::Directory(DirectoryError::Duplicate(UniqueField::Email)) => {
                "Email already registered".to_string()
            }
            AuthError::Directory(DirectoryError::NotFound(_)) => "User not found".to_string(),
            other => other.to_string(),
        }
    }

    fn to_api_error(&self) -> ApiError {
        let status = self.status_code();
        if status.is_server_error() {
            // 원인은 로그에만 남깁니다
            tracing::error!(error = %self, "Request failed with internal error");
            return internal_error();
        }
        (
            status,
            Json(ApiErrorResponse::new(self.error_code(), self.public_message())),
        )
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::MalformedHash => AuthError::MalformedHash,
            PasswordError::HashingFailed | PasswordError::TaskCancelled => AuthError::HashingFailed,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        err.to_api_error()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let is_unauthorized = self.status_code() == StatusCode::UNAUTHORIZED;
        let mut response = self.to_api_error().into_response();
        if is_unauthorized {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::InvalidToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::unauthorized("user not found").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::forbidden("admin privileges required").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::conflict("cannot delete your own account").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::MalformedHash.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::from(DirectoryError::Database("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::from(DirectoryError::NotFound(3)).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_duplicate_messages() {
        let (status, Json(body)) =
            ApiError::from(AuthError::from(DirectoryError::Duplicate(UniqueField::Username)));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.message, "Username already exists");

        let (_, Json(body)) =
            ApiError::from(AuthError::from(DirectoryError::Duplicate(UniqueField::Email)));
        assert_eq!(body.message, "Email already registered");
    }

    #[test]
    fn test_internal_errors_hide_cause() {
        let (_, Json(body)) = ApiError::from(AuthError::from(DirectoryError::Database(
            "connection refused at 10.0.0.5".into(),
        )));
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("10.0.0.5"));
    }

    #[test]
    fn test_every_server_error_uses_the_same_body() {
        let (_, Json(expected)) = internal_error();
        for err in [
            AuthError::MalformedHash,
            AuthError::HashingFailed,
            AuthError::from(DirectoryError::Database("pool timed out".into())),
        ] {
            let (status, Json(body)) = ApiError::from(err);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body.code, expected.code);
            assert_eq!(body.message, expected.message);
        }
    }

    #[test]
    fn test_password_error_conversion() {
        assert!(matches!(
            AuthError::from(PasswordError::MalformedHash),
            AuthError::MalformedHash
        ));
        assert!(matches!(
            AuthError::from(PasswordError::HashingFailed),
            AuthError::HashingFailed
        ));
    }

    #[test]
    fn test_unauthorized_response_has_challenge_header() {
        let response = AuthError::unauthorized("not authenticated").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

        let response = AuthError::forbidden("admin privileges required").into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }
}
