//! 인증 endpoint.
//!
//! 회원가입, 로그인, 현재 사용자 조회.

use std::{borrow::Cow, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bootlang_core::{NewPrincipal, Principal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::auth::{
    hash_password_blocking, validate_password_strength, verify_password_blocking, AuthError,
    Claims, CurrentUser, PasswordError,
};
use crate::error::{validation_error, ApiResult};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 회원가입 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: String,

    #[validate(custom(function = "password_strength"))]
    pub password: String,

    #[validate(length(max = 100, message = "Email must be at most 100 characters"))]
    #[serde(default)]
    pub email: Option<String>,
}

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 토큰/응답에 포함되는 사용자 요약.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl From<&Principal> for UserSummary {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            is_admin: principal.is_admin,
        }
    }
}

/// 현재 사용자 정보 (민감 정보 제외).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for UserInfo {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            is_admin: principal.is_admin,
            created_at: principal.created_at,
        }
    }
}

/// 회원가입/로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

// ==================== 공통 헬퍼 ====================

/// validator용 비밀번호 강도 검사.
pub(crate) fn password_strength(password: &str) -> Result<(), ValidationError> {
    validate_password_strength(password).map_err(|message| {
        ValidationError::new("password_strength").with_message(Cow::Borrowed(message))
    })
}

/// 빈 이메일은 미입력으로 취급.
pub(crate) fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

/// 사용자명/이메일 중복 검사 후 계정을 생성합니다.
pub(crate) async fn create_account(
    state: &AppState,
    username: String,
    email: Option<String>,
    password: String,
    is_admin: bool,
) -> Result<Principal, AuthError> {
    if state.directory.find_by_username(&username).await?.is_some() {
        return Err(AuthError::conflict("Username already exists"));
    }
    if let Some(email) = email.as_deref() {
        if state.directory.find_by_email(email).await?.is_some() {
            return Err(AuthError::conflict("Email already registered"));
        }
    }

    let password_hash = hash_password_blocking(password).await?;
    let new = NewPrincipal::new(username, password_hash)
        .with_email(email)
        .with_admin(is_admin);

    // 동시 가입으로 인한 경합은 저장소의 유일성 제약이 잡음
    Ok(state.directory.insert(new).await?)
}

fn issue_token(state: &AppState, principal: &Principal) -> Result<String, AuthError> {
    let claims = Claims::for_user(principal.id, &principal.username, principal.is_admin);
    Ok(state.token_codec.issue_default(&claims)?)
}

// ==================== 핸들러 ====================

/// 회원가입.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    request.validate().map_err(validation_error)?;

    let principal = create_account(
        &state,
        request.username,
        normalize_email(request.email),
        request.password,
        false,
    )
    .await?;

    let token = issue_token(&state, &principal)?;
    tracing::info!(user_id = principal.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token: Some(token),
            user: Some(UserSummary::from(&principal)),
        }),
    ))
}

/// 로그인.
///
/// 존재하지 않는 사용자와 틀린 비밀번호는 같은 메시지로 응답합니다.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || AuthError::unauthorized("Invalid username or password");

    let principal = state
        .directory
        .find_by_username(&request.username)
        .await
        .map_err(AuthError::from)?
        .ok_or_else(|| {
            tracing::debug!("Login attempt for unknown username");
            invalid()
        })?;

    let verified = match verify_password_blocking(request.password, principal.password_hash.clone())
        .await
    {
        Ok(verified) => verified,
        Err(PasswordError::MalformedHash) => {
            tracing::error!(user_id = principal.id, "Stored password hash is malformed");
            return Err(AuthError::MalformedHash.into());
        }
        Err(e) => return Err(AuthError::from(e).into()),
    };

    if !verified {
        tracing::debug!(user_id = principal.id, "Login failed: wrong password");
        return Err(invalid().into());
    }

    let token = issue_token(&state, &principal)?;
    tracing::info!(user_id = principal.id, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token: Some(token),
        user: Some(UserSummary::from(&principal)),
    }))
}

/// 현재 사용자 정보.
///
/// GET /api/auth/me
pub async fn me(CurrentUser(principal): CurrentUser) -> Json<UserInfo> {
    Json(UserInfo::from(&principal))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            password: "pass1234".to_string(),
            email: Some("alice@example.com".to_string()),
        };
        assert!(valid.validate().is_ok());

        let short_name = RegisterRequest {
            username: "al".to_string(),
            password: "pass1234".to_string(),
            email: None,
        };
        assert!(short_name.validate().is_err());

        let weak = RegisterRequest {
            username: "alice".to_string(),
            password: "abc".to_string(),
            email: None,
        };
        let errors = weak.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(None), None);
        assert_eq!(normalize_email(Some(String::new())), None);
        assert_eq!(normalize_email(Some("  ".to_string())), None);
        assert_eq!(
            normalize_email(Some("a@example.com".to_string())),
            Some("a@example.com".to_string())
        );
    }
}
