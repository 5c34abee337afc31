//! 사용자 본인 계정 관리 endpoint.
//!
//! 비밀번호 변경과 프로필(사용자명/이메일) 수정.

use std::sync::Arc;

use axum::{extract::State, routing::put, Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::auth::{normalize_email, UserInfo};
use crate::auth::{
    hash_password_blocking, validate_password_strength, verify_password_blocking, AuthError,
    CurrentUser,
};
use crate::error::{bad_request, conflict, validation_error, ApiResult};
use crate::state::AppState;

/// 비밀번호 변경 요청.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// 프로필 수정 요청. 최소 한 필드는 있어야 합니다.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    #[serde(default)]
    pub username: Option<String>,

    #[validate(length(max = 100, message = "Email must be at most 100 characters"))]
    #[serde(default)]
    pub email: Option<String>,
}

/// 사용자 작업 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

/// 비밀번호 변경.
///
/// PUT /api/user/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<UserResponse>> {
    let current_ok = verify_password_blocking(
        request.current_password.clone(),
        principal.password_hash.clone(),
    )
    .await
    .map_err(AuthError::from)?;

    if !current_ok {
        tracing::debug!(user_id = principal.id, "Password change rejected: wrong current password");
        return Err(AuthError::unauthorized("Current password is incorrect").into());
    }

    validate_password_strength(&request.new_password).map_err(bad_request)?;

    if request.new_password == request.current_password {
        return Err(bad_request(
            "New password must be different from current password",
        ));
    }

    let password_hash = hash_password_blocking(request.new_password)
        .await
        .map_err(AuthError::from)?;
    let updated = state
        .directory
        .set_password_hash(principal.id, &password_hash)
        .await
        .map_err(AuthError::from)?;

    tracing::info!(user_id = updated.id, "Password changed");

    Ok(Json(UserResponse {
        success: true,
        message: "Password changed successfully".to_string(),
        user: None,
    }))
}

/// 프로필 수정.
///
/// 모든 검사는 저장 전에 수행됩니다.
///
/// PUT /api/user/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let email = normalize_email(request.email.clone());
    if request.username.is_none() && email.is_none() {
        return Err(bad_request(
            "At least one field (username or email) must be provided",
        ));
    }
    request.validate().map_err(validation_error)?;

    if let Some(username) = request.username.as_deref() {
        if username == principal.username {
            return Err(bad_request(
                "New username must be different from current username",
            ));
        }
        if state
            .directory
            .find_by_username(username)
            .await
            .map_err(AuthError::from)?
            .is_some()
        {
            return Err(conflict("Username already exists"));
        }
    }

    if let Some(email) = email.as_deref() {
        if principal.email.as_deref() == Some(email) {
            return Err(bad_request("New email must be different from current email"));
        }
        if state
            .directory
            .find_by_email(email)
            .await
            .map_err(AuthError::from)?
            .is_some()
        {
            return Err(conflict("Email already registered"));
        }
    }

    // 요청에 있는 컬럼만 갱신
    let updated = state
        .directory
        .update_profile(principal.id, request.username.as_deref(), email.as_deref())
        .await
        .map_err(AuthError::from)?;

    tracing::info!(user_id = updated.id, "Profile updated");

    Ok(Json(UserResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
        user: Some(UserInfo::from(&updated)),
    }))
}

/// 사용자 라우터 생성.
pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/password", put(change_password))
        .route("/profile", put(update_profile))
}
