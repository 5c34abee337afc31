//! 관리자 전용 사용자 관리 endpoint.
//!
//! 모든 핸들러는 [`AdminUser`] 추출기로 보호됩니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use bootlang_core::Principal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::auth::{create_account, normalize_email, password_strength, UserSummary};
use crate::auth::{ensure_not_self, hash_password_blocking, AdminUser, AuthError};
use crate::error::{not_found, validation_error, ApiResult};
use crate::state::AppState;

/// 관리자 사용자 생성 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
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

    #[serde(default)]
    pub is_admin: bool,
}

/// 비밀번호 초기화 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "password_strength"))]
    pub new_password: String,
}

/// 사용자 목록 항목 (비밀번호 제외).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserListItem {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Principal> for UserListItem {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            is_admin: principal.is_admin,
            created_at: principal.created_at,
            updated_at: principal.updated_at,
        }
    }
}

/// 관리자 작업 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserListItem>>,
}

impl AdminResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user: None,
            users: None,
        }
    }
}

/// 전체 사용자 목록.
///
/// GET /api/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<AdminResponse>> {
    let principals = state.directory.list().await.map_err(AuthError::from)?;
    let users: Vec<UserListItem> = principals.iter().map(UserListItem::from).collect();

    Ok(Json(AdminResponse {
        users: Some(users),
        ..AdminResponse::message(format!("Found {} users", principals.len()))
    }))
}

/// 사용자 생성 (관리자 권한 지정 가능, 토큰 발급 없음).
///
/// POST /api/admin/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<AdminResponse>)> {
    request.validate().map_err(validation_error)?;

    let principal = create_account(
        &state,
        request.username,
        normalize_email(request.email),
        request.password,
        request.is_admin,
    )
    .await?;

    tracing::info!(
        admin_id = admin.id,
        user_id = principal.id,
        is_admin = principal.is_admin,
        "User created by admin"
    );

    Ok((
        StatusCode::CREATED,
        Json(AdminResponse {
            user: Some(UserSummary::from(&principal)),
            ..AdminResponse::message("User created successfully")
        }),
    ))
}

/// 사용자 삭제. 자기 자신은 삭제할 수 없습니다.
///
/// DELETE /api/admin/users/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<AdminResponse>> {
    ensure_not_self(&admin, user_id)?;

    let target = state
        .directory
        .find_by_id(user_id)
        .await
        .map_err(AuthError::from)?
        .ok_or_else(|| not_found("User not found"))?;

    state
        .directory
        .delete(&target)
        .await
        .map_err(AuthError::from)?;

    tracing::info!(admin_id = admin.id, user_id, "User deleted by admin");

    Ok(Json(AdminResponse::message(format!(
        "User '{}' deleted successfully",
        target.username
    ))))
}

/// 비밀번호 초기화 (현재 비밀번호 불필요).
///
/// PUT /api/admin/users/{user_id}/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<Json<AdminResponse>> {
    request.validate().map_err(validation_error)?;

    state
        .directory
        .find_by_id(user_id)
        .await
        .map_err(AuthError::from)?
        .ok_or_else(|| not_found("User not found"))?;

    let password_hash = hash_password_blocking(request.new_password)
        .await
        .map_err(AuthError::from)?;
    // 해싱 중에 삭제되었으면 NotFound(404)
    let target = state
        .directory
        .set_password_hash(user_id, &password_hash)
        .await
        .map_err(AuthError::from)?;

    tracing::info!(admin_id = admin.id, user_id, "Password reset by admin");

    Ok(Json(AdminResponse::message(format!(
        "Password reset successfully for user '{}'",
        target.username
    ))))
}

/// 관리자 라우터 생성.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", delete(delete_user))
        .route("/users/{user_id}/reset-password", put(reset_password))
}
