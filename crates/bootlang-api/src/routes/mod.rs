//! HTTP 라우트.
//!
//! - `/` - 서비스 이름/버전
//! - `/health`, `/health/ready` - 프로브
//! - `/api/auth` - 회원가입, 로그인, 현재 사용자
//! - `/api/user` - 본인 비밀번호/프로필 수정
//! - `/api/admin` - 관리자 사용자 관리

pub mod admin;
pub mod auth;
pub mod health;
pub mod user;

pub use admin::{admin_router, AdminResponse, CreateUserRequest, ResetPasswordRequest, UserListItem};
pub use auth::{auth_router, AuthResponse, LoginRequest, RegisterRequest, UserInfo, UserSummary};
pub use health::{
    health_router, ComponentHealth, ComponentStatus, HealthResponse, ProbeResult, ServiceStatus,
};
pub use user::{user_router, ChangePasswordRequest, UpdateProfileRequest, UserResponse};

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// 서비스 정보 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub version: String,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Boot_Lang Platform".to_string(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 상태가 아직 주입되지 않은 전체 라우터.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .nest("/health", health_router())
        .nest("/api/auth", auth_router())
        .nest("/api/user", user_router())
        .nest("/api/admin", admin_router())
}
