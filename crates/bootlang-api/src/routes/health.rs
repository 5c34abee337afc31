//! liveness / readiness 엔드포인트.
//!
//! `/health`는 프로세스가 요청을 받을 수 있는지만 확인하고,
//! `/health/ready`는 계정 저장소까지 확인해 준비되지 않았으면 503을 반환합니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

/// 서비스 전체 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

/// 개별 의존성 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeResult {
    Up,
    Down,
}

/// readiness 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub uptime_secs: i64,
    pub timestamp: DateTime<Utc>,
    pub components: ComponentHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// 계정 저장소
    pub directory: ComponentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: ProbeResult,
    /// 저장소 구현 이름 (`postgres`, `memory`)
    pub backend: String,
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.directory.backend_name();
    let directory_up = state.directory.health_check().await;

    if !directory_up {
        warn!(backend, "Account directory is not reachable");
    }

    let (code, status, probe) = if directory_up {
        (StatusCode::OK, ServiceStatus::Healthy, ProbeResult::Up)
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            ServiceStatus::Unhealthy,
            ProbeResult::Down,
        )
    };

    let body = HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: Utc::now(),
        components: ComponentHealth {
            directory: ComponentStatus {
                status: probe,
                backend: backend.to_string(),
            },
        },
    };

    (code, Json(body))
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
