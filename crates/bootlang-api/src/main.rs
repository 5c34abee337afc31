//! Boot_Lang API 서버.
//!
//! 설정을 읽고 토큰 코덱과 계정 저장소를 만든 뒤 HTTP 서버를 띄웁니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, Router};
use bootlang_core::{init_logging, AccountDirectory, AppConfig, LogConfig, ServerConfig};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use bootlang_api::auth::TokenCodec;
use bootlang_api::repository::{connect_pool, MemoryAccountDirectory, PgAccountDirectory};
use bootlang_api::routes::create_api_router;
use bootlang_api::state::AppState;

/// CORS 레이어 생성.
///
/// 설정된 origin 목록만 허용하며 자격 증명을 포함할 수 있습니다.
/// 유효한 origin이 하나도 없으면 모든 origin을 허용합니다 (자격 증명 제외).
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let (allow_origin, allow_credentials) = if origins.is_empty() {
        warn!("No valid CORS origins configured, allowing any origin");
        (AllowOrigin::any(), false)
    } else {
        info!(origins = origins.len(), "CORS origin allow-list configured");
        (AllowOrigin::list(origins), true)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(allow_credentials)
        .max_age(Duration::from_secs(3600))
}

/// API 라우터에 공통 레이어(추적, 타임아웃, CORS)를 씌웁니다.
fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(cors_layer(config))
}

/// 계정 저장소 생성.
///
/// `database.url`이 없으면 인메모리 저장소를 사용합니다 (재시작 시 데이터 소실).
async fn create_directory(config: &AppConfig) -> anyhow::Result<Arc<dyn AccountDirectory>> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("DATABASE_URL not set, using in-memory account directory (data is lost on restart)");
        return Ok(Arc::new(MemoryAccountDirectory::new()));
    };

    let pool = connect_pool(url, &config.database).await.map_err(|e| {
        error!(error = %e, "Database connection failed");
        e
    })?;
    PgAccountDirectory::init_schema(&pool)
        .await
        .context("failed to initialize users schema")?;

    info!("Connected to PostgreSQL account directory");
    Ok(Arc::new(PgAccountDirectory::new(pool)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (없으면 무시)
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    info!(environment = ?config.environment, "Starting Boot_Lang API server...");

    let addr = config.server.socket_addr().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "Invalid socket address. Check API_HOST and API_PORT."
        );
        e
    })?;

    // 운영 환경에서 시크릿이 없으면 여기서 종료
    let auth_config = config.auth_config().map_err(|e| {
        error!(error = %e, "Invalid authentication configuration");
        e
    })?;
    let token_codec = Arc::new(TokenCodec::new(&auth_config));
    info!(
        algorithm = ?auth_config.algorithm,
        ttl_hours = auth_config.token_ttl.num_hours(),
        development_secret = auth_config.using_development_secret,
        "Token codec initialized"
    );

    let directory = create_directory(&config).await?;
    let state = Arc::new(AppState::new(directory, token_codec));

    info!(
        version = %state.version,
        directory = state.directory.backend_name(),
        "Application state initialized"
    );

    let app = create_router(state, &config.server);

    info!(%addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM 시그널 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, shutting down");
        }
        _ = terminate => {
            info!("SIGTERM received, shutting down");
        }
    }
}
