//! 핸들러 공유 상태.
//!
//! 시작 시 설정에서 만들어진 뒤 변경되지 않습니다. 라우터에는 `Arc<AppState>`로 전달됩니다.

use std::sync::Arc;

use axum::extract::FromRef;
use bootlang_core::AccountDirectory;

use crate::auth::{SessionResolver, TokenCodec};

/// 토큰 코덱과 계정 저장소 핸들.
#[derive(Clone)]
pub struct AppState {
    /// 계정 저장소 (PostgreSQL 또는 인메모리)
    pub directory: Arc<dyn AccountDirectory>,

    /// 세션 토큰 코덱
    pub token_codec: Arc<TokenCodec>,

    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(directory: Arc<dyn AccountDirectory>, token_codec: Arc<TokenCodec>) -> Self {
        Self {
            directory,
            token_codec,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 세션 해석기 생성 (Arc 복제만 수행).
    pub fn session_resolver(&self) -> SessionResolver {
        SessionResolver::new(self.token_codec.clone(), self.directory.clone())
    }

    /// `/health/ready`에 표시되는 가동 시간.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("directory", &self.directory.backend_name())
            .field("token_codec", &self.token_codec)
            .field("started_at", &self.started_at)
            .field("version", &self.version)
            .finish()
    }
}

impl FromRef<Arc<AppState>> for SessionResolver {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.session_resolver()
    }
}

/// 테스트용 상태: 인메모리 저장소와 고정 시크릿.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use bootlang_core::AuthConfig;

    use crate::repository::MemoryAccountDirectory;

    let config = AuthConfig::new("test-secret-key-for-unit-tests", chrono::Duration::hours(24));
    AppState::new(
        Arc::new(MemoryAccountDirectory::new()),
        Arc::new(TokenCodec::new(&config)),
    )
}
