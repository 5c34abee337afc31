//! 세션 해석.
//!
//! 베어러 토큰을 검증하고 저장소에서 사용자를 다시 읽어옵니다.
//! 캐시는 없습니다. 사용자가 삭제되면 다음 요청부터 토큰이 무효가 됩니다.

use std::sync::Arc;

use bootlang_core::{AccountDirectory, Principal};

use super::{AuthError, TokenCodec};

/// 토큰 → 사용자 해석기.
#[derive(Clone)]
pub struct SessionResolver {
    codec: Arc<TokenCodec>,
    directory: Arc<dyn AccountDirectory>,
}

impl SessionResolver {
    pub fn new(codec: Arc<TokenCodec>, directory: Arc<dyn AccountDirectory>) -> Self {
        Self { codec, directory }
    }

    /// 토큰을 사용자 레코드로 해석합니다.
    ///
    /// # Errors
    ///
    /// - 서명/만료 검증 실패: `InvalidToken`
    /// - `sub` 누락 또는 정수가 아님: `Unauthorized("invalid token payload")`
    /// - 사용자 없음: `Unauthorized("user not found")`
    /// - 저장소 장애: `Directory`
    pub async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        let verified = self.codec.verify(token).ok_or_else(|| {
            tracing::debug!("Rejected invalid or expired token");
            AuthError::InvalidToken
        })?;

        let user_id = verified
            .claims
            .subject_id()
            .ok_or_else(|| AuthError::unauthorized("invalid token payload"))?;

        match self.directory.find_by_id(user_id).await? {
            Some(principal) => Ok(principal),
            None => {
                tracing::debug!(user_id, "Token subject no longer exists");
                Err(AuthError::unauthorized("user not found"))
            }
        }
    }
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("codec", &self.codec)
            .field("directory", &self.directory.backend_name())
            .finish()
    }
}
