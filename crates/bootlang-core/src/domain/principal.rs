//! 사용자 계정 (Principal).

use chrono::{DateTime, Utc};

/// 인증된 사용자 계정 레코드.
///
/// 계정 저장소가 단독으로 소유합니다. `password_hash`는 단방향 해시이며
/// `Debug` 출력에서 가려집니다.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Principal {
    /// 사용자 ID
    pub id: i64,
    /// 사용자 이름 (유일, 3~50자)
    pub username: String,
    /// 이메일 (선택, 유일, 최대 100자)
    pub email: Option<String>,
    /// PHC 형식 비밀번호 해시
    pub password_hash: String,
    /// 관리자 여부
    pub is_admin: bool,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 변경 시각
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// 새 계정 입력.
#[derive(Clone)]
pub struct NewPrincipal {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
}

impl NewPrincipal {
    /// 일반 사용자 계정 입력 생성.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            password_hash: password_hash.into(),
            is_admin: false,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

impl std::fmt::Debug for NewPrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewPrincipal")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}
