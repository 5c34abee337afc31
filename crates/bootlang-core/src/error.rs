//! 공통 에러 타입.
//!
//! 계정 저장소와 설정 로딩에서 발생하는 에러를 정의합니다.

use std::fmt;

use thiserror::Error;

/// 유일성 제약이 걸린 사용자 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::Email => write!(f, "email"),
        }
    }
}

/// 계정 저장소 에러.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// 유일성 제약 위반 (사용자명 또는 이메일 중복)
    #[error("duplicate {0}")]
    Duplicate(UniqueField),

    /// 갱신/삭제 대상이 존재하지 않음
    #[error("user {0} not found")]
    NotFound(i64),

    /// 하위 저장소 에러
    #[error("database error: {0}")]
    Database(String),
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some(name) if name.contains("email") => UniqueField::Email,
                    _ => UniqueField::Username,
                };
                return DirectoryError::Duplicate(field);
            }
        }
        DirectoryError::Database(err.to_string())
    }
}

/// 계정 저장소 작업을 위한 Result 타입.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// 설정 에러.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 설정 소스 로딩/역직렬화 실패
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// 값이 유효하지 않음
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// 운영 환경에서 안전하지 않은 JWT 시크릿 사용
    #[error("JWT secret is missing or uses the insecure default; set JWT_SECRET_KEY")]
    InsecureSecret,
}
