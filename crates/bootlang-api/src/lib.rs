//! # Boot_Lang API
//!
//! Boot_Lang 백엔드의 REST API 서버.
//!
//! ## 모듈
//!
//! - `auth`: 비밀번호 해싱, JWT 세션 토큰, 세션 해석, 관리자 권한 검사
//! - `repository`: 계정 저장소 구현 (PostgreSQL, 인메모리)
//! - `routes`: REST 엔드포인트
//! - `state`: 공유 애플리케이션 상태
//! - `error`: 통합 에러 응답

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use state::AppState;
