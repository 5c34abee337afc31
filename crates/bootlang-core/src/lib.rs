//! # Boot_Lang Core
//!
//! Boot_Lang 백엔드의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 API 서버와 CLI가 함께 사용하는 기본 타입을 제공합니다:
//! - 사용자(Principal) 도메인 모델
//! - 계정 저장소(`AccountDirectory`) 트레이트
//! - 설정 관리
//! - 로깅 인프라
//! - 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
