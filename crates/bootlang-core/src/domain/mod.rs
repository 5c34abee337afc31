//! 도메인 모델.
//!
//! 사용자 계정과 계정 저장소 추상화를 정의합니다.

pub mod directory;
pub mod principal;

pub use directory::AccountDirectory;
pub use principal::{NewPrincipal, Principal};
