//! 운영 도구 모음.
//!
//! - 데이터베이스 스키마 초기화
//! - 관리자 계정 생성/승격

pub mod commands;
