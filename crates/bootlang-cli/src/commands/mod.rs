//! CLI 명령어 구현 모듈.

pub mod create_admin;
pub mod init_db;
