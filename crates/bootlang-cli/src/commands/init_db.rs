//! 데이터베이스 스키마 초기화 명령어.

use anyhow::{Context, Result};
use bootlang_api::repository::{connect_pool, PgAccountDirectory};
use bootlang_core::{AppConfig, DatabaseConfig};
use sqlx::PgPool;
use tracing::info;

/// 명령행 인자 또는 설정에서 DB URL을 결정합니다.
pub fn resolve_db_url(db_url: Option<String>, config: &AppConfig) -> Result<String> {
    db_url
        .filter(|u| !u.trim().is_empty())
        .or_else(|| config.database.url.clone())
        .context("database URL is required: pass --db-url or set DATABASE_URL")
}

/// 커넥션 풀 연결.
pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool> {
    info!("Connecting to database...");
    connect_pool(url, config)
        .await
        .context("failed to connect to database")
}

/// `users` 테이블 생성 (이미 있으면 변경 없음).
pub async fn init_db(pool: &PgPool) -> Result<()> {
    PgAccountDirectory::init_schema(pool)
        .await
        .context("failed to create users schema")?;
    println!("Database schema initialized");
    Ok(())
}
