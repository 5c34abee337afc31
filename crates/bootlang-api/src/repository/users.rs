//! PostgreSQL 계정 저장소.
//!

use std::time::Duration;

use async_trait::async_trait;
use bootlang_core::{
    AccountDirectory, DatabaseConfig, DirectoryError, DirectoryResult, NewPrincipal, Principal,
};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// `users` 테이블 DDL. 여러 번 실행해도 안전합니다.
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            BIGSERIAL    PRIMARY KEY,
    username      VARCHAR(50)  NOT NULL CONSTRAINT users_username_key UNIQUE,
    email         VARCHAR(100) NULL     CONSTRAINT users_email_key UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    is_admin      BOOLEAN      NOT NULL DEFAULT FALSE,
    created_at    TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ  NOT NULL DEFAULT NOW()
)
"#;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, created_at, updated_at";

/// 설정으로부터 커넥션 풀을 생성합니다.
pub async fn connect_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(url)
        .await
}

/// PostgreSQL 계정 저장소.
#[derive(Debug, Clone)]
pub struct PgAccountDirectory {
    pool: PgPool,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `users` 테이블 생성.
    pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
        tracing::info!("Users schema ensured");
        Ok(())
    }

    async fn find_one(&self, column: &str, value: &str) -> DirectoryResult<Option<Principal>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(principal)
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_id(&self, id: i64) -> DirectoryResult<Option<Principal>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(principal)
    }

    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<Principal>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<Principal>> {
        self.find_one("email", email).await
    }

    async fn list(&self) -> DirectoryResult<Vec<Principal>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let principals = sqlx::query_as::<_, Principal>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(principals)
    }

    async fn insert(&self, new: NewPrincipal) -> DirectoryResult<Principal> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(new.is_admin)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(user_id = principal.id, "User created");
        Ok(principal)
    }

    async fn update_profile(
        &self,
        id: i64,
        username: Option<&str>,
        email: Option<&str>,
    ) -> DirectoryResult<Principal> {
        let sql = format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, Principal>(&sql)
            .bind(id)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DirectoryError::NotFound(id))
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> DirectoryResult<Principal> {
        let sql = format!(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, Principal>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DirectoryError::NotFound(id))
    }

    async fn set_admin(&self, id: i64, is_admin: bool) -> DirectoryResult<Principal> {
        let sql = format!(
            "UPDATE users SET is_admin = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, Principal>(&sql)
            .bind(id)
            .bind(is_admin)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DirectoryError::NotFound(id))
    }

    async fn delete(&self, principal: &Principal) -> DirectoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(principal.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound(principal.id));
        }
        tracing::info!(user_id = principal.id, "User deleted");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
