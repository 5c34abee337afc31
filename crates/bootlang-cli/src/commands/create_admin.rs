//! 관리자 계정 생성 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! BOOTLANG_ADMIN_PASSWORD=secret123 bootlang create-admin --username admin
//! bootlang create-admin --username admin --password secret123 --email admin@example.com
//! ```

use anyhow::{anyhow, Result};
use bootlang_api::auth::{hash_password_blocking, validate_password_strength};
use bootlang_core::{AccountDirectory, NewPrincipal, Principal};
use tracing::info;

/// 관리자 계정 생성 설정.
#[derive(Clone)]
pub struct CreateAdminConfig {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

impl std::fmt::Debug for CreateAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// 명령 실행 결과.
#[derive(Debug, PartialEq)]
pub enum AdminOutcome {
    /// 새 관리자 계정 생성
    Created(Principal),
    /// 기존 일반 계정을 관리자로 승격
    Upgraded(Principal),
    /// 이미 관리자 (변경 없음)
    AlreadyAdmin(Principal),
}

/// 관리자 계정을 보장합니다.
///
/// 같은 사용자명이 이미 있으면 비밀번호는 건드리지 않고 관리자 권한만 부여합니다.
pub async fn ensure_admin(
    directory: &dyn AccountDirectory,
    config: CreateAdminConfig,
) -> Result<AdminOutcome> {
    if let Some(existing) = directory.find_by_username(&config.username).await? {
        if existing.is_admin {
            info!(user_id = existing.id, "User is already an admin");
            return Ok(AdminOutcome::AlreadyAdmin(existing));
        }

        let upgraded = directory.set_admin(existing.id, true).await?;
        info!(user_id = upgraded.id, "User upgraded to admin");
        return Ok(AdminOutcome::Upgraded(upgraded));
    }

    validate_password_strength(&config.password).map_err(|msg| anyhow!(msg))?;

    let password_hash = hash_password_blocking(config.password).await?;
    let email = config.email.filter(|e| !e.trim().is_empty());
    let admin = directory
        .insert(
            NewPrincipal::new(config.username, password_hash)
                .with_email(email)
                .with_admin(true),
        )
        .await?;

    info!(user_id = admin.id, "Admin user created");
    Ok(AdminOutcome::Created(admin))
}

/// 결과를 사람이 읽기 좋은 형태로 출력합니다.
pub fn print_outcome(outcome: &AdminOutcome) {
    match outcome {
        AdminOutcome::Created(admin) => {
            println!("Admin user created successfully");
            println!("   Username: {}", admin.username);
            if let Some(email) = &admin.email {
                println!("   Email: {}", email);
            }
            println!("   User ID: {}", admin.id);
        }
        AdminOutcome::Upgraded(admin) => {
            println!("User '{}' upgraded to admin", admin.username);
        }
        AdminOutcome::AlreadyAdmin(admin) => {
            println!("User '{}' is already an admin, nothing to do", admin.username);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootlang_api::auth::verify_password;
    use bootlang_api::repository::MemoryAccountDirectory;

    fn config(username: &str, password: &str) -> CreateAdminConfig {
        CreateAdminConfig {
            username: username.to_string(),
            password: password.to_string(),
            email: Some("admin@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_creates_admin() {
        let directory = MemoryAccountDirectory::new();

        let outcome = ensure_admin(&directory, config("admin", "admin1234"))
            .await
            .unwrap();

        let AdminOutcome::Created(admin) = outcome else {
            panic!("expected Created, got {:?}", outcome);
        };
        assert!(admin.is_admin);
        assert_eq!(admin.email.as_deref(), Some("admin@example.com"));
        assert!(verify_password("admin1234", &admin.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_upgrades_existing_user_without_touching_password() {
        let directory = MemoryAccountDirectory::new();
        let user = directory
            .insert(NewPrincipal::new("admin", "$argon2id$unchanged"))
            .await
            .unwrap();

        let outcome = ensure_admin(&directory, config("admin", "ignored1"))
            .await
            .unwrap();

        let AdminOutcome::Upgraded(upgraded) = outcome else {
            panic!("expected Upgraded, got {:?}", outcome);
        };
        assert_eq!(upgraded.id, user.id);
        assert!(upgraded.is_admin);
        assert_eq!(upgraded.password_hash, "$argon2id$unchanged");
    }

    #[tokio::test]
    async fn test_existing_admin_is_unchanged() {
        let directory = MemoryAccountDirectory::new();
        let admin = directory
            .insert(NewPrincipal::new("admin", "h").with_admin(true))
            .await
            .unwrap();

        let outcome = ensure_admin(&directory, config("admin", "admin1234"))
            .await
            .unwrap();
        assert_eq!(outcome, AdminOutcome::AlreadyAdmin(admin));
    }

    #[tokio::test]
    async fn test_rejects_weak_password() {
        let directory = MemoryAccountDirectory::new();
        let err = ensure_admin(&directory, config("admin", "abc"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least 4 characters"));
        assert!(directory.list().await.unwrap().is_empty());
    }
}
