//! 인메모리 계정 저장소.
//!
//! `DATABASE_URL`이 없을 때(개발)와 테스트에서 사용합니다.
//! 프로세스 종료 시 데이터가 사라집니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bootlang_core::{
    AccountDirectory, DirectoryError, DirectoryResult, NewPrincipal, Principal, UniqueField,
};
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Accounts {
    next_id: i64,
    by_id: BTreeMap<i64, Principal>,
}

impl Accounts {
    /// `except_id`를 제외한 레코드와 유일성 충돌을 검사합니다.
    fn check_unique(
        &self,
        username: &str,
        email: Option<&str>,
        except_id: Option<i64>,
    ) -> DirectoryResult<()> {
        for existing in self.by_id.values() {
            if Some(existing.id) == except_id {
                continue;
            }
            if existing.username == username {
                return Err(DirectoryError::Duplicate(UniqueField::Username));
            }
            if email.is_some() && existing.email.as_deref() == email {
                return Err(DirectoryError::Duplicate(UniqueField::Email));
            }
        }
        Ok(())
    }

    /// 쓰기 잠금 안에서 한 레코드를 고치고 `updated_at`을 갱신합니다.
    fn modify(
        &mut self,
        id: i64,
        change: impl FnOnce(&mut Principal),
    ) -> DirectoryResult<Principal> {
        let stored = self
            .by_id
            .get_mut(&id)
            .ok_or(DirectoryError::NotFound(id))?;
        change(stored);
        stored.updated_at = Utc::now().max(stored.updated_at);
        Ok(stored.clone())
    }
}

/// `RwLock`으로 보호되는 인메모리 저장소.
#[derive(Debug)]
pub struct MemoryAccountDirectory {
    accounts: RwLock<Accounts>,
}

impl Default for MemoryAccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(Accounts {
                next_id: 1,
                by_id: BTreeMap::new(),
            }),
        }
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_id(&self, id: i64) -> DirectoryResult<Option<Principal>> {
        Ok(self.accounts.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<Principal>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .by_id
            .values()
            .find(|p| p.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<Principal>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .by_id
            .values()
            .find(|p| p.email.as_deref() == Some(email))
            .cloned())
    }

    async fn list(&self) -> DirectoryResult<Vec<Principal>> {
        Ok(self.accounts.read().await.by_id.values().cloned().collect())
    }

    async fn insert(&self, new: NewPrincipal) -> DirectoryResult<Principal> {
        let mut accounts = self.accounts.write().await;
        accounts.check_unique(&new.username, new.email.as_deref(), None)?;

        let now = Utc::now();
        let principal = Principal {
            id: accounts.next_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            is_admin: new.is_admin,
            created_at: now,
            updated_at: now,
        };
        accounts.next_id += 1;
        accounts.by_id.insert(principal.id, principal.clone());

        tracing::info!(user_id = principal.id, "User created");
        Ok(principal)
    }

    async fn update_profile(
        &self,
        id: i64,
        username: Option<&str>,
        email: Option<&str>,
    ) -> DirectoryResult<Principal> {
        let mut accounts = self.accounts.write().await;
        let current = accounts
            .by_id
            .get(&id)
            .ok_or(DirectoryError::NotFound(id))?;

        let username = username.unwrap_or(current.username.as_str()).to_string();
        let email = email.map(str::to_string).or_else(|| current.email.clone());
        accounts.check_unique(&username, email.as_deref(), Some(id))?;

        accounts.modify(id, |stored| {
            stored.username = username;
            stored.email = email;
        })
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> DirectoryResult<Principal> {
        let mut accounts = self.accounts.write().await;
        accounts.modify(id, |stored| stored.password_hash = password_hash.to_string())
    }

    async fn set_admin(&self, id: i64, is_admin: bool) -> DirectoryResult<Principal> {
        let mut accounts = self.accounts.write().await;
        accounts.modify(id, |stored| stored.is_admin = is_admin)
    }

    async fn delete(&self, principal: &Principal) -> DirectoryResult<()> {
        let mut accounts = self.accounts.write().await;
        accounts
            .by_id
            .remove(&principal.id)
            .ok_or(DirectoryError::NotFound(principal.id))?;

        tracing::info!(user_id = principal.id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let directory = MemoryAccountDirectory::new();
        let alice = directory
            .insert(NewPrincipal::new("alice", "h1"))
            .await
            .unwrap();
        let bob = directory
            .insert(NewPrincipal::new("bob", "h2").with_admin(true))
            .await
            .unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert!(bob.is_admin);
        assert_eq!(alice.created_at, alice.updated_at);

        let listed = directory.list().await.unwrap();
        assert_eq!(listed, vec![alice, bob]);
    }

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let directory = MemoryAccountDirectory::new();
        directory
            .insert(NewPrincipal::new("alice", "h").with_email(Some("a@example.com".into())))
            .await
            .unwrap();

        let err = directory
            .insert(NewPrincipal::new("alice", "h"))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Duplicate(UniqueField::Username)));

        let err = directory
            .insert(NewPrincipal::new("bob", "h").with_email(Some("a@example.com".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Duplicate(UniqueField::Email)));

        // 대소문자 구분
        assert!(directory
            .insert(NewPrincipal::new("Alice", "h"))
            .await
            .is_ok());

        // 이메일 없는 계정은 여러 개 가능
        assert!(directory.insert(NewPrincipal::new("carol", "h")).await.is_ok());
        assert!(directory.insert(NewPrincipal::new("dave", "h")).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_methods() {
        let directory = MemoryAccountDirectory::new();
        let alice = directory
            .insert(NewPrincipal::new("alice", "h").with_email(Some("a@example.com".into())))
            .await
            .unwrap();

        assert_eq!(directory.find_by_id(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(
            directory.find_by_username("alice").await.unwrap(),
            Some(alice.clone())
        );
        assert_eq!(
            directory.find_by_email("a@example.com").await.unwrap(),
            Some(alice)
        );
        assert_eq!(directory.find_by_id(99).await.unwrap(), None);
        assert_eq!(directory.find_by_username("ALICE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_profile_touches_only_given_columns() {
        let directory = MemoryAccountDirectory::new();
        let alice = directory
            .insert(NewPrincipal::new("alice", "h").with_email(Some("a@example.com".into())))
            .await
            .unwrap();
        directory.insert(NewPrincipal::new("bob", "h")).await.unwrap();

        let updated = directory
            .update_profile(alice.id, Some("alice2"), None)
            .await
            .unwrap();
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.email.as_deref(), Some("a@example.com"));
        assert_eq!(updated.created_at, alice.created_at);
        assert!(updated.updated_at >= alice.updated_at);

        let err = directory
            .update_profile(alice.id, Some("bob"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Duplicate(UniqueField::Username)));

        // 자기 자신의 값은 충돌이 아님
        assert!(directory
            .update_profile(alice.id, Some("alice2"), Some("a@example.com"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_profile_update_keeps_concurrent_password_reset() {
        let directory = MemoryAccountDirectory::new();
        let alice = directory
            .insert(NewPrincipal::new("alice", "old-hash"))
            .await
            .unwrap();

        // 요청 A가 alice를 읽은 뒤, 요청 B가 비밀번호를 초기화
        let snapshot = directory.find_by_id(alice.id).await.unwrap().unwrap();
        directory.set_password_hash(alice.id, "reset-hash").await.unwrap();

        // 요청 A는 사용자명만 바꿈
        directory
            .update_profile(snapshot.id, Some("alice2"), None)
            .await
            .unwrap();

        let stored = directory.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.username, "alice2");
        assert_eq!(stored.password_hash, "reset-hash");
    }

    #[tokio::test]
    async fn test_password_change_keeps_concurrent_profile_and_admin_updates() {
        let directory = MemoryAccountDirectory::new();
        let alice = directory.insert(NewPrincipal::new("alice", "h")).await.unwrap();

        directory
            .update_profile(alice.id, None, Some("alice@example.com"))
            .await
            .unwrap();
        directory.set_admin(alice.id, true).await.unwrap();
        let stored = directory.set_password_hash(alice.id, "h2").await.unwrap();

        assert_eq!(stored.username, "alice");
        assert_eq!(stored.email.as_deref(), Some("alice@example.com"));
        assert!(stored.is_admin);
        assert_eq!(stored.password_hash, "h2");
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let directory = MemoryAccountDirectory::new();
        let alice = directory.insert(NewPrincipal::new("alice", "h")).await.unwrap();

        directory.delete(&alice).await.unwrap();
        assert_eq!(directory.find_by_id(alice.id).await.unwrap(), None);

        let err = directory.delete(&alice).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(1)));
        let err = directory.set_password_hash(alice.id, "h2").await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(1)));
        let err = directory
            .update_profile(alice.id, Some("alice2"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(1)));

        // 삭제된 ID는 재사용하지 않음
        let bob = directory.insert(NewPrincipal::new("bob", "h")).await.unwrap();
        assert_eq!(bob.id, 2);
    }
}
