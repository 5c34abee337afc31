//! 계정 저장소 추상화.
//!
//! 인증 코어는 이 트레이트를 통해서만 사용자 레코드에 접근합니다.
//! 유일성 제약(사용자명, 이메일)과 호출 단위 원자성은 구현체가 보장합니다.
//! 갱신 메서드는 레코드 전체가 아니라 해당 컬럼만 씁니다.

use async_trait::async_trait;

use super::{NewPrincipal, Principal};
use crate::error::DirectoryResult;

/// 사용자 계정 CRUD 저장소.
///
/// 유일성 위반은 [`DirectoryError::Duplicate`](crate::DirectoryError::Duplicate)로 보고합니다.
/// 사용자명과 이메일 비교는 대소문자를 구분합니다.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// 저장소 구현 이름 (로그/헬스 체크용).
    fn backend_name(&self) -> &'static str;

    /// ID로 사용자 조회.
    async fn find_by_id(&self, id: i64) -> DirectoryResult<Option<Principal>>;

    /// 사용자명으로 조회.
    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<Principal>>;

    /// 이메일로 조회.
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<Principal>>;

    /// 모든 사용자를 ID 순으로 조회.
    async fn list(&self) -> DirectoryResult<Vec<Principal>>;

    /// 새 사용자 저장. 생성/변경 시각은 저장소가 설정합니다.
    async fn insert(&self, new: NewPrincipal) -> DirectoryResult<Principal>;

    /// 사용자명/이메일 중 `Some`인 컬럼만 바꿉니다.
    ///
    /// 나머지 컬럼은 저장소의 현재 값을 유지하므로 동시에 실행된
    /// 비밀번호 변경을 덮어쓰지 않습니다.
    async fn update_profile(
        &self,
        id: i64,
        username: Option<&str>,
        email: Option<&str>,
    ) -> DirectoryResult<Principal>;

    /// 비밀번호 해시만 교체합니다.
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> DirectoryResult<Principal>;

    /// 관리자 여부만 바꿉니다.
    async fn set_admin(&self, id: i64, is_admin: bool) -> DirectoryResult<Principal>;

    /// 사용자 삭제.
    async fn delete(&self, principal: &Principal) -> DirectoryResult<()>;

    /// 저장소 연결 상태 확인.
    async fn health_check(&self) -> bool {
        true
    }
}
