//! 자격 증명 해싱.
//!
//! Argon2id, 고정 비용(m=19456 KiB, t=2, p=1). 결과는 PHC 문자열로 저장됩니다.
//! 해싱/검증은 CPU를 오래 점유하므로 핸들러에서는 `*_blocking` 버전을 사용합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2 메모리 비용 (KiB).
pub const MEMORY_COST_KIB: u32 = 19_456;
/// Argon2 반복 횟수.
pub const TIME_COST: u32 = 2;
/// Argon2 병렬도.
pub const PARALLELISM: u32 = 1;

/// 비밀번호 최소 길이 (문자 수).
pub const MIN_PASSWORD_CHARS: usize = 4;

/// 해싱/검증 실패.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    HashingFailed,
    #[error("stored password hash is malformed")]
    MalformedHash,
    #[error("password task was cancelled")]
    TaskCancelled,
}

/// 고정 비용 파라미터로 구성한 Argon2id 해셔.
fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|_| PasswordError::HashingFailed)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 새 솔트로 해시합니다. 같은 입력이어도 매번 다른 문자열이 나옵니다.
///
/// 결과 예: `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<digest>`
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 해시의 솔트/비용으로 다시 계산해 상수 시간 비교합니다.
///
/// 파싱은 되지만 이 해셔가 다룰 수 없는 해시(다른 알고리즘 태그)는 `Ok(false)`,
/// PHC 문자열이 아니면 `Err(MalformedHash)`입니다.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let stored = PasswordHash::new(hash).map_err(|_| PasswordError::MalformedHash)?;

    // 비용 파라미터는 `stored`에 기록된 값을 따름
    let matches = Argon2::default()
        .verify_password(password.as_bytes(), &stored)
        .is_ok();
    Ok(matches)
}

/// [`hash_password`]를 블로킹 스레드 풀에서 실행합니다.
///
/// 핸들러가 런타임 워커를 점유하지 않도록 합니다. 퓨처를 drop하면 결과는 버려집니다.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| PasswordError::TaskCancelled)?
}

/// [`verify_password`]를 블로킹 스레드 풀에서 실행합니다.
pub async fn verify_password_blocking(
    password: String,
    hash: String,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|_| PasswordError::TaskCancelled)?
}

/// 최소 길이 규칙. 바이트가 아니라 유니코드 문자 수로 셉니다.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err("Password must be at least 4 characters long");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_embeds_algorithm_and_cost() {
        let stored = hash_password("pass1234").unwrap();
        assert!(stored.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));

        assert!(verify_password("pass1234", &stored).unwrap());
        assert!(!verify_password("pass12345", &stored).unwrap());
    }

    #[test]
    fn test_fresh_salt_per_call() {
        let first = hash_password("alice-pw").unwrap();
        let second = hash_password("alice-pw").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("alice-pw", &first).unwrap());
        assert!(verify_password("alice-pw", &second).unwrap());
    }

    #[test]
    fn test_unparseable_hash_is_malformed() {
        for garbage in ["not-a-valid-hash", "", "$"] {
            assert!(matches!(
                verify_password("password", garbage),
                Err(PasswordError::MalformedHash)
            ));
        }
    }

    #[test]
    fn test_unsupported_algorithm_returns_false() {
        // PHC 문자열로는 유효하지만 Argon2가 처리할 수 없는 알고리즘
        let foreign = "$scrypt$ln=15,r=8,p=1$c2FsdHNhbHQ$ZGlnZXN0ZGlnZXN0ZGlnZXN0";
        assert!(!verify_password("password", foreign).unwrap());
    }

    #[test]
    fn test_minimum_length_rule() {
        assert!(validate_password_strength("pass").is_ok());
        assert_eq!(
            validate_password_strength("abc"),
            Err("Password must be at least 4 characters long")
        );
        assert!(validate_password_strength("").is_err());

        assert!(validate_password_strength("한글비번").is_ok());
        assert!(validate_password_strength("한글").is_err());
    }

    #[test]
    fn test_non_ascii_round_trip() {
        let stored = hash_password("비밀번호-123").unwrap();
        assert!(verify_password("비밀번호-123", &stored).unwrap());
        assert!(!verify_password("비밀번호-124", &stored).unwrap());
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("pass1234".to_string()).await.unwrap();
        assert!(verify_password_blocking("pass1234".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("wrong".to_string(), hash)
            .await
            .unwrap());
    }

    proptest! {
        // Argon2는 느리므로 케이스 수를 제한
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_hash_verifies_only_own_password(
            p1 in "\\PC{1,24}",
            p2 in "\\PC{1,24}",
        ) {
            let hash = hash_password(&p1).unwrap();
            prop_assert!(verify_password(&p1, &hash).unwrap());
            if p1 != p2 {
                prop_assert!(!verify_password(&p2, &hash).unwrap());
            }
        }
    }
}
