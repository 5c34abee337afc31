//! JWT 토큰 처리.
//!
//! 세션 토큰 발급/검증. 토큰은 서버에 저장되지 않으며
//! `exp` 비교만으로 만료됩니다.

use bootlang_core::{AuthConfig, SigningAlgorithm};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 세션 토큰 클레임.
///
/// 호출자가 채우는 부분이며 `exp`는 발급 시 코덱이 추가합니다.
/// 알 수 없는 클레임은 `extra`에 그대로 보존됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID (문자열)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// 사용자 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// 관리자 여부
    #[serde(default)]
    pub is_admin: bool,
    /// 기타 클레임
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// 사용자 식별 클레임 생성.
    pub fn for_user(user_id: i64, username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            sub: Some(user_id.to_string()),
            username: Some(username.into()),
            is_admin,
            extra: Map::new(),
        }
    }

    /// `sub`를 정수 사용자 ID로 해석.
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.as_deref().and_then(|s| s.parse().ok())
    }
}

/// 검증을 통과한 클레임 (만료 시각 포함).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedClaims {
    #[serde(flatten)]
    pub claims: Claims,
    /// Expiration (Unix timestamp, 초)
    pub exp: i64,
}

/// JWT 토큰 생성 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
}

/// 세션 토큰 서명/검증기.
///
/// 프로세스 시작 시 한 번 생성되어 `Arc`로 공유됩니다.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    default_ttl: Duration,
    leeway_secs: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

fn jwt_algorithm(algorithm: SigningAlgorithm) -> Algorithm {
    match algorithm {
        SigningAlgorithm::Hs256 => Algorithm::HS256,
        SigningAlgorithm::Hs384 => Algorithm::HS384,
        SigningAlgorithm::Hs512 => Algorithm::HS512,
    }
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        let algorithm = jwt_algorithm(config.algorithm);

        // 설정된 알고리즘만 허용, exp 필수
        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
            default_ttl: config.token_ttl,
            leeway_secs: config.leeway_secs,
        }
    }

    /// 기본 토큰 유효 시간.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// 토큰 발급.
    ///
    /// `claims`를 복사해 `exp = now + ttl`을 추가한 뒤 서명합니다.
    /// 호출자가 `extra`에 넣은 `exp`는 무시됩니다.
    pub fn issue(&self, claims: &Claims, ttl: Duration) -> Result<String, JwtError> {
        let mut claims = claims.clone();
        claims.extra.remove("exp");

        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(JwtError::ExpiryOutOfRange)?;

        let payload = VerifiedClaims {
            claims,
            exp: expires_at.timestamp(),
        };

        Ok(encode(
            &Header::new(self.algorithm),
            &payload,
            &self.encoding_key,
        )?)
    }

    /// 기본 유효 시간으로 토큰 발급.
    pub fn issue_default(&self, claims: &Claims) -> Result<String, JwtError> {
        self.issue(claims, self.default_ttl)
    }

    /// 토큰 검증.
    ///
    /// 서명 불일치, 형식 오류, 알고리즘 불일치, `exp` 누락, 만료는
    /// 모두 `None`으로 합쳐집니다. `exp == now`인 토큰은 만료로 봅니다.
    pub fn verify(&self, token: &str) -> Option<VerifiedClaims> {
        let data = decode::<VerifiedClaims>(token, &self.decoding_key, &self.validation).ok()?;

        // jsonwebtoken은 exp < now - leeway만 거부하므로 경계값을 직접 처리
        let now = Utc::now().timestamp();
        let leeway = i64::try_from(self.leeway_secs).unwrap_or(i64::MAX);
        if data.claims.exp.saturating_add(leeway) <= now {
            return None;
        }

        Some(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::new("test-secret-key", Duration::hours(24)))
    }

    fn codec_with(secret: &str, algorithm: SigningAlgorithm) -> TokenCodec {
        let mut config = AuthConfig::new(secret, Duration::hours(24));
        config.algorithm = algorithm;
        TokenCodec::new(&config)
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = codec();
        let claims = Claims::for_user(1, "alice", false);

        let token = codec.issue_default(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let verified = codec.verify(&token).unwrap();
        assert_eq!(verified.claims, claims);
        assert_eq!(verified.claims.subject_id(), Some(1));

        let expected_exp = (Utc::now() + Duration::hours(24)).timestamp();
        assert!((verified.exp - expected_exp).abs() <= 2);
    }

    #[test]
    fn test_extra_claims_preserved() {
        let codec = codec();
        let mut claims = Claims::for_user(7, "bob", true);
        claims
            .extra
            .insert("scope".to_string(), Value::String("lab".to_string()));
        claims.extra.insert("exp".to_string(), Value::from(1));

        let token = codec.issue(&claims, Duration::minutes(5)).unwrap();
        let verified = codec.verify(&token).unwrap();

        assert_eq!(
            verified.claims.extra.get("scope"),
            Some(&Value::String("lab".to_string()))
        );
        // 호출자의 exp는 무시됨
        assert!(!verified.claims.extra.contains_key("exp"));
        assert!(verified.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let claims = Claims::for_user(1, "alice", false);

        let token = codec.issue(&claims, Duration::seconds(-1)).unwrap();
        assert!(codec.verify(&token).is_none());
    }

    #[test]
    fn test_token_expiring_now_rejected() {
        let codec = codec();
        let claims = Claims::for_user(1, "alice", false);

        let token = codec.issue(&claims, Duration::zero()).unwrap();
        assert!(codec.verify(&token).is_none());
    }

    #[test]
    fn test_leeway_accepts_recently_expired() {
        let mut config = AuthConfig::new("test-secret-key", Duration::hours(1));
        config.leeway_secs = 60;
        let codec = TokenCodec::new(&config);

        let token = codec
            .issue(&Claims::for_user(1, "alice", false), Duration::seconds(-5))
            .unwrap();
        assert!(codec.verify(&token).is_some());
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let codec = codec();
        let ttl = Duration::try_days(365 * 1_000_000).unwrap();

        let result = codec.issue(&Claims::for_user(1, "alice", false), ttl);
        assert!(matches!(result, Err(JwtError::ExpiryOutOfRange)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = codec();
        let token = codec
            .issue_default(&Claims::for_user(1, "alice", false))
            .unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        for i in signature_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(codec.verify(&tampered).is_none(), "flipped index {}", i);
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec_with("secret-one", SigningAlgorithm::Hs256)
            .issue_default(&Claims::for_user(1, "alice", false))
            .unwrap();

        assert!(codec_with("secret-two", SigningAlgorithm::Hs256)
            .verify(&token)
            .is_none());
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let token = codec_with("shared", SigningAlgorithm::Hs512)
            .issue_default(&Claims::for_user(1, "alice", false))
            .unwrap();

        assert!(codec_with("shared", SigningAlgorithm::Hs256)
            .verify(&token)
            .is_none());
        assert!(codec_with("shared", SigningAlgorithm::Hs512)
            .verify(&token)
            .is_some());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();
        for token in ["", "abc", "a.b", "a.b.c", "...", "Bearer x.y.z"] {
            assert!(codec.verify(token).is_none(), "accepted {:?}", token);
        }
    }

    #[test]
    fn test_non_integer_subject() {
        let claims = Claims {
            sub: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(claims.subject_id(), None);
        assert_eq!(Claims::default().subject_id(), None);
    }

    proptest! {
        #[test]
        fn prop_issue_verify_preserves_claims(
            id in 1i64..1_000_000,
            username in "[a-zA-Z0-9_]{3,50}",
            is_admin in any::<bool>(),
            ttl_secs in 10i64..1_000_000,
        ) {
            let codec = codec();
            let claims = Claims::for_user(id, username, is_admin);
            let token = codec.issue(&claims, Duration::seconds(ttl_secs)).unwrap();

            let verified = codec.verify(&token).unwrap();
            prop_assert_eq!(verified.claims, claims);
        }

        #[test]
        fn prop_verify_never_panics(token in "\\PC{0,200}") {
            prop_assert!(codec().verify(&token).is_none());
        }
    }
}
