//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 로드합니다.
//!
//! 로드 순서 (뒤의 소스가 앞의 값을 덮어씀):
//! 1. 기본값
//! 2. `config/default.toml` (선택적)
//! 3. `BOOTLANG__` 접두사 환경 변수 (예: `BOOTLANG__SERVER__PORT=9000`)
//! 4. 기존 배포에서 쓰던 환경 변수 (`DATABASE_URL`, `JWT_SECRET_KEY` 등)

use std::net::SocketAddr;
use std::path::Path;

use chrono::Duration;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::{LogConfig, LogFormat};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 예전 배포 설정 파일에 들어 있던 플레이스홀더 시크릿. 운영 환경에서 거부됩니다.
pub const PLACEHOLDER_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// 개발 환경 전용 시크릿. 운영 환경에서는 거부됩니다.
/// 토큰 유효 시간 상한 (1년).
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

const DEVELOPMENT_JWT_SECRET: &str = "bootlang-development-secret-do-not-use-in-production";

/// 실행 환경.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnvironment::Production)
    }
}

/// 프로세스 시작 시 한 번 로드되는 전체 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 실행 환경
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    /// 서버 설정
    pub server: ServerConfig,
    /// 없으면 인메모리 저장소
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS 허용 origin 목록
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// 전역 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// `host:port`를 파싱합니다. 호스트는 IP 리터럴이어야 합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// PostgreSQL 연결 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 인메모리 저장소를 사용합니다.
    #[serde(default)]
    pub url: Option<String>,
    pub max_connections: u32,
    /// 풀에서 연결을 얻을 때까지 기다리는 시간 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 인증 설정 (역직렬화된 그대로의 값).
///
/// 실제 사용 시에는 [`AppConfig::auth_config`]로 검증된 [`AuthConfig`]를 얻습니다.
#[derive(Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// JWT 서명 시크릿
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// 서명 알고리즘 (HS256/HS384/HS512)
    pub jwt_algorithm: String,
    /// 토큰 유효 시간 (시간)
    pub jwt_expiration_hours: i64,
    /// 만료 판정 시 허용할 시계 오차 (초)
    #[serde(default)]
    pub jwt_leeway_secs: u64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("jwt_leeway_secs", &self.jwt_leeway_secs)
            .finish()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_algorithm: "HS256".to_string(),
            jwt_expiration_hours: 24,
            jwt_leeway_secs: 0,
        }
    }
}

/// HMAC-SHA2 계열 서명 알고리즘.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl std::str::FromStr for SigningAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(ConfigError::Invalid(format!(
                "unsupported JWT algorithm '{}': only HS256, HS384 and HS512 are allowed",
                other
            ))),
        }
    }
}

/// 검증된 인증 설정.
///
/// 프로세스 시작 시 한 번 생성되며 이후 읽기 전용으로 사용됩니다.
#[derive(Debug)]
pub struct AuthConfig {
    /// 서명 시크릿 (로그에 노출되지 않음)
    pub secret: SecretString,
    /// 서명 알고리즘
    pub algorithm: SigningAlgorithm,
    /// 기본 토큰 유효 시간
    pub token_ttl: Duration,
    /// 만료 판정 시 허용 오차 (초)
    pub leeway_secs: u64,
    /// 개발용 대체 시크릿 사용 여부
    pub using_development_secret: bool,
}

impl AuthConfig {
    /// 테스트/도구용 설정 생성.
    pub fn new(secret: impl Into<String>, token_ttl: Duration) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            algorithm: SigningAlgorithm::Hs256,
            token_ttl,
            leeway_secs: 0,
            using_development_secret: false,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// `pretty` | `json` | `compact`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let format = config.format.parse().unwrap_or(LogFormat::Pretty);
        LogConfig::new(config.level.clone()).with_format(format)
    }
}

impl AppConfig {
    /// `config/default.toml`과 환경 변수에서 로드합니다.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 지정한 파일(없어도 됨)과 환경 변수에서 로드하고 값 범위를 검증합니다.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let cors_origins = env_var("CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        let builder = config::Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default(
                "server.cors_origins",
                vec!["http://localhost:3000", "http://localhost:5173"],
            )?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.connection_timeout_secs", 10)?
            .set_default("auth.jwt_algorithm", "HS256")?
            .set_default("auth.jwt_expiration_hours", 24)?
            .set_default("auth.jwt_leeway_secs", 0)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(config::File::from(path.as_ref()).required(false))
            // BOOTLANG__SECTION__KEY
            .add_source(
                config::Environment::with_prefix("BOOTLANG")
                    .separator("__")
                    .try_parsing(true),
            )
            // 기존 환경 변수 이름
            .set_override_option("environment", env_var("APP_ENV").map(|s| s.to_lowercase()))?
            .set_override_option("server.host", env_var("API_HOST"))?
            .set_override_option("server.port", env_var("API_PORT"))?
            .set_override_option("server.cors_origins", cors_origins)?
            .set_override_option("database.url", env_var("DATABASE_URL"))?
            .set_override_option("auth.jwt_secret", env_var("JWT_SECRET_KEY"))?
            .set_override_option("auth.jwt_algorithm", env_var("JWT_ALGORITHM"))?
            .set_override_option("auth.jwt_expiration_hours", env_var("JWT_EXPIRATION_HOURS"))?
            .set_override_option("logging.level", env_var("RUST_LOG"))?
            .set_override_option("logging.format", env_var("LOG_FORMAT"))?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 값 범위를 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.token_ttl()?;
        self.auth.jwt_algorithm.parse::<SigningAlgorithm>()?;
        Ok(())
    }

    /// `auth.jwt_expiration_hours`를 1..=[`MAX_JWT_EXPIRATION_HOURS`] 범위에서 변환합니다.
    fn token_ttl(&self) -> Result<Duration, ConfigError> {
        let hours = self.auth.jwt_expiration_hours;
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_expiration_hours must be between 1 and {}, got {}",
                MAX_JWT_EXPIRATION_HOURS, hours
            )));
        }
        Duration::try_hours(hours).ok_or_else(|| {
            ConfigError::Invalid(format!("auth.jwt_expiration_hours out of range: {}", hours))
        })
    }

    /// 검증된 인증 설정을 생성합니다.
    ///
    /// 시크릿이 없거나 플레이스홀더 값이면 운영 환경에서는
    /// [`ConfigError::InsecureSecret`]를 반환하고, 그 외 환경에서는
    /// 경고를 남긴 뒤 개발용 시크릿을 사용합니다.
    pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        let algorithm = self.auth.jwt_algorithm.parse::<SigningAlgorithm>()?;
        let token_ttl = self.token_ttl()?;

        let configured = self
            .auth
            .jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != PLACEHOLDER_JWT_SECRET);

        let (secret, using_development_secret) = match configured {
            Some(secret) => (secret.to_string(), false),
            None if self.environment.is_production() => {
                return Err(ConfigError::InsecureSecret);
            }
            None => {
                tracing::warn!(
                    environment = ?self.environment,
                    "JWT_SECRET_KEY not set or insecure, using development secret (INSECURE, never use in production)"
                );
                (DEVELOPMENT_JWT_SECRET.to_string(), true)
            }
        };

        Ok(AuthConfig {
            secret: SecretString::from(secret),
            algorithm,
            token_ttl,
            leeway_secs: self.auth.jwt_leeway_secs,
            using_development_secret,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
