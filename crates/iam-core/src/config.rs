//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 토큰 서명 비밀 키는 전역 가변 상태가 아닌, 시작 시 한 번 로드되어
//! 토큰 서비스에 주입되는 설정 객체로 모델링됩니다.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 토큰 설정
    pub auth: AuthConfig,
    /// 비밀번호 해싱 설정
    #[serde(default)]
    pub password: PasswordConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 기본 역할/그룹 설정
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

/// 토큰 설정.
///
/// Access/Refresh 서명 키는 서로 다른 비밀 키를 사용하며,
/// 프로세스 수명 동안 회전되지 않습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Access Token 서명 비밀 키
    pub access_secret: SecretString,
    /// Refresh Token 서명 비밀 키 (access와 반드시 다른 키)
    pub refresh_secret: SecretString,
    /// Access Token 만료 시간 (분)
    #[serde(default = "default_access_expires")]
    pub access_expires_minutes: i64,
    /// Refresh Token 만료 시간 (일)
    #[serde(default = "default_refresh_expires")]
    pub refresh_expires_days: i64,
}

fn default_access_expires() -> i64 {
    15
}

fn default_refresh_expires() -> i64 {
    7
}

/// 비밀번호 해싱 설정 (Argon2id 작업 계수).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// 메모리 비용 (KiB)
    pub memory_kib: u32,
    /// 반복 횟수
    pub iterations: u32,
    /// 병렬도
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // Argon2id v19 기본 파라미터 (m=19456, t=2, p=1)
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
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

/// 기본 역할/그룹 설정.
///
/// 가입 시 역할/그룹이 지정되지 않으면 이 값이 할당됩니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    /// 기본 역할 이름
    pub default_role: String,
    /// 기본 그룹 이름
    pub default_group: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            default_role: "USER".to_string(),
            default_group: "GENERAL".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("IAM")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
