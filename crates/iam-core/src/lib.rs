//! # IAM Core
//!
//! IAM 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 인증/권한 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - Principal(사용자), Role, Group, Permission 도메인 모델
//! - 검증된 권한 이름 타입 (`action:resource`)
//! - 저장소 추상화 trait
//! - 기본 역할/그룹/권한 카탈로그
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod defaults;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use defaults::DefaultCatalog;
pub use domain::*;
pub use error::*;
pub use logging::*;
