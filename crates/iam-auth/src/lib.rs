//! # IAM Auth
//!
//! 인증 및 권한 부여 엔진.
//!
//! # 구성 요소
//!
//! - [`password`]: Argon2id 비밀번호 해싱/검증
//! - [`token`]: Access/Refresh 토큰 발급·검증·갱신 ([`TokenService`])
//! - [`resolver`]: 유효 권한 집합 계산 ([`PermissionResolver`])
//! - [`gate`]: 요청 단위 허용/거부 판정
//! - [`service`]: 로그인/가입/세션 갱신/로그아웃 오케스트레이션 ([`AuthService`])
//! - [`principals`]: 관리자용 principal 운영 ([`PrincipalService`])
//! - [`setup`]: 기본 역할/그룹/권한 시딩
//!
//! 세션 상태 기계는 단순합니다:
//! `Unauthenticated → Authenticated(로그인/갱신 성공) → Unauthenticated(로그아웃
//! 또는 만료)`. 실패한 로그인은 상태를 바꾸지 않습니다.

pub mod gate;
pub mod password;
pub mod principals;
pub mod resolver;
pub mod service;
pub mod setup;
pub mod token;

pub use gate::authorize;
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
pub use principals::{PrincipalService, ProfileUpdate};
pub use resolver::PermissionResolver;
pub use service::{AuthService, AuthSession, NewPrincipal};
pub use setup::initialize_defaults;
pub use token::{AccessClaims, RefreshClaims, TokenConfig, TokenPair, TokenService};
