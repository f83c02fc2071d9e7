//! IAM 시스템의 에러 타입.
//!
//! 이 모듈은 인증/권한 시스템 전반에서 사용되는 에러 타입을 정의합니다.
//! 계정 열거(account enumeration) 공격을 막기 위해 `InvalidCredentials`는
//! 이메일 없음/비활성 계정/비밀번호 불일치를 구분하지 않습니다.

use thiserror::Error;

/// 핵심 IAM 에러.
#[derive(Debug, Error)]
pub enum IamError {
    /// 잘못된 인증 정보 (이메일 없음 / 비활성 계정 / 비밀번호 불일치 공통)
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 이미 등록된 이메일
    #[error("이미 등록된 이메일입니다")]
    DuplicateEmail,

    /// 유효하지 않은 토큰 (서명 불일치, 형식 오류, 알 수 없는 principal 포함)
    #[error("유효하지 않은 토큰입니다")]
    TokenInvalid,

    /// 만료된 토큰
    #[error("토큰이 만료되었습니다")]
    TokenExpired,

    /// principal을 찾을 수 없음
    #[error("사용자를 찾을 수 없습니다")]
    PrincipalNotFound,

    /// 권한 거부
    #[error("권한이 없습니다: {0}")]
    PermissionDenied(String),

    /// 역할/그룹/권한 참조가 존재하지 않음 (관리 작업)
    #[error("존재하지 않는 참조입니다: {0}")]
    ReferenceNotFound(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 저장소 에러
    #[error("저장소 에러: {0}")]
    Store(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// IAM 작업을 위한 Result 타입.
pub type IamResult<T> = Result<T, IamError>;

impl IamError {
    /// 인증 실패(401 계열)인지 확인합니다.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            IamError::InvalidCredentials | IamError::TokenInvalid | IamError::TokenExpired
        )
    }

    /// 호출자 잘못(4xx 계열)인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            IamError::Store(_) | IamError::Config(_) | IamError::Internal(_)
        )
    }
}

impl From<serde_json::Error> for IamError {
    fn from(err: serde_json::Error) -> Self {
        IamError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for IamError {
    fn from(err: config::ConfigError) -> Self {
        IamError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_classification() {
        assert!(IamError::InvalidCredentials.is_unauthenticated());
        assert!(IamError::TokenExpired.is_unauthenticated());
        assert!(!IamError::DuplicateEmail.is_unauthenticated());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(IamError::DuplicateEmail.is_client_error());
        assert!(IamError::PermissionDenied("manage:users".into()).is_client_error());
        assert!(!IamError::Store("connection refused".into()).is_client_error());
    }

    #[test]
    fn test_invalid_credentials_message_is_uniform() {
        // 계정 열거 방지: 원인과 무관하게 항상 같은 메시지
        let msg = IamError::InvalidCredentials.to_string();
        assert_eq!(msg, "이메일 또는 비밀번호가 올바르지 않습니다");
    }
}
