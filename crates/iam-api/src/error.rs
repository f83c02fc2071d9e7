//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 에러 형식을 제공합니다.
//!
//! # 예시
//!
//! ```json
//! {
//!   "code": "DUPLICATE_EMAIL",
//!   "message": "이미 등록된 이메일입니다",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use iam_core::error::IamError;

/// 통합 API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_CREDENTIALS", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

/// 핸들러 에러. [`IamError`]를 HTTP 상태 코드와 응답 본문으로 변환합니다.
#[derive(Debug)]
pub struct ApiError(pub IamError);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<IamError> for ApiError {
    fn from(err: IamError) -> Self {
        Self(err)
    }
}

/// 도메인 에러 → (HTTP 상태, 에러 코드) 매핑.
fn status_and_code(err: &IamError) -> (StatusCode, &'static str) {
    match err {
        IamError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
        IamError::TokenInvalid => (StatusCode::UNAUTHORIZED, "TOKEN_INVALID"),
        IamError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
        IamError::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_EMAIL"),
        IamError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
        IamError::PrincipalNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        IamError::ReferenceNotFound(_) => (StatusCode::BAD_REQUEST, "REFERENCE_NOT_FOUND"),
        IamError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        IamError::Store(_) | IamError::Config(_) | IamError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self.0);

        // 5xx는 내부 원인을 본문에 노출하지 않는다
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "internal error");
            "내부 서버 오류".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ApiErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (IamError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (IamError::TokenInvalid, StatusCode::UNAUTHORIZED),
            (IamError::TokenExpired, StatusCode::UNAUTHORIZED),
            (IamError::DuplicateEmail, StatusCode::CONFLICT),
            (
                IamError::PermissionDenied("read:x".into()),
                StatusCode::FORBIDDEN,
            ),
            (IamError::PrincipalNotFound, StatusCode::NOT_FOUND),
            (
                IamError::ReferenceNotFound("role".into()),
                StatusCode::BAD_REQUEST,
            ),
            (IamError::InvalidInput("email".into()), StatusCode::BAD_REQUEST),
            (IamError::Store("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(status_and_code(&err).0, expected);
        }
    }

    #[test]
    fn test_server_errors_hide_internal_message() {
        let response = ApiError(IamError::Store("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_response_serialization_skips_empty_fields() {
        let error = ApiErrorResponse {
            code: "NOT_FOUND".into(),
            message: "없음".into(),
            details: None,
            timestamp: None,
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains("details"));
        assert!(!json.contains("timestamp"));
    }
}
