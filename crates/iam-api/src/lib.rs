//! IAM REST API 서버 라이브러리.
//!
//! Axum 기반 REST API 서버의 구성 요소를 제공합니다.
//! 인증(`/api/v1/auth`)과 principal 관리(`/api/v1/principals`) 엔드포인트,
//! JWT 추출기와 통합 에러 응답을 포함합니다.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use extract::{AdminPrincipal, AuthPrincipal};
pub use routes::create_api_router;
pub use state::AppState;
