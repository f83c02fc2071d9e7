//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크
//! - `/api/v1/auth` - 가입, 로그인, 토큰 갱신, 로그아웃, 내 정보
//! - `/api/v1/principals` - principal 관리 (manage:users 권한 필요)

pub mod auth;
pub mod health;
pub mod principals;

pub use auth::{auth_router, LoginRequest, PasswordChangeRequest, RefreshRequest, RegisterRequest};
pub use health::{health_router, HealthResponse};
pub use principals::{
    principals_router, CreateRequest, GroupsUpdateRequest, ListResponse,
    PermissionsUpdateRequest, ProfileResponse, RolesUpdateRequest, StatusUpdateRequest,
};

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router())
        .nest("/api/v1/principals", principals_router())
}
