//! Axum용 JWT 인증 추출기.
//!
//! Authorization 헤더의 Bearer 토큰을 검증하고, 활성 계정을 로드해
//! 핸들러에 주입합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn me_handler(AuthPrincipal(principal): AuthPrincipal) -> impl IntoResponse {
//!     Json(PrincipalProfile::from(&principal))
//! }
//! ```

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use iam_auth::authorize;
use iam_core::domain::{PermissionName, Principal};
use iam_core::error::IamError;

use crate::error::ApiError;
use crate::state::AppState;

/// 인증된 principal 추출기.
///
/// 토큰 검증과 계정 로드의 모든 실패는 [`IamError::TokenInvalid`]로
/// 수렴합니다 (만료만 별도 코드). 유효한 토큰이라도 그 사이 비활성화되거나
/// 삭제된 계정은 거부됩니다.
pub struct AuthPrincipal(pub Principal);

impl FromRequestParts<Arc<AppState>> for AuthPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError(IamError::TokenInvalid))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError(IamError::TokenInvalid))?;

        let id = state.tokens.verify_access(token).map_err(IamError::from)?;

        let principal = state
            .principal_store
            .find_by_id(id)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?
            .ok_or(IamError::TokenInvalid)?;

        if !principal.is_active {
            return Err(ApiError(IamError::TokenInvalid));
        }

        Ok(AuthPrincipal(principal))
    }
}

/// `manage:users` 권한을 요구하는 관리자 추출기.
pub struct AdminPrincipal(pub Principal);

impl FromRequestParts<Arc<AppState>> for AdminPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthPrincipal(principal) = AuthPrincipal::from_request_parts(parts, state).await?;

        let manage_users = PermissionName::parse("manage:users")?;
        authorize(&state.resolver, &principal, &manage_users).await?;

        Ok(AdminPrincipal(principal))
    }
}
