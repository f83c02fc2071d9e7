//! 인증 endpoint.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/auth/register` - 가입
//! - `POST /api/v1/auth/login` - 로그인
//! - `POST /api/v1/auth/refresh` - 토큰 갱신
//! - `POST /api/v1/auth/logout` - 로그아웃 (refresh 토큰 무효화)
//! - `GET  /api/v1/auth/me` - 내 프로필 + 유효 권한
//! - `PUT  /api/v1/auth/me` - 내 프로필 수정
//! - `PUT  /api/v1/auth/me/password` - 내 비밀번호 변경

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use iam_auth::principals::ProfileUpdate;
use iam_auth::{AuthSession, NewPrincipal};
use iam_core::domain::{PermissionName, PrincipalProfile};
use iam_core::error::IamError;

use crate::error::ApiResult;
use crate::extract::AuthPrincipal;
use crate::state::AppState;

/// 가입 요청.
///
/// 역할/그룹은 받지 않습니다. 가입자는 항상 기본 역할/그룹으로 시작하며,
/// 할당 변경은 관리자 경로로만 가능합니다.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "잘못된 이메일 형식"))]
    pub email: String,
    #[validate(length(min = 8, message = "비밀번호는 8자 이상이어야 합니다"))]
    pub password: String,
    #[validate(length(min = 1, message = "이름은 비워둘 수 없습니다"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "성은 비워둘 수 없습니다"))]
    pub last_name: String,
}

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 토큰 갱신 요청.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// 내 정보 응답.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub principal: PrincipalProfile,
    pub permissions: HashSet<PermissionName>,
}

/// 비밀번호 변경 요청.
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

/// 인증 라우터.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me).put(update_me))
        .route("/me/password", put(change_password))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    request
        .validate()
        .map_err(|e| IamError::InvalidInput(e.to_string()))?;

    let session = state
        .auth
        .register(NewPrincipal {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            role_ids: Vec::new(),
            group_ids: Vec::new(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(session))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state.auth.refresh_session(&request.refresh_token).await?;
    Ok(Json(session))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
) -> ApiResult<StatusCode> {
    state.auth.logout(principal.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
) -> ApiResult<Json<MeResponse>> {
    let permissions = state.resolver.effective_permissions(&principal).await?;
    Ok(Json(MeResponse {
        principal: PrincipalProfile::from(&principal),
        permissions,
    }))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<PrincipalProfile>> {
    let updated = state.principals.update_profile(principal.id, update).await?;
    Ok(Json(PrincipalProfile::from(&updated)))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(request): Json<PasswordChangeRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .change_password(principal.id, &request.current_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
