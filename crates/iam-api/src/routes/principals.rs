//! Principal 관리 endpoint.
//!
//! 모든 엔드포인트는 `manage:users` 권한을 요구합니다
//! ([`crate::extract::AdminPrincipal`]).
//!
//! # 엔드포인트
//!
//! - `GET    /api/v1/principals` - 목록 (검색/필터/페이지네이션)
//! - `POST   /api/v1/principals` - 생성 (역할/그룹 지정 가능)
//! - `GET    /api/v1/principals/{id}` - 단건 조회
//! - `PATCH  /api/v1/principals/{id}` - 프로필 수정
//! - `PUT    /api/v1/principals/{id}/roles` - 역할 할당 교체
//! - `PUT    /api/v1/principals/{id}/groups` - 그룹 소속 교체
//! - `PUT    /api/v1/principals/{id}/permissions` - 직접 권한 교체
//! - `PUT    /api/v1/principals/{id}/status` - 활성/비활성 전환
//! - `DELETE /api/v1/principals/{id}` - 삭제

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use iam_auth::principals::ProfileUpdate;
use iam_auth::NewPrincipal;
use iam_core::domain::{
    GroupId, PermissionId, PrincipalId, PrincipalProfile, PrincipalQuery, RoleId,
};
use iam_core::error::IamError;

use crate::error::ApiResult;
use crate::extract::AdminPrincipal;
use crate::state::AppState;

/// 단건 응답.
pub type ProfileResponse = PrincipalProfile;

/// 목록 응답. 저장된 엔티티 대신 프로필만 노출합니다.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub principals: Vec<PrincipalProfile>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// 생성 요청.
///
/// 가입과 달리 역할/그룹을 직접 지정할 수 있습니다. 비워두면 기본
/// 역할/그룹이 할당됩니다.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequest {
    #[validate(email(message = "잘못된 이메일 형식"))]
    pub email: String,
    #[validate(length(min = 8, message = "비밀번호는 8자 이상이어야 합니다"))]
    pub password: String,
    #[validate(length(min = 1, message = "이름은 비워둘 수 없습니다"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "성은 비워둘 수 없습니다"))]
    pub last_name: String,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
}

/// 역할 할당 교체 요청.
#[derive(Debug, Deserialize)]
pub struct RolesUpdateRequest {
    pub role_ids: Vec<RoleId>,
}

/// 그룹 소속 교체 요청.
#[derive(Debug, Deserialize)]
pub struct GroupsUpdateRequest {
    pub group_ids: Vec<GroupId>,
}

/// 직접 권한 교체 요청.
#[derive(Debug, Deserialize)]
pub struct PermissionsUpdateRequest {
    pub permission_ids: Vec<PermissionId>,
}

/// 활성 상태 변경 요청.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub is_active: bool,
}

/// Principal 관리 라우터.
pub fn principals_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one))
        .route("/{id}", patch(update_profile))
        .route("/{id}", delete(remove))
        .route("/{id}/roles", put(update_roles))
        .route("/{id}/groups", put(update_groups))
        .route("/{id}/permissions", put(update_permissions))
        .route("/{id}/status", put(update_status))
}

async fn list(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Query(query): Query<PrincipalQuery>,
) -> ApiResult<Json<ListResponse>> {
    let page = state.principals.list(&query).await?;
    Ok(Json(ListResponse {
        principals: page.principals.iter().map(PrincipalProfile::from).collect(),
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}

async fn create(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Json(request): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<ProfileResponse>)> {
    request
        .validate()
        .map_err(|e| IamError::InvalidInput(e.to_string()))?;

    let principal = state
        .auth
        .create_principal(NewPrincipal {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            role_ids: request.role_ids,
            group_ids: request.group_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PrincipalProfile::from(&principal))))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProfileResponse>> {
    let principal = state.principals.get(PrincipalId::from(id)).await?;
    Ok(Json(PrincipalProfile::from(&principal)))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Path(id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<ProfileResponse>> {
    let principal = state
        .principals
        .update_profile(PrincipalId::from(id), update)
        .await?;
    Ok(Json(PrincipalProfile::from(&principal)))
}

async fn update_roles(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Path(id): Path<Uuid>,
    Json(request): Json<RolesUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let principal = state
        .principals
        .update_roles(PrincipalId::from(id), request.role_ids)
        .await?;
    Ok(Json(PrincipalProfile::from(&principal)))
}

async fn update_groups(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Path(id): Path<Uuid>,
    Json(request): Json<GroupsUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let principal = state
        .principals
        .update_groups(PrincipalId::from(id), request.group_ids)
        .await?;
    Ok(Json(PrincipalProfile::from(&principal)))
}

async fn update_permissions(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Path(id): Path<Uuid>,
    Json(request): Json<PermissionsUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let principal = state
        .principals
        .update_permissions(PrincipalId::from(id), request.permission_ids)
        .await?;
    Ok(Json(PrincipalProfile::from(&principal)))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let principal = state
        .principals
        .update_status(PrincipalId::from(id), request.is_active)
        .await?;
    Ok(Json(PrincipalProfile::from(&principal)))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(_): AdminPrincipal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.principals.delete(PrincipalId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_core::domain::{Principal, PrincipalPage};

    #[test]
    fn test_list_response_exposes_profiles_only() {
        let page = PrincipalPage {
            principals: vec![Principal::new(
                "hong@example.com",
                "$argon2id$stub".into(),
                "길동",
                "홍",
            )],
            total: 1,
            page: 1,
            pages: 1,
        };

        let response = ListResponse {
            principals: page.principals.iter().map(PrincipalProfile::from).collect(),
            total: page.total,
            page: page.page,
            pages: page.pages,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("hong@example.com"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("token_generation"));
    }
}
