//! 저장소 추상화.
//!
//! 핵심 엔진은 영속성 구현에 의존하지 않고 이 trait들을 통해서만
//! 저장소와 통신합니다. 각 구현은 단일 문서 수준의 원자성만 보장하며,
//! Principal↔Group 간 교차 엔티티 트랜잭션은 계약에 포함되지 않습니다.
//! 일시적인 저장소 실패는 호출자에게 그대로 전달되며 재시도하지 않습니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::group::{Group, GroupId};
use super::permission::{Permission, PermissionId, PermissionName};
use super::principal::{Principal, PrincipalId};
use super::role::{Role, RoleId};
use crate::error::IamError;

// =============================================================================
// 에러 타입
// =============================================================================

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 유일성 제약 위반 (예: 이메일, 역할/그룹 이름)
    #[error("유일성 제약 위반: {0}")]
    Conflict(String),

    /// 대상 문서 없음
    #[error("문서를 찾을 수 없음: {0}")]
    NotFound(String),

    /// 백엔드 장애 (연결 실패 등)
    #[error("저장소 백엔드 에러: {0}")]
    Backend(String),
}

impl From<StoreError> for IamError {
    fn from(err: StoreError) -> Self {
        match err {
            // principal의 유일성 제약은 이메일뿐이므로 등록 경쟁은 여기서 닫힌다
            StoreError::Conflict(_) => IamError::DuplicateEmail,
            StoreError::NotFound(_) => IamError::PrincipalNotFound,
            StoreError::Backend(msg) => IamError::Store(msg),
        }
    }
}

// =============================================================================
// 조회 타입
// =============================================================================

/// Principal 목록 조회 조건.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrincipalQuery {
    /// 페이지 번호 (1부터)
    pub page: Option<u64>,
    /// 페이지 크기
    pub limit: Option<u64>,
    /// 이메일/이름 부분 일치 검색 (대소문자 무시)
    pub search: Option<String>,
    /// 특정 역할 보유자만
    pub role: Option<RoleId>,
    /// 특정 그룹 소속자만
    pub group: Option<GroupId>,
    /// 활성 상태 필터
    pub active: Option<bool>,
}

/// 페이지네이션된 Principal 목록.
#[derive(Debug, Clone)]
pub struct PrincipalPage {
    pub principals: Vec<Principal>,
    /// 조건에 맞는 전체 건수
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

// =============================================================================
// 저장소 Trait
// =============================================================================

/// Principal 저장소.
///
/// 이메일 유일성은 애플리케이션 로직이 아닌 저장소 수준에서 강제되어야
/// 합니다 (`insert`/`update`가 `Conflict`를 반환). 이렇게 해야 동시 가입
/// 경쟁이 저장소에서 닫힙니다.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// 새 principal 저장.
    ///
    /// # Errors
    ///
    /// - `StoreError::Conflict`: 이메일이 이미 존재
    /// - `StoreError::Backend`: 백엔드 장애
    async fn insert(&self, principal: &Principal) -> Result<(), StoreError>;

    /// ID로 조회.
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError>;

    /// 정규화된 이메일로 조회.
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;

    /// 전체 필드 갱신.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 대상 없음
    /// - `StoreError::Conflict`: 변경된 이메일이 다른 principal과 충돌
    async fn update(&self, principal: &Principal) -> Result<(), StoreError>;

    /// 삭제. 그룹 멤버십 정리는 호출자 책임입니다.
    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError>;

    /// 조건 검색 + 페이지네이션.
    async fn list(&self, query: &PrincipalQuery) -> Result<PrincipalPage, StoreError>;

    /// 마지막 로그인 시각 기록.
    async fn record_login(&self, id: PrincipalId, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// refresh token 세대 카운터 증가. 증가 후 값을 반환합니다.
    async fn bump_token_generation(&self, id: PrincipalId) -> Result<u64, StoreError>;
}

/// Role 저장소.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// 이름 기준 upsert (기본 데이터 시딩용).
    async fn upsert(&self, role: &Role) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError>;

    /// 정규화된 이름으로 조회.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError>;

    /// 여러 ID 일괄 조회. 존재하는 것만 반환합니다 (dangling 참조 허용).
    async fn find_many(&self, ids: &[RoleId]) -> Result<Vec<Role>, StoreError>;

    async fn list(&self) -> Result<Vec<Role>, StoreError>;
}

/// Group 저장소.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// 이름 기준 upsert (기본 데이터 시딩용).
    async fn upsert(&self, group: &Group) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError>;

    /// 정규화된 이름으로 조회.
    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, StoreError>;

    /// 여러 ID 일괄 조회. 존재하는 것만 반환합니다.
    async fn find_many(&self, ids: &[GroupId]) -> Result<Vec<Group>, StoreError>;

    async fn list(&self) -> Result<Vec<Group>, StoreError>;

    /// 그룹 멤버 추가 (멱등, `$addToSet` 의미론).
    async fn add_member(&self, group: GroupId, principal: PrincipalId) -> Result<(), StoreError>;

    /// 모든 그룹에서 멤버 제거 (`$pull` 의미론). principal 삭제/재할당 시 사용.
    async fn remove_member_from_all(&self, principal: PrincipalId) -> Result<(), StoreError>;
}

/// Permission 저장소.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// 이름 기준 upsert (기본 데이터 시딩용).
    async fn upsert(&self, permission: &Permission) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError>;

    async fn find_by_name(&self, name: &PermissionName)
        -> Result<Option<Permission>, StoreError>;

    /// 여러 ID 일괄 조회. 존재하는 것만 반환합니다.
    async fn find_many(&self, ids: &[PermissionId]) -> Result<Vec<Permission>, StoreError>;

    async fn list(&self) -> Result<Vec<Permission>, StoreError>;
}
