//! Principal 관리 서비스.
//!
//! 관리자용 CRUD와 역할/그룹/권한 할당을 담당합니다. 자기 자신의 프로필
//! 조회/수정(본인 경로)도 동일한 서비스를 거칩니다. 접근 제어는 이 계층의
//! 책임이 아니며 호출자([`crate::gate::authorize`] 또는 API 추출기)가
//! 수행합니다.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use iam_core::domain::{
    normalize_email, GroupId, GroupStore, PermissionId, PermissionStore, Principal, PrincipalId,
    PrincipalPage, PrincipalQuery, PrincipalStore, RoleId, RoleStore,
};
use iam_core::error::{IamError, IamResult};

/// 프로필 수정 요청. `None` 필드는 기존 값을 유지합니다.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Principal 관리 서비스.
pub struct PrincipalService {
    principals: Arc<dyn PrincipalStore>,
    roles: Arc<dyn RoleStore>,
    groups: Arc<dyn GroupStore>,
    permissions: Arc<dyn PermissionStore>,
}

impl PrincipalService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        roles: Arc<dyn RoleStore>,
        groups: Arc<dyn GroupStore>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        Self {
            principals,
            roles,
            groups,
            permissions,
        }
    }

    /// 조건 검색 + 페이지네이션 목록.
    pub async fn list(&self, query: &PrincipalQuery) -> IamResult<PrincipalPage> {
        self.principals
            .list(query)
            .await
            .map_err(|e| IamError::Store(e.to_string()))
    }

    /// ID로 조회.
    pub async fn get(&self, id: PrincipalId) -> IamResult<Principal> {
        self.principals
            .find_by_id(id)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?
            .ok_or(IamError::PrincipalNotFound)
    }

    /// 이메일/이름 프로필 수정.
    ///
    /// 이메일 변경 시 정규화 후 저장하며, 다른 principal과 충돌하면
    /// [`IamError::DuplicateEmail`]을 반환합니다.
    #[instrument(skip_all, fields(principal = %id))]
    pub async fn update_profile(
        &self,
        id: PrincipalId,
        update: ProfileUpdate,
    ) -> IamResult<Principal> {
        let mut principal = self.get(id).await?;

        if let Some(email) = update.email {
            let email = normalize_email(&email);
            if email.is_empty() || !email.contains('@') {
                return Err(IamError::InvalidInput("잘못된 이메일 형식".into()));
            }
            principal.email = email;
        }
        if let Some(first_name) = update.first_name {
            principal.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            principal.last_name = last_name;
        }
        principal.updated_at = Utc::now();

        self.principals.update(&principal).await?;
        Ok(principal)
    }

    /// 역할 할당 전체 교체. 모든 ID가 실존해야 합니다.
    #[instrument(skip_all, fields(principal = %id))]
    pub async fn update_roles(&self, id: PrincipalId, role_ids: Vec<RoleId>) -> IamResult<Principal> {
        let found = self
            .roles
            .find_many(&role_ids)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        if found.len() != role_ids.len() {
            return Err(IamError::ReferenceNotFound("존재하지 않는 역할 ID".into()));
        }

        let mut principal = self.get(id).await?;
        principal.roles = role_ids;
        principal.updated_at = Utc::now();
        self.principals.update(&principal).await?;

        info!(roles = principal.roles.len(), "roles updated");
        Ok(principal)
    }

    /// 그룹 소속 전체 교체.
    ///
    /// principal 측 목록과 그룹 측 멤버 역참조를 함께 다시 씁니다.
    /// 두 방향의 쓰기는 원자적이지 않습니다 (저장소 계약 참조).
    #[instrument(skip_all, fields(principal = %id))]
    pub async fn update_groups(
        &self,
        id: PrincipalId,
        group_ids: Vec<GroupId>,
    ) -> IamResult<Principal> {
        let found = self
            .groups
            .find_many(&group_ids)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        if found.len() != group_ids.len() {
            return Err(IamError::ReferenceNotFound("존재하지 않는 그룹 ID".into()));
        }

        let mut principal = self.get(id).await?;
        principal.groups = group_ids.clone();
        principal.updated_at = Utc::now();
        self.principals.update(&principal).await?;

        // 역참조 재작성: 전체 제거 후 새 소속만 추가
        self.groups
            .remove_member_from_all(id)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        for group_id in group_ids {
            self.groups
                .add_member(group_id, id)
                .await
                .map_err(|e| IamError::Store(e.to_string()))?;
        }

        info!(groups = principal.groups.len(), "groups updated");
        Ok(principal)
    }

    /// 직접 권한 전체 교체. 모든 ID가 실존해야 합니다.
    #[instrument(skip_all, fields(principal = %id))]
    pub async fn update_permissions(
        &self,
        id: PrincipalId,
        permission_ids: Vec<PermissionId>,
    ) -> IamResult<Principal> {
        let found = self
            .permissions
            .find_many(&permission_ids)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        if found.len() != permission_ids.len() {
            return Err(IamError::ReferenceNotFound("존재하지 않는 권한 ID".into()));
        }

        let mut principal = self.get(id).await?;
        principal.permissions = permission_ids;
        principal.updated_at = Utc::now();
        self.principals.update(&principal).await?;
        Ok(principal)
    }

    /// 활성 상태 변경. 비활성화된 계정은 로그인과 토큰 갱신이 모두 거부됩니다.
    #[instrument(skip_all, fields(principal = %id, active))]
    pub async fn update_status(&self, id: PrincipalId, active: bool) -> IamResult<Principal> {
        let mut principal = self.get(id).await?;
        principal.is_active = active;
        principal.updated_at = Utc::now();
        self.principals.update(&principal).await?;

        info!("status updated");
        Ok(principal)
    }

    /// 삭제. 그룹 멤버 역참조를 먼저 정리합니다.
    #[instrument(skip_all, fields(principal = %id))]
    pub async fn delete(&self, id: PrincipalId) -> IamResult<()> {
        // 존재 확인을 먼저 해서 없는 대상의 멤버십 정리를 피한다
        self.get(id).await?;

        self.groups
            .remove_member_from_all(id)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        self.principals.delete(id).await?;

        info!("principal deleted");
        Ok(())
    }
}
