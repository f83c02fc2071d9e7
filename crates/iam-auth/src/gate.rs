//! 권한 게이트.
//!
//! 이미 인증된 principal이 특정 권한을 가지는지 판정합니다.
//! 부수 효과가 없고, 판정 결과를 캐싱하지 않습니다 — 역할/권한 할당은
//! 요청 사이에 바뀔 수 있으므로 매 요청마다 새로 평가해야 합니다.

use iam_core::domain::{PermissionName, Principal};
use iam_core::error::{IamError, IamResult};

use crate::resolver::PermissionResolver;

/// 권한 확인. 거부는 호출 작업에 대한 최종 결정입니다.
///
/// # Errors
///
/// - `IamError::PermissionDenied`: 유효 권한 집합에 요구 권한이 없음
/// - `IamError::Store`: 권한 해석 중 저장소 장애
pub async fn authorize(
    resolver: &PermissionResolver,
    principal: &Principal,
    permission: &PermissionName,
) -> IamResult<()> {
    if resolver.has_permission(principal, permission).await? {
        Ok(())
    } else {
        Err(IamError::PermissionDenied(permission.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_core::domain::{Permission, PermissionStore, RoleStore};
    use iam_store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_allow_and_deny() {
        let store = MemoryStore::new();

        let read = Permission::new(PermissionName::parse("read:team_profiles").unwrap(), "");
        let manage = Permission::new(PermissionName::parse("manage:users").unwrap(), "");
        PermissionStore::upsert(&store, &read).await.unwrap();
        PermissionStore::upsert(&store, &manage).await.unwrap();

        let mut role = iam_core::domain::Role::new("MANAGER", "중간 관리자");
        role.permissions = vec![read.id];
        RoleStore::upsert(&store, &role).await.unwrap();

        let mut principal =
            Principal::new("gate@example.com", "$argon2id$stub".into(), "G", "K");
        principal.roles = vec![role.id];

        let resolver = PermissionResolver::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        );

        assert!(authorize(&resolver, &principal, &read.name).await.is_ok());

        let denied = authorize(&resolver, &principal, &manage.name).await.unwrap_err();
        assert!(matches!(denied, IamError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_decision_reflects_current_assignments() {
        let store = MemoryStore::new();

        let perm = Permission::new(PermissionName::parse("create:content").unwrap(), "");
        PermissionStore::upsert(&store, &perm).await.unwrap();

        let mut principal =
            Principal::new("fresh@example.com", "$argon2id$stub".into(), "F", "R");

        let resolver = PermissionResolver::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        );

        assert!(authorize(&resolver, &principal, &perm.name).await.is_err());

        // 판정 사이에 권한이 부여되면 다음 판정은 즉시 반영되어야 한다
        principal.permissions.push(perm.id);
        assert!(authorize(&resolver, &principal, &perm.name).await.is_ok());
    }
}
