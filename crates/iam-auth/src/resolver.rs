//! 유효 권한 집합 계산.
//!
//! principal의 유효 권한은 다음의 합집합입니다:
//! 직접 부여된 권한 ∪ 할당된 역할의 권한 ∪ 소속 그룹의 권한.
//!
//! 그룹 권한 포함은 의도된 설계입니다. 그룹이 권한을 보유하는데 해석
//! 경로에서 빠지면 그룹에 권한을 부여하는 관리 작업이 조용히 무의미해집니다.
//! (`group_permissions_flow_into_resolution` 테스트가 이 동작을 고정합니다.)
//!
//! 더 이상 존재하지 않는 역할/그룹/권한 참조는 없는 것으로 취급하며,
//! 전체 계산을 실패시키지 않습니다.

use std::collections::HashSet;
use std::sync::Arc;

use iam_core::domain::{
    Group, GroupStore, PermissionId, PermissionName, PermissionStore, Principal, Role, RoleStore,
};
use iam_core::domain::role::normalize_name;
use iam_core::error::{IamError, IamResult};

/// 권한 해석기.
///
/// 역할/권한 할당은 요청 사이에 바뀔 수 있으므로 결과를 캐싱하지 않습니다.
/// 모든 호출은 저장소의 현재 상태를 기준으로 새로 계산됩니다.
#[derive(Clone)]
pub struct PermissionResolver {
    roles: Arc<dyn RoleStore>,
    groups: Arc<dyn GroupStore>,
    permissions: Arc<dyn PermissionStore>,
}

/// 직접/역할/그룹 권한 ID의 합집합 (순수 계산부).
fn gather_permission_ids(
    principal: &Principal,
    roles: &[Role],
    groups: &[Group],
) -> HashSet<PermissionId> {
    let mut ids: HashSet<PermissionId> = principal.permissions.iter().copied().collect();
    for role in roles {
        ids.extend(role.permissions.iter().copied());
    }
    for group in groups {
        ids.extend(group.permissions.iter().copied());
    }
    ids
}

impl PermissionResolver {
    pub fn new(
        roles: Arc<dyn RoleStore>,
        groups: Arc<dyn GroupStore>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        Self {
            roles,
            groups,
            permissions,
        }
    }

    /// principal의 유효 권한 이름 집합을 계산합니다.
    ///
    /// # Errors
    ///
    /// 저장소 장애 시에만 실패합니다. dangling 참조는 조용히 건너뜁니다.
    pub async fn effective_permissions(
        &self,
        principal: &Principal,
    ) -> IamResult<HashSet<PermissionName>> {
        let roles = self
            .roles
            .find_many(&principal.roles)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        let groups = self
            .groups
            .find_many(&principal.groups)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;

        let ids: Vec<PermissionId> = gather_permission_ids(principal, &roles, &groups)
            .into_iter()
            .collect();

        let permissions = self
            .permissions
            .find_many(&ids)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;

        Ok(permissions.into_iter().map(|p| p.name).collect())
    }

    /// principal이 특정 권한을 가지는지 확인합니다.
    pub async fn has_permission(
        &self,
        principal: &Principal,
        permission: &PermissionName,
    ) -> IamResult<bool> {
        Ok(self.effective_permissions(principal).await?.contains(permission))
    }

    /// 직접 역할 이름 소속 여부 (상속 없음).
    pub async fn is_in_role(&self, principal: &Principal, role_name: &str) -> IamResult<bool> {
        let roles = self
            .roles
            .find_many(&principal.roles)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;

        let wanted = normalize_name(role_name);
        Ok(roles.iter().any(|r| r.name == wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_core::domain::Permission;
    use iam_store::MemoryStore;
    use proptest::prelude::*;

    async fn seed_permission(store: &MemoryStore, name: &str) -> Permission {
        let perm = Permission::new(PermissionName::parse(name).unwrap(), name);
        PermissionStore::upsert(store, &perm).await.unwrap();
        perm
    }

    fn resolver(store: &MemoryStore) -> PermissionResolver {
        PermissionResolver::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
    }

    #[tokio::test]
    async fn effective_set_is_union_of_direct_and_role_permissions() {
        let store = MemoryStore::new();

        let direct = seed_permission(&store, "read:own_profile").await;
        let inherited = seed_permission(&store, "update:team_profiles").await;

        let mut role = iam_core::domain::Role::new("MANAGER", "중간 관리자");
        role.permissions = vec![inherited.id];
        RoleStore::upsert(&store, &role).await.unwrap();

        let mut principal =
            Principal::new("r@example.com", "$argon2id$stub".into(), "R", "T");
        principal.permissions = vec![direct.id];
        principal.roles = vec![role.id];

        let effective = resolver(&store).effective_permissions(&principal).await.unwrap();
        assert!(effective.contains(&direct.name));
        assert!(effective.contains(&inherited.name));
        assert_eq!(effective.len(), 2);
    }

    #[tokio::test]
    async fn removing_role_removes_exclusive_permissions() {
        let store = MemoryStore::new();

        let shared = seed_permission(&store, "read:public_content").await;
        let exclusive = seed_permission(&store, "manage:users").await;

        let mut admin = iam_core::domain::Role::new("ADMIN", "관리자");
        admin.permissions = vec![exclusive.id, shared.id];
        RoleStore::upsert(&store, &admin).await.unwrap();

        let mut principal =
            Principal::new("x@example.com", "$argon2id$stub".into(), "X", "Y");
        principal.permissions = vec![shared.id];
        principal.roles = vec![admin.id];

        let r = resolver(&store);
        let before = r.effective_permissions(&principal).await.unwrap();
        assert!(before.contains(&exclusive.name));

        principal.roles.clear();
        let after = r.effective_permissions(&principal).await.unwrap();
        // 역할 전용 권한은 사라지고, 직접 부여로 중복된 권한은 남는다
        assert!(!after.contains(&exclusive.name));
        assert!(after.contains(&shared.name));
    }

    #[tokio::test]
    async fn group_permissions_flow_into_resolution() {
        let store = MemoryStore::new();

        let perm = seed_permission(&store, "read:team_profiles").await;

        let mut group = iam_core::domain::Group::new("SUPPORT", "지원팀");
        group.permissions = vec![perm.id];
        GroupStore::upsert(&store, &group).await.unwrap();

        let mut principal =
            Principal::new("g@example.com", "$argon2id$stub".into(), "G", "H");
        principal.groups = vec![group.id];

        let r = resolver(&store);
        assert!(r.has_permission(&principal, &perm.name).await.unwrap());
    }

    #[tokio::test]
    async fn dangling_references_are_skipped() {
        let store = MemoryStore::new();

        let perm = seed_permission(&store, "read:own_profile").await;

        let mut principal =
            Principal::new("d@example.com", "$argon2id$stub".into(), "D", "E");
        principal.permissions = vec![perm.id, PermissionId::new()];
        principal.roles = vec![iam_core::domain::RoleId::new()];
        principal.groups = vec![iam_core::domain::GroupId::new()];

        // 존재하지 않는 참조가 섞여 있어도 계산은 성공한다
        let effective = resolver(&store).effective_permissions(&principal).await.unwrap();
        assert_eq!(effective.len(), 1);
    }

    #[tokio::test]
    async fn is_in_role_checks_direct_membership_only() {
        let store = MemoryStore::new();

        let role = iam_core::domain::Role::new("MANAGER", "중간 관리자");
        RoleStore::upsert(&store, &role).await.unwrap();

        let mut principal =
            Principal::new("m@example.com", "$argon2id$stub".into(), "M", "N");
        principal.roles = vec![role.id];

        let r = resolver(&store);
        assert!(r.is_in_role(&principal, "manager").await.unwrap());
        assert!(!r.is_in_role(&principal, "ADMIN").await.unwrap());
    }

    proptest! {
        /// 합집합은 직접 권한과 모든 역할/그룹 권한의 상위 집합이다.
        #[test]
        fn prop_gathered_ids_are_superset(
            direct_count in 0usize..5,
            role_counts in proptest::collection::vec(0usize..5, 0..4),
            group_counts in proptest::collection::vec(0usize..5, 0..3),
        ) {
            let mut principal =
                Principal::new("p@example.com", "$argon2id$stub".into(), "P", "Q");
            principal.permissions = (0..direct_count).map(|_| PermissionId::new()).collect();

            let roles: Vec<Role> = role_counts
                .iter()
                .map(|&n| {
                    let mut role = Role::new("R", "");
                    role.permissions = (0..n).map(|_| PermissionId::new()).collect();
                    role
                })
                .collect();
            let groups: Vec<Group> = group_counts
                .iter()
                .map(|&n| {
                    let mut group = Group::new("G", "");
                    group.permissions = (0..n).map(|_| PermissionId::new()).collect();
                    group
                })
                .collect();

            let gathered = gather_permission_ids(&principal, &roles, &groups);

            for id in &principal.permissions {
                prop_assert!(gathered.contains(id));
            }
            for role in &roles {
                for id in &role.permissions {
                    prop_assert!(gathered.contains(id));
                }
            }
            for group in &groups {
                for id in &group.permissions {
                    prop_assert!(gathered.contains(id));
                }
            }
        }
    }
}
