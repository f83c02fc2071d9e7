//! 기본 데이터 시딩.
//!
//! 서비스 시작 시 시스템 권한/역할/그룹을 멱등하게 upsert합니다.
//! 이름 기준 upsert이므로 재시작해도 기존 ID와 할당 관계가 유지됩니다.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument};

use iam_core::defaults::{DefaultCatalog, SYSTEM_GROUPS, SYSTEM_ROLES};
use iam_core::domain::{
    Group, GroupStore, Permission, PermissionId, PermissionStore, Role, RoleStore,
};
use iam_core::error::{IamError, IamResult};

/// 시스템 권한/역할/그룹 시딩.
///
/// 호출 순서는 권한 → 역할 → 그룹입니다. 역할의 권한 할당이 먼저
/// 저장된 권한 ID를 참조하기 때문입니다.
#[instrument(skip_all)]
pub async fn initialize_defaults(
    roles: &Arc<dyn RoleStore>,
    groups: &Arc<dyn GroupStore>,
    permissions: &Arc<dyn PermissionStore>,
) -> IamResult<()> {
    // 권한: 카탈로그 전체를 upsert하고 이름 → ID 매핑을 만든다
    let mut permission_ids: HashMap<String, PermissionId> = HashMap::new();
    for name in DefaultCatalog::all_permissions()? {
        let existing = permissions
            .find_by_name(&name)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;

        let id = match existing {
            Some(permission) => permission.id,
            None => {
                let permission = Permission::new(name.clone(), "시스템 기본 권한");
                permissions
                    .upsert(&permission)
                    .await
                    .map_err(|e| IamError::Store(e.to_string()))?;
                permission.id
            }
        };
        permission_ids.insert(name.as_str().to_string(), id);
    }

    // 역할: 카탈로그의 권한 할당을 ID로 치환해 upsert
    for role_name in SYSTEM_ROLES {
        let assigned: Vec<PermissionId> = DefaultCatalog::role_permissions(role_name)
            .iter()
            .filter_map(|name| permission_ids.get(*name).copied())
            .collect();

        let mut role = match roles
            .find_by_name(role_name)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?
        {
            Some(role) => role,
            None => Role::new(role_name, format!("{} 시스템 역할", role_name)),
        };
        role.set_permissions(assigned);
        roles
            .upsert(&role)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
    }

    // 그룹: 이름만 보장하면 된다. 기존 그룹의 멤버/권한은 건드리지 않는다.
    for group_name in SYSTEM_GROUPS {
        let exists = groups
            .find_by_name(group_name)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?
            .is_some();
        if !exists {
            let group = Group::new(group_name, format!("{} 시스템 그룹", group_name));
            groups
                .upsert(&group)
                .await
                .map_err(|e| IamError::Store(e.to_string()))?;
        }
    }

    info!(
        permissions = permission_ids.len(),
        roles = SYSTEM_ROLES.len(),
        groups = SYSTEM_GROUPS.len(),
        "default data seeded"
    );
    Ok(())
}
