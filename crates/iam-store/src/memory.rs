//! 인메모리 저장소.
//!
//! 모든 컬렉션을 단일 `RwLock` 아래 HashMap으로 보관합니다.
//! 각 trait 메서드는 락 한 번으로 완료되므로 단일 문서 원자성을 만족하며,
//! 이메일/이름 유일성 검사도 같은 락 안에서 수행됩니다.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use iam_core::domain::{
    Group, GroupId, GroupStore, Permission, PermissionId, PermissionName, PermissionStore,
    Principal, PrincipalId, PrincipalPage, PrincipalQuery, PrincipalStore, Role, RoleId,
    RoleStore, StoreError,
};

#[derive(Default)]
struct Inner {
    principals: HashMap<PrincipalId, Principal>,
    roles: HashMap<RoleId, Role>,
    groups: HashMap<GroupId, Group>,
    permissions: HashMap<PermissionId, Permission>,
}

/// 인메모리 저장소.
///
/// `Clone`은 내부 상태를 공유합니다. 하나의 `MemoryStore`를 만들어
/// `Arc<dyn PrincipalStore>` 등으로 업캐스트하여 각 서비스에 주입하세요.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_conflict(inner: &Inner, email: &str, exclude: Option<PrincipalId>) -> bool {
    inner
        .principals
        .values()
        .any(|p| p.email == email && Some(p.id) != exclude)
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn insert(&self, principal: &Principal) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if email_conflict(&inner, &principal.email, None) {
            return Err(StoreError::Conflict(format!("email: {}", principal.email)));
        }

        inner.principals.insert(principal.id, principal.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.principals.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.principals.values().find(|p| p.email == email).cloned())
    }

    async fn update(&self, principal: &Principal) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.principals.contains_key(&principal.id) {
            return Err(StoreError::NotFound(principal.id.to_string()));
        }
        if email_conflict(&inner, &principal.email, Some(principal.id)) {
            return Err(StoreError::Conflict(format!("email: {}", principal.email)));
        }

        inner.principals.insert(principal.id, principal.clone());
        Ok(())
    }

    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .principals
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self, query: &PrincipalQuery) -> Result<PrincipalPage, StoreError> {
        let inner = self.inner.read().await;

        let search = query.search.as_ref().map(|s| s.to_lowercase());
        let mut matched: Vec<&Principal> = inner
            .principals
            .values()
            .filter(|p| {
                if let Some(ref needle) = search {
                    let hit = p.email.contains(needle)
                        || p.first_name.to_lowercase().contains(needle)
                        || p.last_name.to_lowercase().contains(needle);
                    if !hit {
                        return false;
                    }
                }
                if let Some(role) = query.role {
                    if !p.roles.contains(&role) {
                        return false;
                    }
                }
                if let Some(group) = query.group {
                    if !p.groups.contains(&group) {
                        return false;
                    }
                }
                if let Some(active) = query.active {
                    if p.is_active != active {
                        return false;
                    }
                }
                true
            })
            .collect();

        // 생성 시각 순으로 정렬해 페이지네이션을 안정화
        matched.sort_by_key(|p| p.created_at);

        let total = matched.len() as u64;
        let limit = query.limit.unwrap_or(10).max(1);
        let page = query.page.unwrap_or(1).max(1);
        let pages = total.div_ceil(limit);

        // page/limit은 외부 입력이므로 포화 연산으로 오버플로를 차단
        let start = page.saturating_sub(1).saturating_mul(limit);
        let start = usize::try_from(start).unwrap_or(usize::MAX);
        let principals = matched
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(PrincipalPage {
            principals,
            total,
            page,
            pages,
        })
    }

    async fn record_login(&self, id: PrincipalId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let principal = inner
            .principals
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        principal.last_login = Some(at);
        principal.updated_at = at;
        Ok(())
    }

    async fn bump_token_generation(&self, id: PrincipalId) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let principal = inner
            .principals
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        principal.token_generation += 1;
        principal.touch();
        Ok(principal.token_generation)
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn upsert(&self, role: &Role) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        // 이름 기준 upsert: 같은 이름이 있으면 기존 ID를 유지한 채 갱신
        if let Some(existing) = inner.roles.values_mut().find(|r| r.name == role.name) {
            existing.description = role.description.clone();
            existing.permissions = role.permissions.clone();
            existing.updated_at = Utc::now();
            return Ok(());
        }

        inner.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.roles.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.roles.values().find(|r| r.name == name).cloned())
    }

    async fn find_many(&self, ids: &[RoleId]) -> Result<Vec<Role>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.roles.get(id).cloned()).collect())
    }

    async fn list(&self) -> Result<Vec<Role>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.roles.values().cloned().collect())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn upsert(&self, group: &Group) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        // 이름 기준 upsert: 멤버 목록은 보존 (시딩이 멤버십을 지우면 안 됨)
        if let Some(existing) = inner.groups.values_mut().find(|g| g.name == group.name) {
            existing.description = group.description.clone();
            existing.permissions = group.permissions.clone();
            existing.updated_at = Utc::now();
            return Ok(());
        }

        inner.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.groups.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.groups.values().find(|g| g.name == name).cloned())
    }

    async fn find_many(&self, ids: &[GroupId]) -> Result<Vec<Group>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.groups.get(id).cloned()).collect())
    }

    async fn list(&self) -> Result<Vec<Group>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.groups.values().cloned().collect())
    }

    async fn add_member(&self, group: GroupId, principal: PrincipalId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let group = inner
            .groups
            .get_mut(&group)
            .ok_or_else(|| StoreError::NotFound(group.to_string()))?;

        group.add_member(principal);
        Ok(())
    }

    async fn remove_member_from_all(&self, principal: PrincipalId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for group in inner.groups.values_mut() {
            group.remove_member(principal);
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn upsert(&self, permission: &Permission) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner
            .permissions
            .values_mut()
            .find(|p| p.name == permission.name)
        {
            existing.description = permission.description.clone();
            existing.updated_at = Utc::now();
            return Ok(());
        }

        inner.permissions.insert(permission.id, permission.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.permissions.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &PermissionName,
    ) -> Result<Option<Permission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.permissions.values().find(|p| &p.name == name).cloned())
    }

    async fn find_many(&self, ids: &[PermissionId]) -> Result<Vec<Permission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.permissions.get(id).cloned())
            .collect())
    }

    async fn list(&self) -> Result<Vec<Permission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.permissions.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(email: &str) -> Principal {
        Principal::new(email, "$argon2id$stub".into(), "Test", "User")
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = MemoryStore::new();

        store.insert(&principal("a@example.com")).await.unwrap();
        let err = store.insert(&principal("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_email_takeover() {
        let store = MemoryStore::new();

        let p1 = principal("a@example.com");
        let mut p2 = principal("b@example.com");
        store.insert(&p1).await.unwrap();
        store.insert(&p2).await.unwrap();

        p2.email = "a@example.com".into();
        let err = store.update(&p2).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_search_and_pagination() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store
                .insert(&principal(&format!("user{}@example.com", i)))
                .await
                .unwrap();
        }
        store.insert(&principal("admin@corp.com")).await.unwrap();

        let query = PrincipalQuery {
            search: Some("example".into()),
            limit: Some(10),
            page: Some(2),
            ..Default::default()
        };
        let page = PrincipalStore::list(&store, &query).await.unwrap();

        assert_eq!(page.total, 15);
        assert_eq!(page.pages, 2);
        assert_eq!(page.principals.len(), 5);
    }

    #[tokio::test]
    async fn test_list_out_of_range_page_is_empty() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store
                .insert(&principal(&format!("user{}@example.com", i)))
                .await
                .unwrap();
        }

        let query = PrincipalQuery {
            page: Some(u64::MAX),
            limit: Some(10),
            ..Default::default()
        };
        let page = PrincipalStore::list(&store, &query).await.unwrap();

        assert!(page.principals.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.pages, 1);
    }

    #[tokio::test]
    async fn test_bump_token_generation() {
        let store = MemoryStore::new();
        let p = principal("gen@example.com");
        store.insert(&p).await.unwrap();

        assert_eq!(store.bump_token_generation(p.id).await.unwrap(), 1);
        assert_eq!(store.bump_token_generation(p.id).await.unwrap(), 2);

        let reloaded = PrincipalStore::find_by_id(&store, p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.token_generation, 2);
    }

    #[tokio::test]
    async fn test_role_upsert_keeps_id() {
        let store = MemoryStore::new();

        let role = Role::new("MANAGER", "v1");
        RoleStore::upsert(&store, &role).await.unwrap();

        let mut updated = Role::new("MANAGER", "v2");
        updated.permissions = vec![PermissionId::new()];
        RoleStore::upsert(&store, &updated).await.unwrap();

        let loaded = RoleStore::find_by_name(&store, "MANAGER").await.unwrap().unwrap();
        assert_eq!(loaded.id, role.id);
        assert_eq!(loaded.description, "v2");
        assert_eq!(loaded.permissions.len(), 1);
    }

    #[tokio::test]
    async fn test_group_membership_lifecycle() {
        let store = MemoryStore::new();

        let group = Group::new("GENERAL", "기본 그룹");
        GroupStore::upsert(&store, &group).await.unwrap();

        let p = principal("member@example.com");
        store.insert(&p).await.unwrap();

        store.add_member(group.id, p.id).await.unwrap();
        store.add_member(group.id, p.id).await.unwrap();

        let loaded = GroupStore::find_by_id(&store, group.id).await.unwrap().unwrap();
        assert_eq!(loaded.members, vec![p.id]);

        store.remove_member_from_all(p.id).await.unwrap();
        let loaded = GroupStore::find_by_id(&store, group.id).await.unwrap().unwrap();
        assert!(loaded.members.is_empty());
    }

    #[tokio::test]
    async fn test_find_many_skips_dangling_refs() {
        let store = MemoryStore::new();

        let role = Role::new("USER", "기본 역할");
        RoleStore::upsert(&store, &role).await.unwrap();

        let found = RoleStore::find_many(&store, &[role.id, RoleId::new()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
