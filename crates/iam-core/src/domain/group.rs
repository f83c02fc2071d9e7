//! 그룹(Group) 모델.
//!
//! 그룹은 권한을 공유하는 principal의 모음입니다. `members`는
//! Principal.groups의 역참조로, principal의 그룹 할당이 바뀔 때마다
//! 양방향으로 유지됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::PermissionId;
use super::principal::PrincipalId;
use super::role::normalize_name;

/// 그룹 고유 식별자.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for GroupId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 그룹 엔티티.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// 고유 식별자
    pub id: GroupId,
    /// 그룹 이름 (대문자 정규화, 전역 유일)
    pub name: String,
    /// 설명
    pub description: String,
    /// 소속 principal (역참조)
    pub members: Vec<PrincipalId>,
    /// 이 그룹이 부여하는 권한
    pub permissions: Vec<PermissionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// 새 그룹을 생성합니다. 이름은 대문자로 정규화됩니다.
    pub fn new(name: &str, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            name: normalize_name(name),
            description: description.into(),
            members: Vec::new(),
            permissions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 멤버 추가 (멱등).
    pub fn add_member(&mut self, principal: PrincipalId) {
        if !self.members.contains(&principal) {
            self.members.push(principal);
            self.updated_at = Utc::now();
        }
    }

    /// 멤버 제거 (없으면 무시).
    pub fn remove_member(&mut self, principal: PrincipalId) {
        let before = self.members.len();
        self.members.retain(|m| *m != principal);
        if self.members.len() != before {
            self.updated_at = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_member_is_idempotent() {
        let mut group = Group::new("general", "기본 그룹");
        let p = PrincipalId::new();

        group.add_member(p);
        group.add_member(p);
        assert_eq!(group.members.len(), 1);
    }

    #[test]
    fn test_remove_missing_member_is_noop() {
        let mut group = Group::new("SUPPORT", "지원팀");
        group.remove_member(PrincipalId::new());
        assert!(group.members.is_empty());
    }
}
