//! 역할(Role) 모델.
//!
//! 역할은 이름이 붙은 권한 묶음입니다. 이름은 대문자로 정규화되며
//! 전역에서 유일합니다. 권한 집합은 비어 있을 수 있습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::PermissionId;

/// 역할 고유 식별자.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(Uuid);

impl RoleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RoleId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 역할/그룹 이름 정규화 (trim + 대문자).
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// 역할 엔티티.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// 고유 식별자
    pub id: RoleId,
    /// 역할 이름 (대문자 정규화, 전역 유일)
    pub name: String,
    /// 설명
    pub description: String,
    /// 이 역할이 부여하는 권한
    pub permissions: Vec<PermissionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// 새 역할을 생성합니다. 이름은 대문자로 정규화됩니다.
    pub fn new(name: &str, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RoleId::new(),
            name: normalize_name(name),
            description: description.into(),
            permissions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 권한 목록을 교체하고 수정 시각을 갱신합니다.
    pub fn set_permissions(&mut self, permissions: Vec<PermissionId>) {
        self.permissions = permissions;
        self.updated_at = Utc::now();
    }
}
