//! 기본 역할/그룹/권한 카탈로그.
//!
//! 서비스 시작 시 한 번 시딩되는 내장 데이터의 정의입니다.
//! 실제 upsert는 iam-auth의 setup 서비스가 수행합니다.

use crate::domain::PermissionName;
use crate::error::IamResult;

/// 기본 역할 이름 (역할 미지정 가입자에게 할당).
pub const DEFAULT_ROLE: &str = "USER";

/// 기본 그룹 이름 (그룹 미지정 가입자에게 할당).
pub const DEFAULT_GROUP: &str = "GENERAL";

/// 시스템 역할 목록.
pub const SYSTEM_ROLES: [&str; 3] = ["ADMIN", "USER", "MANAGER"];

/// 시스템 그룹 목록.
pub const SYSTEM_GROUPS: [&str; 3] = ["GENERAL", "SUPPORT", "OPERATIONS"];

/// 역할별 기본 권한 카탈로그.
pub struct DefaultCatalog;

impl DefaultCatalog {
    /// 역할 이름에 대한 기본 권한 이름 목록.
    ///
    /// 카탈로그에 없는 역할은 빈 목록을 반환합니다 (권한 없는 역할 허용).
    pub fn role_permissions(role: &str) -> &'static [&'static str] {
        match role {
            "USER" => &["read:own_profile", "update:own_profile", "read:public_content"],
            "MANAGER" => &[
                "read:team_profiles",
                "update:team_profiles",
                "create:content",
                "update:content",
            ],
            "ADMIN" => &[
                "manage:users",
                "manage:roles",
                "manage:permissions",
                "manage:groups",
            ],
            _ => &[],
        }
    }

    /// 카탈로그에 등장하는 모든 권한 이름 (중복 제거, 검증 완료).
    pub fn all_permissions() -> IamResult<Vec<PermissionName>> {
        let mut seen = std::collections::BTreeSet::new();
        for role in SYSTEM_ROLES {
            for name in Self::role_permissions(role) {
                seen.insert(*name);
            }
        }

        seen.into_iter().map(PermissionName::parse).collect()
    }
}
