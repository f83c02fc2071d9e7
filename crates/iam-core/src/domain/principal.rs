//! Principal(사용자) 모델.
//!
//! Principal은 인증된 신원입니다. 이메일은 소문자로 정규화되어 전역에서
//! 유일하며, 비밀번호는 생성 이후 평문으로 저장되거나 전송되지 않습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::GroupId;
use super::permission::PermissionId;
use super::role::RoleId;

/// Principal 고유 식별자.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// 문자열에서 ID 파싱 (토큰 sub 클레임 복원용).
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 이메일 정규화 (trim + 소문자).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Principal 엔티티.
///
/// # 불변 조건
///
/// - `email`은 모든 principal에 걸쳐 유일 (저장소 수준에서 강제)
/// - `password_hash`는 항상 PHC 형식 해시, 평문 비밀번호 아님
/// - `token_generation`은 단조 증가 (refresh token 무효화 카운터)
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: PrincipalId,
    /// 소문자 정규화된 이메일
    pub email: String,
    /// PHC 형식 비밀번호 해시 (직렬화/응답에 절대 포함하지 않음)
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// 비활성 계정은 로그인/토큰 갱신 불가
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    /// 할당된 역할
    pub roles: Vec<RoleId>,
    /// 소속 그룹
    pub groups: Vec<GroupId>,
    /// 직접 부여된 권한
    pub permissions: Vec<PermissionId>,
    /// refresh token 세대 카운터. 로그아웃(revoke) 시 증가하며,
    /// 이전 세대의 refresh token은 더 이상 갱신에 사용할 수 없습니다.
    pub token_generation: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// 새 principal을 생성합니다.
    ///
    /// `password_hash`는 이미 해싱된 값이어야 합니다. 해싱은 비밀번호
    /// 설정/변경 시 정확히 한 번 수행됩니다.
    pub fn new(
        email: &str,
        password_hash: String,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PrincipalId::new(),
            email: normalize_email(email),
            password_hash,
            first_name: first_name.into(),
            last_name: last_name.into(),
            is_active: true,
            last_login: None,
            roles: Vec::new(),
            groups: Vec::new(),
            permissions: Vec::new(),
            token_generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 표시용 전체 이름.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 특정 역할에 직접 소속되어 있는지 확인 (상속 없음).
    pub fn has_role_id(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }

    /// 수정 시각 갱신.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// 외부로 반환되는 principal 프로필.
///
/// `password_hash`와 `token_generation`은 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalProfile {
    pub id: PrincipalId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub roles: Vec<RoleId>,
    pub groups: Vec<GroupId>,
    pub permissions: Vec<PermissionId>,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for PrincipalProfile {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            email: p.email.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            is_active: p.is_active,
            last_login: p.last_login,
            roles: p.roles.clone(),
            groups: p.groups.clone(),
            permissions: p.permissions.clone(),
            created_at: p.created_at,
        }
    }
}
