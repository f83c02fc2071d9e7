//! 권한(Permission) 모델.
//!
//! 권한은 `action:resource` 형태의 원자적 능력입니다.
//! 동작(action)은 닫힌 enum이고, 권한 이름은 생성 시점에 검증되는
//! newtype이므로 오타가 런타임 문자열 비교까지 흘러가지 않습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IamError;

/// 권한 고유 식별자.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(Uuid);

impl PermissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PermissionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 권한 동작.
///
/// 허용되는 동작의 닫힌 목록입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    /// 생성
    Create,
    /// 조회
    Read,
    /// 수정
    Update,
    /// 삭제
    Delete,
    /// 관리 (해당 리소스에 대한 전권)
    Manage,
}

impl PermissionAction {
    /// 문자열 표현 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::Create => "create",
            PermissionAction::Read => "read",
            PermissionAction::Update => "update",
            PermissionAction::Delete => "delete",
            PermissionAction::Manage => "manage",
        }
    }

    /// 문자열에서 동작 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(PermissionAction::Create),
            "read" => Some(PermissionAction::Read),
            "update" => Some(PermissionAction::Update),
            "delete" => Some(PermissionAction::Delete),
            "manage" => Some(PermissionAction::Manage),
            _ => None,
        }
    }
}

impl std::fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 검증된 권한 이름 (`action:resource`).
///
/// 생성 시점에 형식이 검증되므로, 이 타입의 값은 항상 유효한 권한 이름입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PermissionName(String);

impl PermissionName {
    /// 동작과 리소스로 권한 이름을 생성합니다.
    pub fn new(action: PermissionAction, resource: &str) -> Result<Self, IamError> {
        validate_resource(resource)?;
        Ok(Self(format!("{}:{}", action.as_str(), resource)))
    }

    /// `action:resource` 문자열을 파싱하고 검증합니다.
    ///
    /// # Errors
    ///
    /// 동작이 허용 목록에 없거나 리소스가 비어 있으면 `InvalidInput`을
    /// 반환합니다.
    pub fn parse(s: &str) -> Result<Self, IamError> {
        let (action, resource) = s
            .split_once(':')
            .ok_or_else(|| IamError::InvalidInput(format!("권한 이름 형식 오류: {}", s)))?;

        PermissionAction::parse(action)
            .ok_or_else(|| IamError::InvalidInput(format!("허용되지 않는 동작: {}", action)))?;
        validate_resource(resource)?;

        Ok(Self(s.to_string()))
    }

    /// 권한의 동작 부분.
    pub fn action(&self) -> PermissionAction {
        // 생성자 전부가 형식을 검증하므로 실패는 내부 버그
        let (action, _) = self
            .0
            .split_once(':')
            .expect("PermissionName은 항상 'action:resource' 형식");
        PermissionAction::parse(action).expect("PermissionName의 동작은 항상 허용 목록에 속함")
    }

    /// 권한의 리소스 부분.
    pub fn resource(&self) -> &str {
        let (_, resource) = self
            .0
            .split_once(':')
            .expect("PermissionName은 항상 'action:resource' 형식");
        resource
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_resource(resource: &str) -> Result<(), IamError> {
    if resource.is_empty()
        || !resource
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(IamError::InvalidInput(format!(
            "잘못된 리소스 이름: {:?}",
            resource
        )));
    }
    Ok(())
}

impl std::str::FromStr for PermissionName {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for PermissionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PermissionName::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 권한 엔티티.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    /// 고유 식별자
    pub id: PermissionId,
    /// 권한 이름 (`action:resource`, 전역 유일)
    pub name: PermissionName,
    /// 설명
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// 새 권한을 생성합니다.
    pub fn new(name: PermissionName, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PermissionId::new(),
            name,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 권한의 동작.
    pub fn action(&self) -> PermissionAction {
        self.name.action()
    }

    /// 권한의 리소스.
    pub fn resource(&self) -> &str {
        self.name.resource()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_name() {
        let name = PermissionName::parse("read:team_profiles").unwrap();
        assert_eq!(name.action(), PermissionAction::Read);
        assert_eq!(name.resource(), "team_profiles");
        assert_eq!(name.as_str(), "read:team_profiles");
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        assert!(PermissionName::parse("destroy:users").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(PermissionName::parse("manageusers").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_resource() {
        assert!(PermissionName::parse("read:").is_err());
    }

    #[test]
    fn test_action_accessor_matches_each_variant() {
        let cases = [
            ("create:content", PermissionAction::Create),
            ("read:own_profile", PermissionAction::Read),
            ("update:content", PermissionAction::Update),
            ("delete:content", PermissionAction::Delete),
            ("manage:users", PermissionAction::Manage),
        ];
        for (raw, expected) in cases {
            let name = PermissionName::parse(raw).unwrap();
            assert_eq!(name.action(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_new_from_parts() {
        let name = PermissionName::new(PermissionAction::Manage, "users").unwrap();
        assert_eq!(name.as_str(), "manage:users");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<PermissionName, _> = serde_json::from_str("\"update:content\"");
        assert!(ok.is_ok());

        let bad: Result<PermissionName, _> = serde_json::from_str("\"update content\"");
        assert!(bad.is_err());
    }

    proptest! {
        /// 유효하게 생성된 모든 권한 이름은 파싱 후에도 동일해야 한다.
        #[test]
        fn prop_name_roundtrip(
            action in prop_oneof![
                Just(PermissionAction::Create),
                Just(PermissionAction::Read),
                Just(PermissionAction::Update),
                Just(PermissionAction::Delete),
                Just(PermissionAction::Manage),
            ],
            resource in "[a-z][a-z0-9_]{0,30}",
        ) {
            let name = PermissionName::new(action, &resource).unwrap();
            let parsed = PermissionName::parse(name.as_str()).unwrap();
            prop_assert_eq!(parsed.action(), action);
            prop_assert_eq!(parsed.resource(), resource);
        }

        /// 구분자 없는 임의 문자열은 항상 거부된다.
        #[test]
        fn prop_rejects_without_separator(s in "[a-z0-9_]{1,40}") {
            prop_assert!(PermissionName::parse(&s).is_err());
        }
    }
}
