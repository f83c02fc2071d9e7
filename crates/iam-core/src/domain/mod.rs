//! IAM 도메인 모델.
//!
//! Principal(사용자), Role, Group, Permission 엔티티와 저장소 추상화를
//! 정의합니다. 모든 엔티티 ID는 Uuid 래퍼 newtype으로, 서로 다른 엔티티의
//! ID가 뒤섞이는 것을 컴파일 시점에 차단합니다.

pub mod group;
pub mod permission;
pub mod principal;
pub mod role;
pub mod store;

pub use group::{Group, GroupId};
pub use permission::{Permission, PermissionAction, PermissionId, PermissionName};
pub use principal::{normalize_email, Principal, PrincipalId, PrincipalProfile};
pub use role::{normalize_name, Role, RoleId};
pub use store::{
    GroupStore, PermissionStore, PrincipalPage, PrincipalQuery, PrincipalStore, RoleStore,
    StoreError,
};
