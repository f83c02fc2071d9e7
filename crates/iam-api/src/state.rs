//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! Arc로 래핑되어 Axum의 State extractor를 통해 핸들러에 주입됩니다.

use std::sync::Arc;

use iam_auth::{AuthService, PermissionResolver, PrincipalService, TokenService};
use iam_core::config::AppConfig;
use iam_core::domain::{GroupStore, PermissionStore, PrincipalStore, RoleStore};
use iam_store::MemoryStore;

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// 인증 서비스 - 가입, 로그인, 토큰 갱신, 로그아웃
    pub auth: AuthService,

    /// Principal 관리 서비스 - 관리자 CRUD, 역할/그룹/권한 할당
    pub principals: PrincipalService,

    /// 권한 해석기 - 유효 권한 계산
    pub resolver: PermissionResolver,

    /// 토큰 서비스 - access 토큰 검증 (추출기에서 사용)
    pub tokens: Arc<TokenService>,

    /// Principal 저장소 - 추출기의 계정 로드에 사용
    pub principal_store: Arc<dyn PrincipalStore>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 인메모리 저장소 기반으로 전체 서비스 스택을 구성합니다.
    ///
    /// 기본 데이터 시딩은 포함하지 않습니다. 호출자가
    /// [`iam_auth::initialize_defaults`]를 별도로 수행해야 합니다.
    pub fn from_memory_store(store: MemoryStore, config: &AppConfig) -> Self {
        let principal_store: Arc<dyn PrincipalStore> = Arc::new(store.clone());
        let roles: Arc<dyn RoleStore> = Arc::new(store.clone());
        let groups: Arc<dyn GroupStore> = Arc::new(store.clone());
        let permissions: Arc<dyn PermissionStore> = Arc::new(store);

        let tokens = Arc::new(TokenService::new((&config.auth).into()));
        let resolver = PermissionResolver::new(roles.clone(), groups.clone(), permissions.clone());

        let auth = AuthService::new(
            principal_store.clone(),
            roles.clone(),
            groups.clone(),
            resolver.clone(),
            tokens.clone(),
            config.password.clone(),
            config.defaults.clone(),
        );
        let principals = PrincipalService::new(
            principal_store.clone(),
            roles,
            groups,
            permissions,
        );

        Self {
            auth,
            principals,
            resolver,
            tokens,
            principal_store,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
