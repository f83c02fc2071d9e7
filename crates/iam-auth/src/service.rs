//! 인증 흐름 오케스트레이션.
//!
//! 자격 증명 검증 → 토큰 발급, 그리고 토큰 기반 세션 재인증을 담당합니다.
//!
//! # 계정 열거 방지
//!
//! 로그인 실패는 원인(이메일 없음 / 비활성 계정 / 비밀번호 불일치)과 무관하게
//! 동일한 [`IamError::InvalidCredentials`]로 수렴합니다. 세션 갱신 실패도
//! 마찬가지로 단일 [`IamError::TokenInvalid`]로 수렴합니다.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use iam_core::config::{DefaultsConfig, PasswordConfig};
use iam_core::domain::{
    normalize_email, normalize_name, GroupId, GroupStore, PermissionName, Principal,
    PrincipalId, PrincipalProfile, PrincipalStore, RoleId, RoleStore,
};
use iam_core::error::{IamError, IamResult};

use crate::password::{hash_password, validate_password_strength, verify_password};
use crate::resolver::PermissionResolver;
use crate::token::{TokenPair, TokenService};

/// 가입 요청.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    /// 평문 비밀번호. 이 구조체 밖으로 전달되기 전에 해싱됩니다.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// 비어 있으면 기본 역할이 할당됩니다.
    pub role_ids: Vec<RoleId>,
    /// 비어 있으면 기본 그룹이 할당됩니다.
    pub group_ids: Vec<GroupId>,
}

/// 인증 성공 결과: 프로필 + 유효 권한 + 토큰 쌍.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthSession {
    pub principal: PrincipalProfile,
    pub permissions: HashSet<PermissionName>,
    pub tokens: TokenPair,
}

/// 인증 서비스.
pub struct AuthService {
    principals: Arc<dyn PrincipalStore>,
    roles: Arc<dyn RoleStore>,
    groups: Arc<dyn GroupStore>,
    resolver: PermissionResolver,
    tokens: Arc<TokenService>,
    password_config: PasswordConfig,
    defaults: DefaultsConfig,
}

impl AuthService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        roles: Arc<dyn RoleStore>,
        groups: Arc<dyn GroupStore>,
        resolver: PermissionResolver,
        tokens: Arc<TokenService>,
        password_config: PasswordConfig,
        defaults: DefaultsConfig,
    ) -> Self {
        Self {
            principals,
            roles,
            groups,
            resolver,
            tokens,
            password_config,
            defaults,
        }
    }

    /// 로그인.
    ///
    /// 성공 시 마지막 로그인 시각을 갱신하고 새 토큰 쌍을 발급합니다.
    /// 실패한 로그인은 어떤 상태도 바꾸지 않습니다.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> IamResult<AuthSession> {
        let email = normalize_email(email);

        let principal = self
            .principals
            .find_by_email(&email)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?
            .ok_or(IamError::InvalidCredentials)?;

        if !principal.is_active {
            return Err(IamError::InvalidCredentials);
        }

        // Argon2 검증은 CPU 집약적이므로 블로킹 풀에서 수행
        let candidate = password.to_string();
        let hash = principal.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .map_err(|e| IamError::Internal(e.to_string()))?;

        // 해시 형식 오류를 포함한 모든 검증 실패를 동일 에러로 수렴
        if verified.is_err() {
            return Err(IamError::InvalidCredentials);
        }

        let now = Utc::now();
        self.principals
            .record_login(principal.id, now)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;

        let mut principal = principal;
        principal.last_login = Some(now);

        info!(principal = %principal.id, "login succeeded");
        self.session_for(principal).await
    }

    /// 가입.
    ///
    /// 계정을 생성한 뒤 곧바로 토큰 쌍을 발급합니다.
    pub async fn register(&self, fields: NewPrincipal) -> IamResult<AuthSession> {
        let principal = self.create_principal(fields).await?;
        self.session_for(principal).await
    }

    /// 계정 생성.
    ///
    /// 역할/그룹 미지정 시 설정된 기본 역할/그룹을 할당하고, 그룹의
    /// 멤버 역참조를 유지합니다. 토큰은 발급하지 않으므로 관리자에 의한
    /// 대리 생성에도 사용됩니다.
    #[instrument(skip_all, fields(email = %fields.email))]
    pub async fn create_principal(&self, fields: NewPrincipal) -> IamResult<Principal> {
        let email = normalize_email(&fields.email);
        if email.is_empty() || !email.contains('@') {
            return Err(IamError::InvalidInput("잘못된 이메일 형식".into()));
        }
        validate_password_strength(&fields.password)
            .map_err(|msg| IamError::InvalidInput(msg.into()))?;

        // 사전 중복 확인. 동시 가입 경쟁은 저장소의 유일성 제약이 닫는다.
        if self
            .principals
            .find_by_email(&email)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?
            .is_some()
        {
            return Err(IamError::DuplicateEmail);
        }

        let role_ids = self.resolve_role_ids(&fields.role_ids).await?;
        let group_ids = self.resolve_group_ids(&fields.group_ids).await?;

        // 해싱은 비밀번호 설정 시 정확히 한 번
        let plain = fields.password.clone();
        let config = self.password_config.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&plain, &config))
            .await
            .map_err(|e| IamError::Internal(e.to_string()))?
            .map_err(|e| IamError::Internal(e.to_string()))?;

        let mut principal =
            Principal::new(&email, password_hash, fields.first_name, fields.last_name);
        principal.roles = role_ids;
        principal.groups = group_ids.clone();

        self.principals.insert(&principal).await?;

        // 그룹 멤버 역참조 유지. principal 저장과 원자적이지 않음 (저장소 계약 참조).
        for group_id in group_ids {
            self.groups
                .add_member(group_id, principal.id)
                .await
                .map_err(|e| IamError::Store(e.to_string()))?;
        }

        info!(principal = %principal.id, "principal registered");
        Ok(principal)
    }

    /// 비밀번호 변경.
    ///
    /// 현재 비밀번호가 일치해야 하며, 새 비밀번호는 가입 시와 동일한
    /// 강도 규칙을 통과해야 합니다.
    #[instrument(skip_all, fields(principal = %id))]
    pub async fn change_password(
        &self,
        id: PrincipalId,
        current: &str,
        new_password: &str,
    ) -> IamResult<()> {
        validate_password_strength(new_password)
            .map_err(|msg| IamError::InvalidInput(msg.into()))?;

        let mut principal = self
            .principals
            .find_by_id(id)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?
            .ok_or(IamError::PrincipalNotFound)?;

        let candidate = current.to_string();
        let hash = principal.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .map_err(|e| IamError::Internal(e.to_string()))?;
        if verified.is_err() {
            return Err(IamError::InvalidCredentials);
        }

        let plain = new_password.to_string();
        let config = self.password_config.clone();
        principal.password_hash = tokio::task::spawn_blocking(move || hash_password(&plain, &config))
            .await
            .map_err(|e| IamError::Internal(e.to_string()))?
            .map_err(|e| IamError::Internal(e.to_string()))?;
        principal.touch();

        self.principals.update(&principal).await?;

        info!(principal = %principal.id, "password changed");
        Ok(())
    }

    /// Refresh 토큰으로 세션 갱신. 새 토큰 쌍을 발급합니다.
    pub async fn refresh_session(&self, refresh_token: &str) -> IamResult<AuthSession> {
        let (principal, pair) = self
            .tokens
            .refresh(refresh_token, &self.principals)
            .await
            .map_err(IamError::from)?;

        let permissions = self.resolver.effective_permissions(&principal).await?;
        Ok(AuthSession {
            principal: PrincipalProfile::from(&principal),
            permissions,
            tokens: pair,
        })
    }

    /// 로그아웃. principal의 refresh 토큰을 무효화합니다.
    pub async fn logout(&self, id: PrincipalId) -> IamResult<()> {
        self.tokens.revoke(id, &self.principals).await.map_err(IamError::from)
    }

    async fn session_for(&self, principal: Principal) -> IamResult<AuthSession> {
        let permissions = self.resolver.effective_permissions(&principal).await?;
        let tokens = self.tokens.issue(&principal).map_err(IamError::from)?;

        Ok(AuthSession {
            principal: PrincipalProfile::from(&principal),
            permissions,
            tokens,
        })
    }

    /// 역할 ID 검증. 비어 있으면 기본 역할로 대체합니다.
    async fn resolve_role_ids(&self, ids: &[RoleId]) -> IamResult<Vec<RoleId>> {
        if ids.is_empty() {
            let name = normalize_name(&self.defaults.default_role);
            let role = self
                .roles
                .find_by_name(&name)
                .await
                .map_err(|e| IamError::Store(e.to_string()))?
                .ok_or_else(|| IamError::ReferenceNotFound(format!("기본 역할 {}", name)))?;
            return Ok(vec![role.id]);
        }

        let found = self
            .roles
            .find_many(ids)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        if found.len() != ids.len() {
            return Err(IamError::ReferenceNotFound("존재하지 않는 역할 ID".into()));
        }
        Ok(ids.to_vec())
    }

    /// 그룹 ID 검증. 비어 있으면 기본 그룹으로 대체합니다.
    async fn resolve_group_ids(&self, ids: &[GroupId]) -> IamResult<Vec<GroupId>> {
        if ids.is_empty() {
            let name = normalize_name(&self.defaults.default_group);
            let group = self
                .groups
                .find_by_name(&name)
                .await
                .map_err(|e| IamError::Store(e.to_string()))?
                .ok_or_else(|| IamError::ReferenceNotFound(format!("기본 그룹 {}", name)))?;
            return Ok(vec![group.id]);
        }

        let found = self
            .groups
            .find_many(ids)
            .await
            .map_err(|e| IamError::Store(e.to_string()))?;
        if found.len() != ids.len() {
            return Err(IamError::ReferenceNotFound("존재하지 않는 그룹 ID".into()));
        }
        Ok(ids.to_vec())
    }
}
