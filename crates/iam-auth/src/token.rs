//! 토큰 서비스.
//!
//! Access/Refresh 토큰 쌍의 발급, 검증, 갱신, 무효화를 담당합니다.
//!
//! 서명 비밀 키는 시작 시 한 번 로드된 [`TokenConfig`]로 주입되며,
//! 프로세스 수명 동안 회전되지 않습니다. Access와 Refresh는 서로 다른
//! 비밀 키로 서명되므로 한쪽 토큰을 다른 쪽 검증기에 넣으면 실패합니다.
//!
//! Refresh 토큰은 저장되지 않는 대신 principal의 세대 카운터
//! (`token_generation`)를 클레임에 실어, revoke 시 카운터를 올리는 것으로
//! 기존 refresh 토큰을 무효화합니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use iam_core::config::AuthConfig;
use iam_core::domain::{Principal, PrincipalId, PrincipalStore};
use iam_core::error::IamError;

/// 토큰 서비스 설정.
#[derive(Clone)]
pub struct TokenConfig {
    /// Access Token 서명 비밀 키
    pub access_secret: SecretString,
    /// Refresh Token 서명 비밀 키
    pub refresh_secret: SecretString,
    /// Access Token 만료 시간 (분)
    pub access_expires_minutes: i64,
    /// Refresh Token 만료 시간 (일)
    pub refresh_expires_days: i64,
}

impl From<&AuthConfig> for TokenConfig {
    fn from(cfg: &AuthConfig) -> Self {
        Self {
            access_secret: cfg.access_secret.clone(),
            refresh_secret: cfg.refresh_secret.clone(),
            access_expires_minutes: cfg.access_expires_minutes,
            refresh_expires_days: cfg.refresh_expires_days,
        }
    }
}

/// Access Token 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - principal ID
    pub sub: String,
    /// 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// 토큰 고유 식별자
    pub jti: String,
}

/// Refresh Token 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - principal ID
    pub sub: String,
    /// 발급 시간
    pub iat: i64,
    /// 만료 시간
    pub exp: i64,
    /// 토큰 고유 식별자
    pub jti: String,
    /// 토큰 타입 (항상 "refresh")
    pub token_type: String,
    /// 발급 시점의 principal 세대 카운터
    pub tgen: u64,
}

/// Access Token + Refresh Token 쌍.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// 토큰 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("유효하지 않은 토큰")]
    Invalid,
    #[error("저장소 에러: {0}")]
    Store(String),
}

impl From<TokenError> for IamError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => IamError::TokenExpired,
            TokenError::Invalid => IamError::TokenInvalid,
            TokenError::Store(msg) => IamError::Store(msg),
            TokenError::Encoding(e) => IamError::Internal(e.to_string()),
        }
    }
}

/// 토큰 발급/검증/갱신 서비스.
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Access + Refresh 토큰 쌍 발급.
    ///
    /// Refresh 클레임에는 발급 시점의 `token_generation`이 포함되어,
    /// 이후 revoke되면 갱신이 거부됩니다.
    pub fn issue(&self, principal: &Principal) -> Result<TokenPair, TokenError> {
        let now = Utc::now();

        let access = AccessClaims {
            sub: principal.id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.access_expires_minutes)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let refresh = RefreshClaims {
            sub: principal.id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.refresh_expires_days)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: "refresh".to_string(),
            tgen: principal.token_generation,
        };

        let access_token = encode(
            &Header::default(),
            &access,
            &EncodingKey::from_secret(self.config.access_secret.expose_secret().as_bytes()),
        )?;
        let refresh_token = encode(
            &Header::default(),
            &refresh,
            &EncodingKey::from_secret(self.config.refresh_secret.expose_secret().as_bytes()),
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_expires_minutes * 60,
            token_type: "Bearer".to_string(),
        })
    }

    /// Access Token 검증. 성공 시 principal ID를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `TokenError::Expired`: 만료 시각 경과 (leeway 없음, 경계 일관성 보장)
    /// - `TokenError::Invalid`: 서명 불일치, 형식 오류, sub 파싱 실패
    pub fn verify_access(&self, token: &str) -> Result<PrincipalId, TokenError> {
        let claims = self.decode_claims::<AccessClaims>(token, &self.config.access_secret)?;
        PrincipalId::parse(&claims.sub).ok_or(TokenError::Invalid)
    }

    /// Refresh Token 검증. 성공 시 클레임 전체를 반환합니다.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = self.decode_claims::<RefreshClaims>(token, &self.config.refresh_secret)?;

        if claims.token_type != "refresh" {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    /// Refresh Token으로 새 토큰 쌍 발급.
    ///
    /// 서명/만료 검증 후, 인코딩된 principal이 여전히 존재하고 활성 상태이며
    /// 세대 카운터가 현재 값과 일치하는지 확인합니다. 어떤 이유로 실패하든
    /// 호출자에게는 동일한 `TokenError::Invalid`로 수렴합니다 — refresh 실패
    /// 원인을 구분해 주면 계정 열거에 악용될 수 있습니다.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        principals: &Arc<dyn PrincipalStore>,
    ) -> Result<(Principal, TokenPair), TokenError> {
        let claims = self
            .verify_refresh(refresh_token)
            .map_err(|_| TokenError::Invalid)?;

        let id = PrincipalId::parse(&claims.sub).ok_or(TokenError::Invalid)?;
        let principal = principals
            .find_by_id(id)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))?
            .ok_or(TokenError::Invalid)?;

        if !principal.is_active || principal.token_generation != claims.tgen {
            return Err(TokenError::Invalid);
        }

        let pair = self.issue(&principal)?;
        Ok((principal, pair))
    }

    /// principal의 모든 refresh 토큰 무효화.
    ///
    /// 세대 카운터를 올려 이전에 발급된 refresh 토큰의 갱신을 거부합니다.
    /// 이미 발급된 access 토큰은 남은 수명 동안 유효합니다 (짧은 만료가 상한).
    pub async fn revoke(
        &self,
        id: PrincipalId,
        principals: &Arc<dyn PrincipalStore>,
    ) -> Result<(), TokenError> {
        let generation = principals
            .bump_token_generation(id)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))?;

        debug!(principal = %id, generation, "refresh tokens revoked");
        Ok(())
    }

    fn decode_claims<C: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        secret: &SecretString,
    ) -> Result<C, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        // 만료 경계를 정확히 하기 위해 leeway 제거
        validation.leeway = 0;

        decode::<C>(
            token,
            &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}
