//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증. 작업 계수는 [`PasswordConfig`]로
//! 조정합니다. 해싱은 비밀번호 설정/변경 시 정확히 한 번 수행되며,
//! 조회 경로에서는 절대 해싱하지 않습니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use iam_core::config::PasswordConfig;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("잘못된 해싱 파라미터")]
    InvalidParams,
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

fn argon2(config: &PasswordConfig) -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
        .map_err(|_| PasswordError::InvalidParams)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 비밀번호 해싱.
///
/// 솔트는 호출마다 새로 생성되므로 같은 비밀번호라도 해시는 매번 다릅니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트·파라미터 포함)
pub fn hash_password(password: &str, config: &PasswordConfig) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2(config)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 저장된 PHC 해시에 인코딩된 파라미터로 재계산하여 비교합니다.
/// 비교는 argon2 내부에서 상수 시간으로 수행됩니다.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 비밀번호 강도 검증.
///
/// # 요구사항
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 영문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("비밀번호는 최소 8자 이상이어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("비밀번호에 최소 1개의 숫자가 포함되어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("비밀번호에 최소 1개의 영문자가 포함되어야 합니다");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 테스트용 저비용 파라미터 (기본 파라미터는 테스트를 느리게 함)
    fn test_config() -> PasswordConfig {
        PasswordConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "TestPassword123!";
        let hash = hash_password(password, &test_config()).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).is_ok());
        assert!(verify_password("WrongPassword123!", &hash).is_err());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let cfg = test_config();
        let hash1 = hash_password("Password1", &cfg).unwrap();
        let hash2 = hash_password("Password1", &cfg).unwrap();

        // 솔트가 다르므로 해시도 다름
        assert_ne!(hash1, hash2);

        assert!(verify_password("Password1", &hash1).is_ok());
        assert!(verify_password("Password1", &hash2).is_ok());
    }

    #[test]
    fn test_work_factor_is_encoded_in_hash() {
        let hash = hash_password("Password1", &test_config()).unwrap();
        // 검증은 해시에 인코딩된 파라미터를 사용하므로 설정 없이도 성공
        assert!(hash.contains("m=8,t=1,p=1"));
        assert!(verify_password("Password1", &hash).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("Password1").is_ok());
        assert!(validate_password_strength("abcd1234").is_ok());

        // 너무 짧음
        assert!(validate_password_strength("Pass1").is_err());
        // 숫자 없음
        assert!(validate_password_strength("Password").is_err());
        // 영문자 없음
        assert!(validate_password_strength("12345678").is_err());
        // 빈 비밀번호
        assert!(validate_password_strength("").is_err());
    }

    #[test]
    fn test_unicode_password() {
        let password = "한글패스워드123";
        let hash = hash_password(password, &test_config()).unwrap();
        assert!(verify_password(password, &hash).is_ok());
    }
}
