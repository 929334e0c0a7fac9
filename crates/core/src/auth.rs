//! Password hashing, JWT access tokens and opaque token generation.
//!
//! Passwords are bcrypt over a SHA-256 digest of the plaintext. The double
//! hash is load-bearing: existing credentials were stored that way, and it
//! also sidesteps bcrypt's 72-byte input cap.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use encore_types::{AppError, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

pub fn hash_password(password: &str) -> Result<String> {
    let digest = Sha256::digest(password.as_bytes());
    bcrypt::hash(digest.as_slice(), bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let digest = Sha256::digest(password.as_bytes());
    bcrypt::verify(digest.as_slice(), password_hash).unwrap_or(false)
}

pub fn create_access_token(email: &str, secret: &str, expire_minutes: i64) -> Result<String> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (Utc::now() + Duration::minutes(expire_minutes)).timestamp(),
        token_type: "access".to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

/// Decode and validate an access token. Returns None for anything that
/// should read as "not authenticated": bad signature, expired, wrong type.
pub fn verify_access_token(token: &str, secret: &str) -> Option<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    if data.claims.token_type != "access" {
        return None;
    }

    Some(data.claims)
}

/// Opaque refresh token plus its expiry instant.
pub fn generate_refresh_token(expire_days: i64) -> (String, DateTime<Utc>) {
    (opaque_token(), Utc::now() + Duration::days(expire_days))
}

/// 32 random bytes, url-safe base64 without padding. Used for refresh
/// tokens and queue tokens.
pub fn opaque_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Equality check that does not leak the mismatch position through timing.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("secret-password").unwrap();
        assert!(verify_password("secret-password", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_verify_password_garbage_hash() {
        assert!(!verify_password("secret-password", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_access_token_round_trip() {
        let token = create_access_token("user@example.com", "test-key", 30).unwrap();
        let claims = verify_access_token(&token, "test-key").unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_access_token_wrong_secret() {
        let token = create_access_token("user@example.com", "test-key", 30).unwrap();
        assert!(verify_access_token(&token, "other-key").is_none());
    }

    #[test]
    fn test_access_token_expired() {
        let token = create_access_token("user@example.com", "test-key", -10).unwrap();
        assert!(verify_access_token(&token, "test-key").is_none());
    }

    #[test]
    fn test_opaque_token_shape() {
        let token = opaque_token();
        // 32 bytes -> 43 chars of unpadded base64url
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, opaque_token());
    }

    #[test]
    fn test_refresh_token_expiry() {
        let (token, expires_at) = generate_refresh_token(7);
        assert_eq!(token.len(), 43);
        let days = (expires_at - Utc::now()).num_days();
        assert!((6..=7).contains(&days));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }
}
