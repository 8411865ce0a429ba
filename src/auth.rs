//! Password hashing and JWT issuing/verification.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::Requester;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Requester {
    fn from(claims: Claims) -> Self { Requester::new(claims.sub, claims.roles) }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        }
    }
}

/// HS256 token service.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, roles: &[String]) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims { sub: user_id, roles: roles.to_vec(), iat: now.timestamp(), exp: (now + self.ttl).timestamp() };
        Ok(jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_check() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("secret123", "not-a-phc-string"));
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = TokenService::new("test-secret-that-is-long-enough-for-hs256", Duration::hours(1));
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, &["user".to_string(), "admin".to_string()]).unwrap();
        let requester: Requester = tokens.verify(&token).unwrap().into();
        assert_eq!(requester.user_id, user_id);
        assert!(requester.is_admin());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = TokenService::new("first-secret-first-secret-first-secret", Duration::hours(1));
        let verifier = TokenService::new("other-secret-other-secret-other-secret", Duration::hours(1));
        let token = issuer.issue(Uuid::new_v4(), &[]).unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid(_))));
        assert!(matches!(verifier.verify("garbage"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new("test-secret-that-is-long-enough-for-hs256", Duration::hours(-2));
        let token = tokens.issue(Uuid::new_v4(), &[]).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }
}
