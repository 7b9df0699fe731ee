//! JWT issuance/verification for the chatbot API and bcrypt password
//! handling for user accounts. The access/refresh pair issued here is the
//! same pair the token endpoints hand out and the browse page exposes.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// The access/refresh pair as it travels over the wire and through sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn issue(
    config: &JwtConfig,
    user_id: i64,
    username: &str,
    token_type: &str,
    lifetime: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        token_type: token_type.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Mint a fresh access/refresh pair for a user.
pub fn issue_pair(
    config: &JwtConfig,
    user_id: i64,
    username: &str,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    let access = issue(
        config,
        user_id,
        username,
        TOKEN_TYPE_ACCESS,
        Duration::minutes(config.access_expires_minutes),
    )?;
    let refresh = issue(
        config,
        user_id,
        username,
        TOKEN_TYPE_REFRESH,
        Duration::days(config.refresh_expires_days),
    )?;
    Ok(TokenPair { access, refresh })
}

fn verify(config: &JwtConfig, token: &str, expected_type: &str) -> Option<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    if data.claims.token_type != expected_type {
        return None;
    }
    Some(data.claims)
}

pub fn verify_access(config: &JwtConfig, token: &str) -> Option<Claims> {
    verify(config, token, TOKEN_TYPE_ACCESS)
}

pub fn verify_refresh(config: &JwtConfig, token: &str) -> Option<Claims> {
    verify(config, token, TOKEN_TYPE_REFRESH)
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_expires_minutes: 30,
            refresh_expires_days: 7,
        }
    }

    #[test]
    fn issued_pair_round_trips() {
        let config = test_config();
        let pair = issue_pair(&config, 42, "alice").unwrap();

        let access = verify_access(&config, &pair.access).unwrap();
        assert_eq!(access.sub, 42);
        assert_eq!(access.username, "alice");
        assert_eq!(access.token_type, TOKEN_TYPE_ACCESS);

        let refresh = verify_refresh(&config, &pair.refresh).unwrap();
        assert_eq!(refresh.token_type, TOKEN_TYPE_REFRESH);
    }

    #[test]
    fn refresh_token_is_not_a_valid_access_token() {
        let config = test_config();
        let pair = issue_pair(&config, 1, "bob").unwrap();
        assert!(verify_access(&config, &pair.refresh).is_none());
        assert!(verify_refresh(&config, &pair.access).is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let pair = issue_pair(&config, 1, "bob").unwrap();

        let other = JwtConfig {
            secret: "different".to_string(),
            ..test_config()
        };
        assert!(verify_access(&other, &pair.access).is_none());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let config = JwtConfig {
            access_expires_minutes: -10,
            ..test_config()
        };
        let pair = issue_pair(&config, 7, "carol").unwrap();
        assert!(verify_access(&config, &pair.access).is_none());
    }

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
