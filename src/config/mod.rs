use serde::Deserialize;
use std::env;

// Top-level configuration container, populated from the environment at startup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub token_service: TokenServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

// Signing key and lifetimes for the access/refresh token pair
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_expires_minutes: i64,
    pub refresh_expires_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: u64,
}

// Base URL of the token issuing endpoints the login/register flows call.
// In a single-node setup this points back at this service's own /lol/api mount.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "museum_booking=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").expect("REDIS_URL must be set"),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                access_expires_minutes: env::var("JWT_ACCESS_EXPIRES_MINUTES")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("JWT_ACCESS_EXPIRES_MINUTES must be a valid number"),
                refresh_expires_days: env::var("JWT_REFRESH_EXPIRES_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .expect("JWT_REFRESH_EXPIRES_DAYS must be a valid number"),
            },
            session: SessionConfig {
                cookie_name: env::var("SESSION_COOKIE_NAME")
                    .unwrap_or_else(|_| "sessionid".to_string()),
                ttl_seconds: env::var("SESSION_TTL_SECONDS")
                    .unwrap_or_else(|_| "1209600".to_string())
                    .parse()
                    .expect("SESSION_TTL_SECONDS must be a valid number"),
            },
            token_service: TokenServiceConfig {
                base_url: env::var("TOKEN_SERVICE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8000/lol/api".to_string()),
                timeout_seconds: env::var("TOKEN_SERVICE_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("TOKEN_SERVICE_TIMEOUT_SECONDS must be a valid number"),
            },
        }
    }
}
