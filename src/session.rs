//! Server-side sessions backed by Redis. Each session is a JSON blob under
//! `session:{id}` with a sliding TTL; the id travels in a cookie. The web
//! handlers keep the logged-in user and their token pair here.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::TokenPair;
use crate::config::SessionConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionData {
    pub fn token_pair(&self) -> Option<TokenPair> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(TokenPair {
                access: access.clone(),
                refresh: refresh.clone(),
            }),
            _ => None,
        }
    }

    pub fn set_token_pair(&mut self, pair: &TokenPair) {
        self.access_token = Some(pair.access.clone());
        self.refresh_token = Some(pair.refresh.clone());
    }
}

#[derive(Clone)]
pub struct SessionStore {
    conn: MultiplexedConnection,
    pub cookie_name: String,
    ttl_seconds: u64,
}

impl SessionStore {
    pub async fn connect(redis_url: &str, config: &SessionConfig) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(SessionStore {
            conn,
            cookie_name: config.cookie_name.clone(),
            ttl_seconds: config.ttl_seconds,
        })
    }

    fn key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    /// Create a logged-in session, returning the new session id.
    pub async fn create(&self, data: &SessionData) -> Result<String, redis::RedisError> {
        let session_id = Uuid::new_v4().to_string();
        self.save(&session_id, data).await?;
        info!("Created session for user {}", data.user_id);
        Ok(session_id)
    }

    pub async fn save(
        &self,
        session_id: &str,
        data: &SessionData,
    ) -> Result<(), redis::RedisError> {
        let payload = serde_json::to_string(data).expect("session data serializes");
        let mut conn = self.conn.clone();
        conn.set_ex(Self::key(session_id), payload, self.ttl_seconds)
            .await
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<SessionData>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(Self::key(session_id)).await?;
        Ok(payload.and_then(|p| serde_json::from_str(&p).ok()))
    }

    /// Drop a session (logout).
    pub async fn destroy(&self, session_id: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::key(session_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_requires_both_halves() {
        let mut data = SessionData {
            user_id: 1,
            access_token: Some("a".into()),
            refresh_token: None,
        };
        assert!(data.token_pair().is_none());

        data.set_token_pair(&TokenPair {
            access: "a".into(),
            refresh: "r".into(),
        });
        let pair = data.token_pair().unwrap();
        assert_eq!(pair.access, "a");
        assert_eq!(pair.refresh, "r");
    }

    #[test]
    fn session_payload_round_trips_as_json() {
        let data = SessionData {
            user_id: 9,
            access_token: Some("tok".into()),
            refresh_token: Some("ref".into()),
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user_id, 9);
        assert_eq!(back.access_token.as_deref(), Some("tok"));
    }
}
