//! Client for the token issuing endpoints. The web login/register flows use
//! it to fetch an access/refresh pair with the submitted credentials.
//!
//! Failure handling is deliberately blunt: any transport error, non-success
//! status or incomplete body is logged and collapsed to `None`. Callers
//! treat a missing pair as "proceed without tokens", never as a hard error.
//! There is no retry or backoff.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};

use crate::auth::TokenPair;
use crate::config::TokenServiceConfig;

#[derive(Debug, Serialize)]
struct ObtainRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: Option<String>,
    refresh: Option<String>,
}

#[derive(Clone)]
pub struct TokenServiceClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TokenServiceClient {
    pub fn from_config(config: &TokenServiceConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Obtain a fresh access/refresh pair for the given credentials.
    pub async fn obtain_pair(&self, username: &str, password: &str) -> Option<TokenPair> {
        let result = self
            .http_client
            .post(format!("{}/token/", self.base_url))
            .json(&ObtainRequest { username, password })
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("Token endpoint returned status {}", response.status());
                return None;
            }
            Err(e) => {
                error!("Error getting token: {}", e);
                return None;
            }
        };

        let body: TokenResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                error!("Error decoding token response: {}", e);
                return None;
            }
        };

        match (body.access, body.refresh) {
            (Some(access), Some(refresh)) => Some(TokenPair { access, refresh }),
            _ => {
                warn!("Received incomplete token data");
                None
            }
        }
    }

    /// Exchange a refresh token for a new access token. When the endpoint
    /// does not rotate the refresh token, the old one is kept in the pair.
    pub async fn refresh(&self, refresh_token: &str) -> Option<TokenPair> {
        let result = self
            .http_client
            .post(format!("{}/token/refresh/", self.base_url))
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("Token refresh endpoint returned status {}", response.status());
                return None;
            }
            Err(e) => {
                error!("Error refreshing token: {}", e);
                return None;
            }
        };

        let body: TokenResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                error!("Error decoding refresh response: {}", e);
                return None;
            }
        };

        body.access.map(|access| TokenPair {
            access,
            refresh: body.refresh.unwrap_or_else(|| refresh_token.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TokenServiceClient {
        TokenServiceClient::new(&server.uri(), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn obtain_pair_returns_tokens_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .and(body_json(json!({"username": "alice", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "acc-123",
                "refresh": "ref-456"
            })))
            .mount(&server)
            .await;

        let pair = client_for(&server).obtain_pair("alice", "pw").await.unwrap();
        assert_eq!(pair.access, "acc-123");
        assert_eq!(pair.refresh, "ref-456");
    }

    #[tokio::test]
    async fn obtain_pair_swallows_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid credentials"
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).obtain_pair("alice", "bad").await.is_none());
    }

    #[tokio::test]
    async fn obtain_pair_rejects_incomplete_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "acc-only"
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).obtain_pair("alice", "pw").await.is_none());
    }

    #[tokio::test]
    async fn obtain_pair_swallows_connection_errors() {
        // Nothing is listening on this port
        let client = TokenServiceClient::new("http://127.0.0.1:1", Duration::from_secs(1));
        assert!(client.obtain_pair("alice", "pw").await.is_none());
    }

    #[tokio::test]
    async fn refresh_keeps_old_token_when_not_rotated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/refresh/"))
            .and(body_json(json!({"refresh": "old-ref"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "new-acc"
            })))
            .mount(&server)
            .await;

        let pair = client_for(&server).refresh("old-ref").await.unwrap();
        assert_eq!(pair.access, "new-acc");
        assert_eq!(pair.refresh, "old-ref");
    }

    #[tokio::test]
    async fn refresh_uses_rotated_token_when_provided() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "new-acc",
                "refresh": "new-ref"
            })))
            .mount(&server)
            .await;

        let pair = client_for(&server).refresh("old-ref").await.unwrap();
        assert_eq!(pair.refresh, "new-ref");
    }
}
