// Credential refresh exchange

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use super::session::SessionStore;
use super::types::{RefreshOutcome, RefreshRequest, RefreshResponse};
use crate::config::ClientConfig;

/// Exchanges the persisted refresh credential for a new access credential.
///
/// Owns a dedicated HTTP client so the exchange never travels through the
/// intercepted transport, which would recurse on a rejected refresh.
pub struct TokenRefresher {
    /// HTTP client for refresh requests
    client: Client,

    /// Absolute URL of the refresh endpoint
    refresh_url: String,

    /// Shared session state
    session: Arc<SessionStore>,
}

impl TokenRefresher {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .context("Failed to create refresh HTTP client")?;

        Ok(Self {
            client,
            refresh_url: format!("{}/auth/refresh", config.base_url()),
            session,
        })
    }

    /// Exchange the persisted refresh credential for a new pair.
    ///
    /// Exchange failures are logged and folded into the outcome; the transport
    /// handles every non-`Refreshed` outcome the same way, so this never
    /// returns an error.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.session.refresh_token() else {
            tracing::debug!("No refresh credential persisted, skipping exchange");
            return RefreshOutcome::NoSession;
        };

        match self.exchange(refresh_token).await {
            Ok(response) => {
                self.session
                    .store_tokens(&response.token, Some(&response.refresh_token));
                tracing::info!("Access credential refreshed");
                RefreshOutcome::Refreshed(response.token)
            }
            Err(e) => {
                tracing::error!("Credential refresh failed: {:#}", e);
                RefreshOutcome::Failed(e.to_string())
            }
        }
    }

    async fn exchange(&self, refresh_token: String) -> Result<RefreshResponse> {
        let response = self
            .client
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .context("Failed to send refresh request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Refresh endpoint returned {}: {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse refresh response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn refresher_for(url: String, session: Arc<SessionStore>) -> TokenRefresher {
        let config = ClientConfig {
            api_url: url,
            ..ClientConfig::default()
        };
        TokenRefresher::new(&config, session).unwrap()
    }

    #[tokio::test]
    async fn test_no_session_without_refresh_token() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        let refresher = refresher_for("http://127.0.0.1:1".to_string(), session);

        // No network call happens; the unreachable URL would fail otherwise
        assert_eq!(refresher.refresh().await, RefreshOutcome::NoSession);
    }

    #[tokio::test]
    async fn test_successful_exchange_persists_new_pair() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/auth/refresh")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"refresh_token": "R1"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token": "T2", "refresh_token": "R2"}"#)
            .create_async()
            .await;

        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        session.store_tokens("T1", Some("R1"));

        let refresher = refresher_for(server.url(), session.clone());
        let outcome = refresher.refresh().await;

        mock.assert_async().await;
        assert_eq!(outcome, RefreshOutcome::Refreshed("T2".to_string()));
        assert_eq!(session.access_token(), Some("T2".to_string()));
        assert_eq!(session.refresh_token(), Some("R2".to_string()));
    }

    #[tokio::test]
    async fn test_server_error_becomes_failed_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/auth/refresh")
            .with_status(500)
            .with_body("refresh token revoked")
            .create_async()
            .await;

        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        session.store_tokens("T1", Some("R1"));

        let refresher = refresher_for(server.url(), session.clone());
        match refresher.refresh().await {
            RefreshOutcome::Failed(reason) => assert!(reason.contains("500")),
            other => panic!("expected Failed, got {:?}", other),
        }

        // A failed exchange does not touch the stored pair; the transport
        // decides whether to end the session
        assert_eq!(session.access_token(), Some("T1".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_server_becomes_failed_outcome() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        session.store_tokens("T1", Some("R1"));

        let refresher = refresher_for("http://127.0.0.1:1".to_string(), session);
        assert!(matches!(refresher.refresh().await, RefreshOutcome::Failed(_)));
    }
}
