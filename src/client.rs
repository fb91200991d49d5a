// HTTP transport with transparent credential refresh
//
// Every resource service talks to the API through this client. It attaches
// the persisted bearer credential to outgoing requests and converts an
// expired-credential response (401) into a single refresh exchange shared by
// all requests failing inside the same window.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{oneshot, Mutex};

use crate::auth::types::RefreshOutcome;
use crate::auth::{SessionStore, TokenRefresher};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::navigator::Navigator;

/// Continuation parked while a refresh exchange is in flight. Resolved with
/// the new access credential, or rejected with the refresh failure reason;
/// a rejected caller still fails with its own original 401
type Waiter = oneshot::Sender<std::result::Result<String, String>>;

/// Single-flight refresh state. The flag and the queue live behind one lock:
/// a request hitting a 401 either starts the refresh or parks behind the one
/// in flight, never both
#[derive(Default)]
struct RefreshState {
    in_progress: bool,
    pending: Vec<Waiter>,
}

/// HTTP client for the CareLink API
///
/// State is per instance, so independent clients (for example in tests) never
/// share a refresh window.
pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Root URL plus path prefix
    base_url: String,

    /// Shared session state; the bearer credential is read at send time
    session: Arc<SessionStore>,

    /// Refresh exchange, injected at construction
    refresher: Arc<TokenRefresher>,

    /// Browsing-context seam
    navigator: Arc<dyn Navigator>,

    /// Single-flight refresh state
    refresh_state: Mutex<RefreshState>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        refresher: Arc<TokenRefresher>,
        navigator: Arc<dyn Navigator>,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            session,
            refresher,
            navigator,
            refresh_state: Mutex::new(RefreshState::default()),
        })
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body, returning the JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode_body(body)?;
        let response = self.request(Method::POST, path, Some(&body)).await?;
        Ok(response.json().await?)
    }

    /// PUT a JSON body, returning the JSON response
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode_body(body)?;
        let response = self.request(Method::PUT, path, Some(&body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE a resource, discarding any response body
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Send one attempt, attaching the stored bearer credential at send time
    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, url = %url, "Sending HTTP request");
        Ok(request.send().await?)
    }

    /// Execute a request through the full interception pipeline
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let response = self.send(&method, path, body).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED {
            return self.handle_unauthorized(method, path, body, message).await;
        }

        tracing::warn!(status = %status, path = path, "Request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Re-issue the original request once with the refreshed credential.
    /// A second 401 here propagates unchanged; refreshing again would loop
    async fn retry_original(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let response = self.send(&method, path, body).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, path = path, "Retried request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// The refresh protocol: share one exchange across every request that
    /// fails with 401 while it is in flight
    async fn handle_unauthorized(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        message: String,
    ) -> Result<Response, ApiError> {
        let original_error = ApiError::Status {
            status: 401,
            message,
        };

        // A 401 on the login page is a failed login, not an expired session
        if self.navigator.current_path().contains("/login") {
            return Err(original_error);
        }

        let waiter = {
            let mut state = self.refresh_state.lock().await;
            if state.in_progress {
                let (tx, rx) = oneshot::channel();
                state.pending.push(tx);
                Some(rx)
            } else {
                state.in_progress = true;
                None
            }
        };

        if let Some(rx) = waiter {
            tracing::debug!(path = path, "Refresh in flight, queueing request");
            return match rx.await {
                Ok(Ok(_token)) => self.retry_original(method, path, body).await,
                Ok(Err(reason)) => {
                    tracing::debug!(path = path, reason = %reason, "Shared refresh failed");
                    Err(original_error)
                }
                Err(_) => Err(original_error),
            };
        }

        tracing::warn!(path = path, "Received 401, refreshing access credential");
        let outcome = self.refresher.refresh().await;

        // Reset the flag and take the queue in one step; nothing can enqueue
        // after this point, so the drain below happens exactly once
        let pending = {
            let mut state = self.refresh_state.lock().await;
            state.in_progress = false;
            std::mem::take(&mut state.pending)
        };

        match outcome {
            RefreshOutcome::Refreshed(token) => {
                for waiter in pending {
                    let _ = waiter.send(Ok(token.clone()));
                }
                self.retry_original(method, path, body).await
            }
            RefreshOutcome::NoSession => {
                self.end_session("no refresh credential available", pending);
                Err(original_error)
            }
            RefreshOutcome::Failed(reason) => {
                self.end_session(&reason, pending);
                Err(original_error)
            }
        }
    }

    /// Terminal authentication failure: clear all persisted state, send the
    /// user to the login page with a way back, and reject every queued caller
    fn end_session(&self, reason: &str, pending: Vec<Waiter>) {
        tracing::warn!("Ending session, refresh unavailable: {}", reason);

        self.session.clear();
        let target = format!("/login?redirectTo={}", self.navigator.current_path());
        self.navigator.navigate(&target);

        for waiter in pending {
            let _ = waiter.send(Err(reason.to_string()));
        }
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to serialize request body: {}", e)))
}
