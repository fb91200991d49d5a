use std::sync::Arc;

use super::refresh::TokenRefresher;
use super::session::SessionStore;
use super::types::{
    AuthResponse, Identity, LoginRequest, ProfileUpdate, Redirect, RefreshOutcome, RegisterRequest,
};
use crate::client::ApiClient;
use crate::error::Result;
use crate::navigator::Navigator;

/// Credential lifecycle manager
/// Owns login and registration, the observable identity, and logout
pub struct AuthService {
    /// Intercepted transport for API calls
    api: Arc<ApiClient>,

    /// Shared session state
    session: Arc<SessionStore>,

    /// Refresh exchange, shared with the transport
    refresher: Arc<TokenRefresher>,

    /// Browsing-context seam for logout navigation
    navigator: Arc<dyn Navigator>,
}

impl AuthService {
    pub fn new(
        api: Arc<ApiClient>,
        session: Arc<SessionStore>,
        refresher: Arc<TokenRefresher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            session,
            refresher,
            navigator,
        }
    }

    /// Exchange user credentials for a session. Failures are logged and
    /// propagated; user-facing messaging is the caller's concern
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Identity> {
        let response: AuthResponse =
            self.api
                .post("/auth/login", credentials)
                .await
                .inspect_err(|e| {
                    tracing::error!("Login failed: {}", e);
                })?;

        Ok(self.store_session(response))
    }

    /// Create a new account; same session contract as `login`
    pub async fn register(&self, profile: &RegisterRequest) -> Result<Identity> {
        let response: AuthResponse =
            self.api
                .post("/auth/register", profile)
                .await
                .inspect_err(|e| {
                    tracing::error!("Registration failed: {}", e);
                })?;

        Ok(self.store_session(response))
    }

    fn store_session(&self, response: AuthResponse) -> Identity {
        self.session
            .store_tokens(&response.token, response.refresh_token.as_deref());
        self.session.store_identity(&response.user);
        response.user
    }

    /// Exchange the refresh credential for a new access credential
    pub async fn refresh_access_token(&self) -> RefreshOutcome {
        self.refresher.refresh().await
    }

    /// Fetch the caller's own profile. Absence means "not logged in" and is
    /// an expected steady state, never an error
    pub async fn current_user(&self) -> Option<Identity> {
        match self.api.get::<Identity>("/users/me").await {
            Ok(identity) => {
                self.session.store_identity(&identity);
                Some(identity)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch current user: {}", e);
                None
            }
        }
    }

    /// Partial update of the mutable profile fields
    pub async fn update_profile(&self, fields: &ProfileUpdate) -> Result<Identity> {
        let identity: Identity = self.api.put("/users/me", fields).await.inspect_err(|e| {
            tracing::error!("Profile update failed: {}", e);
        })?;

        self.session.store_identity(&identity);
        Ok(identity)
    }

    /// Clear the session and return to the login page.
    /// Safe to call when already logged out
    pub fn logout(&self) {
        self.session.clear();
        self.navigator.navigate("/login");
    }

    /// Route guard: redirect to the login page when no access credential is
    /// persisted. Pure check; does not validate the credential
    pub fn require_auth(&self, path: &str) -> Option<Redirect> {
        if self.session.is_authenticated() {
            return None;
        }

        Some(Redirect {
            location: format!("/login?redirectTo={}", path),
            status: 302,
        })
    }
}
