//! API client for communicating with the CareKeeper REST service.
//!
//! Sign-in and sign-up are public endpoints; everything after them carries
//! the bearer token injected by the `RequestAuthenticator`, which also
//! converges the session to logged-out on any 401.

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::{debug, info};

use crate::models::{AuthResponse, Role, User};

use super::RequestAuthenticator;

/// Base URL of the care service.
const DEFAULT_BASE_URL: &str = "https://takecare-ds3g.onrender.com";

/// HTTP request timeout in seconds.
/// 30s allows for the service's cold starts while failing fast enough for
/// good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the CareKeeper service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    authenticator: RequestAuthenticator,
}

impl ApiClient {
    /// Create a client against the default care service.
    pub fn new(authenticator: RequestAuthenticator) -> Result<Self> {
        Self::with_base_url(authenticator, DEFAULT_BASE_URL)
    }

    /// Create a client against a specific server (self-hosted deployments,
    /// test servers).
    pub fn with_base_url(authenticator: RequestAuthenticator, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authenticator,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Sign in with email and password. Returns the token and user payload;
    /// the caller decides whether to open a session with it (see `login`).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let url = self.endpoint("signin");
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send sign-in request")?;

        let response = self.authenticator.check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse sign-in response")
    }

    /// Register a new account. The service issues a token immediately, so a
    /// successful sign-up doubles as a sign-in.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthResponse> {
        let url = self.endpoint("signup");
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role.as_str(),
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send sign-up request")?;

        let response = self.authenticator.check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse sign-up response")
    }

    /// Sign in and open a session in one step.
    pub async fn login(&self, email: &str, password: &str, ttl: Duration) -> Result<User> {
        let auth = self.sign_in(email, password).await?;
        self.authenticator
            .session()
            .create_session(&auth.token, auth.user.clone(), ttl)?;
        info!(user = %auth.user.email, "Logged in");
        Ok(auth.user)
    }

    /// Clear the local session. The care service keeps no server-side
    /// session state, so logout is purely client-side.
    pub fn logout(&self) -> Result<()> {
        self.authenticator.session().clear_session()?;
        Ok(())
    }

    /// Ask the server whether the current token is still accepted.
    /// A 401 here flows through the usual invalidation path.
    pub async fn validate_token(&self) -> Result<bool> {
        let url = self.endpoint("validate-token");
        let response = self
            .client
            .get(&url)
            .headers(self.authenticator.auth_headers()?)
            .send()
            .await
            .context("Failed to send token validation request")?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        debug!(status = %status, "Token validation rejected");
        self.authenticator.handle_status(status);
        Ok(false)
    }
}
