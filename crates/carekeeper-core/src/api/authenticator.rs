use std::sync::Arc;

use reqwest::{header, StatusCode};
use tracing::{debug, info, warn};

use crate::auth::{SessionEvents, SessionStore};

use super::ApiError;

/// Bridges session state into the request/response boundary.
///
/// Every outbound call picks up its `Authorization` header here instead of
/// each caller reading the stored token, and every inbound status is checked
/// here so that 401 handling lives in exactly one place. The authenticator
/// never keeps its own copy of the token; it reads the store on each call.
#[derive(Clone)]
pub struct RequestAuthenticator {
    store: Arc<SessionStore>,
    events: Arc<SessionEvents>,
}

impl RequestAuthenticator {
    pub fn new(store: Arc<SessionStore>, events: Arc<SessionEvents>) -> Self {
        Self { store, events }
    }

    /// Headers for an outbound request: the bearer token when a valid
    /// session exists, otherwise empty. Unauthenticated calls pass through
    /// unmodified so public endpoints keep working.
    pub fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if self.store.is_valid() {
            if let Some(token) = self.store.token() {
                let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ApiError::InvalidResponse(format!("Invalid token: {}", e)))?;
                headers.insert(header::AUTHORIZATION, value);
            }
        }
        Ok(headers)
    }

    /// Inspect an inbound status. A 401 is the sole trigger for
    /// remote-initiated invalidation: the session is cleared, listeners are
    /// notified, and the caller still receives the failure. A 401 on a
    /// public call while nobody is logged in (a failed first sign-in, say)
    /// has no session to invalidate and notifies nobody.
    pub fn handle_status(&self, status: StatusCode) {
        if status != StatusCode::UNAUTHORIZED {
            return;
        }
        match self.store.clear_session() {
            Ok(true) => {
                info!("Received 401, invalidating session");
                self.events.publish();
            }
            Ok(false) => debug!("Received 401 with no active session"),
            Err(e) => {
                // In-memory state is already cleared at this point; tell
                // listeners so the UI still converges to logged out.
                warn!(error = %e, "Failed to clear session after 401");
                self.events.publish();
            }
        }
    }

    /// Check a response, converting non-success statuses into `ApiError`
    /// and running 401 invalidation. The failing call is not retried.
    pub async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        self.handle_status(status);
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.store
    }
}
