use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::User;
use crate::storage::{KeyValueStore, StorageError};

/// Persisted storage keys. The user record is stored as JSON and the expiry
/// as a base-10 epoch-milliseconds string.
pub(crate) const TOKEN_KEY: &str = "token";
pub(crate) const USER_KEY: &str = "user";
pub(crate) const EXPIRES_AT_KEY: &str = "sessionExpiresAt";

/// All keys that make up a persisted session.
pub(crate) const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, USER_KEY, EXPIRES_AT_KEY];

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No active session")]
    NoActiveSession,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The client-side record of an authenticated identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub token: String,
    pub user: User,
    /// Absolute expiry, milliseconds since epoch.
    pub expires_at: i64,
}

impl SessionRecord {
    /// Strict validity check: the session is valid while `now < expires_at`.
    /// A session whose expiry equals the current instant is already invalid.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        !self.is_valid_at(now_ms())
    }

    /// Remaining lifetime, clamped to zero for expired sessions.
    pub fn time_remaining(&self) -> Duration {
        Duration::milliseconds((self.expires_at - now_ms()).max(0))
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Single source of truth for the active session.
///
/// Holds the in-memory record and owns persistence; the request
/// authenticator and expiry monitor share it by `Arc` and never keep their
/// own copy of the token or expiry. Racing `create_session` / `clear_session`
/// calls (e.g. a login racing an auto-logout) are last-write-wins.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    record: Mutex<Option<SessionRecord>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            record: Mutex::new(None),
        }
    }

    /// Restore a persisted session at application start.
    ///
    /// Returns `true` only when a complete, still-valid session was found.
    /// An expired or partial record is purged rather than surfaced, and
    /// storage errors are treated as "no session" (fail closed): a user who
    /// cannot be proven authenticated is logged out.
    pub fn initialize(&self) -> bool {
        match self.load_persisted() {
            Ok(Some(record)) => {
                if record.is_valid_at(now_ms()) {
                    debug!(user = %record.user.email, "Restored persisted session");
                    *self.lock_record() = Some(record);
                    true
                } else {
                    info!("Persisted session has expired, purging");
                    self.purge_best_effort();
                    false
                }
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Failed to restore session, treating as logged out");
                self.purge_best_effort();
                false
            }
        }
    }

    fn load_persisted(&self) -> Result<Option<SessionRecord>, SessionError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user_json = self.storage.get(USER_KEY)?;
        let expires_at = self.storage.get(EXPIRES_AT_KEY)?;

        let (Some(token), Some(user_json), Some(expires_at)) = (token, user_json, expires_at)
        else {
            // A token without an expiry (or any other partial set) is an
            // invalid state; report it as no session so the caller purges.
            return Ok(None);
        };

        let user: User = serde_json::from_str(&user_json).map_err(StorageError::Corrupt)?;
        let expires_at: i64 = expires_at.parse().map_err(|_| {
            StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "invalid session expiry timestamp",
            ))
        })?;

        Ok(Some(SessionRecord {
            token,
            user,
            expires_at,
        }))
    }

    /// Create a new session after sign-in or sign-up.
    ///
    /// The token, user, and expiry are written as one atomic set, then
    /// installed in memory. Any prior session is overwritten.
    pub fn create_session(
        &self,
        token: &str,
        user: User,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let expires_at = now_ms() + ttl.num_milliseconds();
        let user_json = serde_json::to_string(&user).map_err(StorageError::Corrupt)?;
        let expires_str = expires_at.to_string();

        self.storage.set_many(&[
            (TOKEN_KEY, token),
            (USER_KEY, &user_json),
            (EXPIRES_AT_KEY, &expires_str),
        ])?;

        info!(user = %user.email, role = user.role.as_str(), "Session created");
        *self.lock_record() = Some(SessionRecord {
            token: token.to_string(),
            user,
            expires_at,
        });
        Ok(())
    }

    /// Clear the session (logout). Idempotent: clearing an already-empty
    /// store succeeds silently. Returns whether a session was actually
    /// removed, so callers can tell invalidation apart from a no-op.
    pub fn clear_session(&self) -> Result<bool, SessionError> {
        let had_session = self.lock_record().take().is_some();
        self.storage.remove_many(&SESSION_KEYS)?;
        if had_session {
            info!("Session cleared");
        }
        Ok(had_session)
    }

    /// Whether a session exists and has not reached its expiry.
    pub fn is_valid(&self) -> bool {
        self.lock_record()
            .as_ref()
            .map(|r| r.is_valid_at(now_ms()))
            .unwrap_or(false)
    }

    /// Extend the current session's expiry. Only the expiry key is
    /// re-persisted; token and user are untouched.
    pub fn refresh(&self, ttl: Duration) -> Result<(), SessionError> {
        let mut guard = self.lock_record();
        let record = guard.as_mut().ok_or(SessionError::NoActiveSession)?;

        let expires_at = now_ms() + ttl.num_milliseconds();
        self.storage.set(EXPIRES_AT_KEY, &expires_at.to_string())?;
        record.expires_at = expires_at;
        debug!(expires_at, "Session refreshed");
        Ok(())
    }

    /// Replace the user sub-record after a profile edit, leaving token and
    /// expiry untouched.
    pub fn update_user(&self, user: User) -> Result<(), SessionError> {
        let mut guard = self.lock_record();
        let record = guard.as_mut().ok_or(SessionError::NoActiveSession)?;

        let user_json = serde_json::to_string(&user).map_err(StorageError::Corrupt)?;
        self.storage.set(USER_KEY, &user_json)?;
        record.user = user;
        Ok(())
    }

    /// Get the bearer token if a session exists (valid or not).
    pub fn token(&self) -> Option<String> {
        self.lock_record().as_ref().map(|r| r.token.clone())
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock_record().as_ref().map(|r| r.user.clone())
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.lock_record().as_ref().map(|r| r.expires_at)
    }

    /// Remaining session lifetime; zero when no session exists or it has
    /// already expired.
    pub fn time_remaining(&self) -> Duration {
        self.lock_record()
            .as_ref()
            .map(|r| r.time_remaining())
            .unwrap_or_else(Duration::zero)
    }

    /// Whether the session is valid but will expire within `window`.
    pub fn expiring_soon(&self, window: Duration) -> bool {
        let remaining = self.time_remaining();
        remaining > Duration::zero() && remaining < window
    }

    fn lock_record(&self) -> std::sync::MutexGuard<'_, Option<SessionRecord>> {
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn purge_best_effort(&self) {
        if let Err(e) = self.clear_session() {
            warn!(error = %e, "Failed to purge stale session from storage");
        }
    }
}
