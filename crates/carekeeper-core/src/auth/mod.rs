//! Session lifecycle management.
//!
//! This module provides:
//! - `SessionStore`: single source of truth for the active session, with
//!   durable persistence and strict expiry checking
//! - `ExpiryMonitor`: background task that extends a session nearing expiry
//! - `SessionEvents`: listener registry notified when the session becomes
//!   invalid (logout, expiry, or a 401 from the server)
//!
//! Exactly one session is active per store; a new login overwrites the
//! previous session without requiring an explicit logout first.

pub mod events;
pub mod monitor;
pub mod session;

pub use events::{ListenerId, SessionEvents};
pub use monitor::ExpiryMonitor;
pub use session::{SessionError, SessionRecord, SessionStore};
