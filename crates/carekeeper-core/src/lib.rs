//! CareKeeper core - client-side session lifecycle for the CareKeeper
//! caretaker/patient health-tracking service.
//!
//! This crate provides:
//! - `auth`: token-based session management with durable persistence,
//!   background expiry monitoring, and session invalidation events
//! - `api`: REST client for the care service with automatic bearer token
//!   attachment and 401 handling
//! - `storage`: key-value persistence backends (file-backed and in-memory)
//! - `models`: user and authentication payload types
//!
//! UI layers (screens, navigation) live outside this crate; they consume the
//! session state through `SessionStore` and react to invalidation through
//! `SessionEvents`.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError, RequestAuthenticator};
pub use auth::{ExpiryMonitor, SessionError, SessionEvents, SessionRecord, SessionStore};
pub use config::{Config, SessionConfig};
pub use models::{AuthResponse, Role, User};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
