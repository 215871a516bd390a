//! Data types shared with the CareKeeper REST API.
//!
//! Field names follow the service's JSON conventions (`_id`, `inviteCode`),
//! so these types serialize to exactly the shape the server sends and the
//! session storage persists.

pub mod user;

pub use user::{AuthResponse, Role, User};
