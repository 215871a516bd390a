//! REST API client module for the CareKeeper service.
//!
//! This module provides the `ApiClient` for talking to the care service and
//! the `RequestAuthenticator` that bridges session state into every call:
//! attaching the bearer token on the way out and converging the session to
//! logged-out when a 401 comes back.

pub mod authenticator;
pub mod client;
pub mod error;

pub use authenticator::RequestAuthenticator;
pub use client::ApiClient;
pub use error::ApiError;
