//! Admin authentication.
//!
//! This module provides:
//! - `AdminCredentials`: the configured admin username and argon2 password hash
//! - `AdminSession`: a random session token persisted with a 24 hour expiry
//!
//! The session gates the translation editor on the client; it lives in the
//! shared storage area next to the cache, settings and bookmarks.

pub mod session;

pub use session::{hash_password, AdminCredentials, AdminSession, AdminSessionData, SessionError};
