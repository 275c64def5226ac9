use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::{KeyValueStorage, StorageError};

/// Storage key of the persisted session.
pub const SESSION_KEY: &str = "hadith_admin_auth";

/// Session lifetime in hours.
const SESSION_EXPIRY_HOURS: i64 = 24;

/// Random bytes in a session token.
const TOKEN_BYTES: usize = 32;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Admin password is not configured")]
    NotConfigured,

    #[error("Invalid password hash: {0}")]
    InvalidHash(String),

    #[error("Failed to save session: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to encode session: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Hash a password into an argon2 PHC string for the config file.
pub fn hash_password(password: &str) -> Result<String, SessionError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SessionError::InvalidHash(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: Option<String>,
}

impl AdminCredentials {
    pub fn verify(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let stored = self
            .password_hash
            .as_deref()
            .ok_or(SessionError::NotConfigured)?;
        let parsed =
            PasswordHash::new(stored).map_err(|e| SessionError::InvalidHash(e.to_string()))?;

        let password_ok = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        if password_ok && username == self.username {
            Ok(())
        } else {
            Err(SessionError::InvalidCredentials)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionData {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSessionData {
    fn new() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            token: hex::encode(bytes),
            expires_at: Utc::now() + Duration::hours(SESSION_EXPIRY_HOURS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_minutes().max(0)
    }
}

pub struct AdminSession {
    storage: Arc<dyn KeyValueStorage>,
}

impl AdminSession {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// The stored session, if present and unexpired. Corrupt or expired
    /// sessions read as logged out.
    pub fn current(&self) -> Option<AdminSessionData> {
        let raw = match self.storage.get_item(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(error = %e, "Failed to read admin session");
                return None;
            }
        };
        match serde_json::from_str::<AdminSessionData>(&raw) {
            Ok(data) if !data.is_expired() => Some(data),
            Ok(_) => {
                debug!("Admin session expired");
                None
            }
            Err(e) => {
                warn!(error = %e, "Corrupt admin session");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn login(
        &self,
        username: &str,
        password: &str,
        credentials: &AdminCredentials,
    ) -> Result<AdminSessionData, SessionError> {
        credentials.verify(username, password)?;

        let data = AdminSessionData::new();
        self.storage
            .set_item(SESSION_KEY, &serde_json::to_string(&data)?)?;
        info!(username, "Admin logged in");
        Ok(data)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.storage.remove_item(SESSION_KEY)?;
        Ok(())
    }
}
