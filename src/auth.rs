//! Admin login: credential check, CSRF token, session flags and login throttling.

use crate::error::TrackerError;
use actix_session::Session;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const SESSION_AUTHENTICATED: &str = "authenticated";
pub const SESSION_USERNAME: &str = "username";
pub const SESSION_LOGIN_TIME: &str = "login_time";
pub const SESSION_CSRF: &str = "csrf_token";

/// How the configured admin password is stored.
///
/// None of these is a slow password hash; a leaked digest can be brute-forced
/// offline. Prefer the salted form with a long random salt.
#[derive(Clone)]
pub enum PasswordCheck {
    Plain(String),
    /// Lower-case hex SHA-256 of the password.
    Sha256Hex(String),
    /// Lower-case hex SHA-256 of `salt` followed by the password.
    SaltedSha256 { salt: String, digest: String },
}

impl PasswordCheck {
    /// Parse a configured digest: `salt:hex` is salted, a bare hex string is not.
    pub fn from_digest(value: &str) -> Self {
        match value.rsplit_once(':') {
            Some((salt, digest)) if !salt.is_empty() => PasswordCheck::SaltedSha256 {
                salt: salt.to_string(),
                digest: digest.trim().to_ascii_lowercase(),
            },
            _ => PasswordCheck::Sha256Hex(value.trim().to_ascii_lowercase()),
        }
    }
}

impl fmt::Debug for PasswordCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordCheck::Plain(_) => write!(f, "Plain(..)"),
            PasswordCheck::Sha256Hex(_) => write!(f, "Sha256Hex(..)"),
            PasswordCheck::SaltedSha256 { .. } => write!(f, "SaltedSha256(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub username: String,
    pub password: PasswordCheck,
}

impl AdminCredentials {
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }
        match &self.password {
            PasswordCheck::Plain(expected) => constant_time_eq(expected.as_bytes(), password.as_bytes()),
            PasswordCheck::Sha256Hex(expected) => {
                let digest = hex::encode(Sha256::digest(password.as_bytes()));
                constant_time_eq(expected.as_bytes(), digest.as_bytes())
            }
            PasswordCheck::SaltedSha256 { salt, digest } => {
                let mut hasher = Sha256::new();
                hasher.update(salt.as_bytes());
                hasher.update(password.as_bytes());
                let actual = hex::encode(hasher.finalize());
                constant_time_eq(digest.as_bytes(), actual.as_bytes())
            }
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// 32 random bytes, hex encoded.
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The session's CSRF token, created on first request.
pub fn csrf_token(session: &Session) -> Result<String, TrackerError> {
    if let Ok(Some(token)) = session.get::<String>(SESSION_CSRF) {
        return Ok(token);
    }
    let token = generate_csrf_token();
    session
        .insert(SESSION_CSRF, &token)
        .map_err(|e| TrackerError::Session(e.to_string()))?;
    Ok(token)
}

pub fn csrf_matches(session: &Session, given: &str) -> bool {
    match session.get::<String>(SESSION_CSRF) {
        Ok(Some(expected)) => constant_time_eq(expected.as_bytes(), given.as_bytes()),
        _ => false,
    }
}

pub fn is_authenticated(session: &Session) -> bool {
    matches!(session.get::<bool>(SESSION_AUTHENTICATED), Ok(Some(true)))
}

/// Fails with [`TrackerError::Unauthorized`] unless the session is logged in.
pub fn require_admin(session: &Session) -> Result<(), TrackerError> {
    if is_authenticated(session) {
        Ok(())
    } else {
        Err(TrackerError::Unauthorized)
    }
}

/// Mark the session as logged in. The session id is renewed first.
pub fn start_admin_session(session: &Session, username: &str) -> Result<(), TrackerError> {
    session.renew();
    let store = |key: &str, value: serde_json::Value| {
        session
            .insert(key, value)
            .map_err(|e| TrackerError::Session(e.to_string()))
    };
    store(SESSION_AUTHENTICATED, true.into())?;
    store(SESSION_USERNAME, username.into())?;
    store(SESSION_LOGIN_TIME, chrono::Utc::now().timestamp().into())?;
    Ok(())
}

#[derive(Clone, Copy, Debug)]
struct Attempts {
    failures: u32,
    last_failure: Instant,
}

/// Per-client failed login counter. After `max_attempts` failures the client
/// is refused until `lockout` has passed since its last failure.
#[derive(Debug)]
pub struct LoginThrottle {
    max_attempts: u32,
    lockout: Duration,
    entries: Mutex<HashMap<String, Attempts>>,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, lockout: Duration) -> Self {
        Self {
            max_attempts,
            lockout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, client: &str) -> Result<(), TrackerError> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), TrackerError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, a| now.saturating_duration_since(a.last_failure) < self.lockout);
        match entries.get(client) {
            Some(a) if a.failures >= self.max_attempts => {
                log::warn!("Rate limit exceeded for client {}", client);
                Err(TrackerError::RateLimited)
            }
            _ => Ok(()),
        }
    }

    pub fn record(&self, client: &str, success: bool) {
        self.record_at(client, success, Instant::now());
    }

    /// Success forgets the client; failure bumps its counter.
    pub fn record_at(&self, client: &str, success: bool, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if success {
            entries.remove(client);
            return;
        }
        let entry = entries.entry(client.to_string()).or_insert(Attempts {
            failures: 0,
            last_failure: now,
        });
        entry.failures += 1;
        entry.last_failure = now;
    }
}
