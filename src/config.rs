//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8080` |
//! | `TARNEEB_DATA_DIR` | `assets` (games at `data/games.json`, photos at `photos/`) |
//! | `TARNEEB_ADMIN_USERNAME` | none, logins disabled |
//! | `TARNEEB_ADMIN_PASSWORD_SHA256` | `salt:hex` with hex = SHA-256(salt + password), or bare hex SHA-256 of the password |
//! | `TARNEEB_ADMIN_PASSWORD` | plain password, used when no digest is set |
//! | `TARNEEB_SESSION_KEY` | hex, at least 64 bytes; random per start if unset |
//! | `TARNEEB_KNOWN_PLAYERS` | comma-separated roster, built-in list if unset |
//! | `TARNEEB_MAX_PHOTO_BYTES` | 10 MiB |
//! | `TARNEEB_SECURE_COOKIE` | `false`; set `true` when served over HTTPS |
//!
//! SHA-256 is a fast hash, so a leaked digest is much easier to brute-force
//! than a bcrypt-style password hash. Use the salted form with a long random salt.

use crate::auth::{AdminCredentials, PasswordCheck};
use crate::models::KnownPlayers;
use std::path::PathBuf;
use std::time::Duration;

/// Failed logins allowed per client before lockout.
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 5;
/// How long a client stays locked out.
pub const DEFAULT_LOGIN_LOCKOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// `None` when no admin is configured; every login then fails.
    pub admin: Option<AdminCredentials>,
    /// Cookie signing key material.
    pub session_key: Option<Vec<u8>>,
    pub known_players: KnownPlayers,
    pub max_photo_bytes: usize,
    pub max_login_attempts: u32,
    pub login_lockout: Duration,
    /// Send the session cookie only over HTTPS.
    pub secure_cookie: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("assets"),
            admin: None,
            session_key: None,
            known_players: KnownPlayers::default(),
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            login_lockout: DEFAULT_LOGIN_LOCKOUT,
            secure_cookie: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Some(dir) = get("TARNEEB_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(max) = get("TARNEEB_MAX_PHOTO_BYTES").and_then(|v| v.parse().ok()) {
            config.max_photo_bytes = max;
        }
        if let Some(secure) = get("TARNEEB_SECURE_COOKIE") {
            config.secure_cookie = matches!(secure.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(names) = get("TARNEEB_KNOWN_PLAYERS") {
            config.known_players = KnownPlayers::new(names.split(','));
        }

        let password = get("TARNEEB_ADMIN_PASSWORD_SHA256")
            .map(|h| PasswordCheck::from_digest(&h))
            .or_else(|| get("TARNEEB_ADMIN_PASSWORD").map(PasswordCheck::Plain));
        config.admin = match (get("TARNEEB_ADMIN_USERNAME"), password) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            _ => None,
        };

        config.session_key = get("TARNEEB_SESSION_KEY").and_then(|k| match hex::decode(&k) {
            Ok(bytes) if bytes.len() >= 64 => Some(bytes),
            _ => {
                log::warn!("TARNEEB_SESSION_KEY must be at least 64 hex-encoded bytes; using a random key");
                None
            }
        });

        config
    }

    /// Problems worth logging once at startup.
    pub fn startup_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.admin.is_none() {
            warnings.push("Admin credentials not configured; set TARNEEB_ADMIN_USERNAME and TARNEEB_ADMIN_PASSWORD(_SHA256)");
        }
        warnings
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join("data").join("games.json")
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.data_dir.join("photos")
    }
}
