//! Integration tests for credentials, the login throttle and configuration.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tarneeb_tracker::auth::{generate_csrf_token, AdminCredentials, LoginThrottle, PasswordCheck};
use tarneeb_tracker::{Config, TrackerError};

#[test]
fn plain_and_hashed_passwords_verify() {
    let plain = AdminCredentials {
        username: "admin".into(),
        password: PasswordCheck::Plain("hunter2".into()),
    };
    assert!(plain.verify("admin", "hunter2"));
    assert!(!plain.verify("admin", "hunter3"));
    assert!(!plain.verify("Admin", "hunter2"));

    // sha256("hunter2")
    let hashed = AdminCredentials {
        username: "admin".into(),
        password: PasswordCheck::Sha256Hex(
            "f52fbd32b2b3b86ff88ef6c490628285f482af15ddcb29541f94bcf526a3f6c7".into(),
        ),
    };
    assert!(hashed.verify("admin", "hunter2"));
    assert!(!hashed.verify("admin", "hunter"));
}

#[test]
fn debug_output_hides_password() {
    let check = PasswordCheck::Plain("hunter2".into());
    assert!(!format!("{:?}", check).contains("hunter2"));
}

#[test]
fn csrf_tokens_are_random_hex() {
    let a = generate_csrf_token();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, generate_csrf_token());
}

#[test]
fn throttle_locks_after_max_failures() {
    let throttle = LoginThrottle::new(3, Duration::from_secs(300));
    let now = Instant::now();
    for _ in 0..3 {
        assert!(throttle.check_at("10.0.0.1", now).is_ok());
        throttle.record_at("10.0.0.1", false, now);
    }
    assert!(matches!(
        throttle.check_at("10.0.0.1", now),
        Err(TrackerError::RateLimited)
    ));
    assert!(throttle.check_at("10.0.0.2", now).is_ok());
}

#[test]
fn throttle_expires_after_lockout() {
    let throttle = LoginThrottle::new(1, Duration::from_secs(300));
    let now = Instant::now();
    throttle.record_at("client", false, now);
    assert!(throttle.check_at("client", now + Duration::from_secs(299)).is_err());
    assert!(throttle.check_at("client", now + Duration::from_secs(300)).is_ok());
}

#[test]
fn success_clears_failures() {
    let throttle = LoginThrottle::new(2, Duration::from_secs(300));
    let now = Instant::now();
    throttle.record_at("client", false, now);
    throttle.record_at("client", true, now);
    throttle.record_at("client", false, now);
    assert!(throttle.check_at("client", now).is_ok());
}

fn config_from(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn config_defaults() {
    let config = config_from(&[]);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert!(config.admin.is_none());
    assert!(config.session_key.is_none());
    assert!(!config.secure_cookie);
    assert!(config.data_file().ends_with("data/games.json"));
    assert_eq!(config.known_players.names().len(), 11);
}

#[test]
fn config_reads_environment() {
    let key = "ab".repeat(64);
    let config = config_from(&[
        ("PORT", "9000"),
        ("TARNEEB_DATA_DIR", "/srv/tarneeb"),
        ("TARNEEB_ADMIN_USERNAME", "admin"),
        ("TARNEEB_ADMIN_PASSWORD", "hunter2"),
        ("TARNEEB_SESSION_KEY", key.as_str()),
        ("TARNEEB_KNOWN_PLAYERS", "Nour, Sami"),
        ("TARNEEB_SECURE_COOKIE", "true"),
    ]);
    assert_eq!(config.port, 9000);
    assert_eq!(config.photos_dir(), std::path::PathBuf::from("/srv/tarneeb/photos"));
    assert!(config.admin.as_ref().unwrap().verify("admin", "hunter2"));
    assert_eq!(config.session_key.as_ref().map(Vec::len), Some(64));
    assert_eq!(config.known_players.names(), ["Nour", "Sami"]);
    assert!(config.secure_cookie);
}

#[test]
fn hashed_password_wins_and_short_key_is_ignored() {
    let config = config_from(&[
        ("TARNEEB_ADMIN_USERNAME", "admin"),
        ("TARNEEB_ADMIN_PASSWORD", "plain"),
        (
            "TARNEEB_ADMIN_PASSWORD_SHA256",
            "F52FBD32B2B3B86FF88EF6C490628285F482AF15DDCB29541F94BCF526A3F6C7",
        ),
        ("TARNEEB_SESSION_KEY", "abcd"),
        ("PORT", "not a port"),
    ]);
    let admin = config.admin.unwrap();
    assert!(admin.verify("admin", "hunter2"));
    assert!(!admin.verify("admin", "plain"));
    assert!(config.session_key.is_none());
    assert_eq!(config.port, 8080);
}

#[test]
fn salted_digest_verifies() {
    let digest = hex::encode(Sha256::digest(b"pepperhunter2"));
    let configured = format!("pepper:{}", digest.to_uppercase());
    let config = config_from(&[
        ("TARNEEB_ADMIN_USERNAME", "admin"),
        ("TARNEEB_ADMIN_PASSWORD_SHA256", configured.as_str()),
    ]);
    let admin = config.admin.unwrap();
    assert!(matches!(admin.password, PasswordCheck::SaltedSha256 { .. }));
    assert!(admin.verify("admin", "hunter2"));
    assert!(!admin.verify("admin", "pepperhunter2"));
}

#[test]
fn missing_admin_is_a_startup_warning() {
    let config = config_from(&[]);
    assert_eq!(config.startup_warnings().len(), 1);
    assert!(config.startup_warnings()[0].contains("TARNEEB_ADMIN_USERNAME"));

    let config = config_from(&[
        ("TARNEEB_ADMIN_USERNAME", "admin"),
        ("TARNEEB_ADMIN_PASSWORD", "hunter2"),
    ]);
    assert!(config.startup_warnings().is_empty());
}
