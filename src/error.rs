//! Crate-wide error type.

use crate::models::MatchId;
use thiserror::Error;

/// Errors that can occur while storing or editing game records.
///
/// The match outcome engine itself never returns these: it tolerates
/// malformed values and only the collaborators around it can fail.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Team rosters are incomplete or repeat a player.
    #[error("{0}")]
    InvalidRoster(String),
    /// A match holds more rounds than a best-of-3 allows.
    #[error("A match has at most 3 rounds (got {0})")]
    TooManyRounds(usize),
    /// Tournament slot label or index does not exist for its round.
    #[error("Invalid tournament slot: {0}")]
    InvalidSlot(String),
    #[error("Game not found: {0}")]
    NotFound(MatchId),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Too many login attempts. Please try again later.")]
    RateLimited,
    #[error("Invalid request")]
    InvalidCsrf,
    #[error("Session error: {0}")]
    Session(String),
    #[error("Photo is empty or too large")]
    InvalidPhoto,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
