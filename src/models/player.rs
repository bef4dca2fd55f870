//! Player names and the win/loss aggregates derived for players and teams.

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Regulars at the table; typed names are snapped to these spellings.
pub const DEFAULT_KNOWN_PLAYERS: &[&str] = &[
    "Ali", "Amir", "Bassel", "Brittany", "Christina", "Hesham", "Joseph", "Osama", "Raquel",
    "Youssef", "Zena",
];

/// Separator between the two names of a team.
pub const TEAM_NAME_SEPARATOR: &str = " & ";

/// Known-player roster used to normalize typed names.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KnownPlayers {
    names: Vec<String>,
}

impl Default for KnownPlayers {
    fn default() -> Self {
        Self::new(DEFAULT_KNOWN_PLAYERS.iter().copied())
    }
}

impl KnownPlayers {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .map(|n: String| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Exact case-insensitive roster match returns the roster spelling;
    /// anything else is title-cased. Blank input stays blank.
    pub fn normalize(&self, input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        let lower = trimmed.to_lowercase();
        if let Some(known) = self.names.iter().find(|n| n.to_lowercase() == lower) {
            return known.clone();
        }
        title_case(trimmed)
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Order-independent team identity: names sorted and joined.
pub fn team_name<S: AsRef<str>>(players: &[S]) -> String {
    let mut names: Vec<&str> = players.iter().map(AsRef::as_ref).collect();
    names.sort_unstable();
    names.join(TEAM_NAME_SEPARATOR)
}

/// Two players per team, no blank names, no player on the table twice
/// (case-insensitive).
pub fn validate_roster(team_1: &[String], team_2: &[String]) -> Result<(), TrackerError> {
    if team_1.len() != 2 || team_2.len() != 2 {
        return Err(TrackerError::InvalidRoster(
            "Each team needs exactly 2 players".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for name in team_1.iter().chain(team_2) {
        if name.trim().is_empty() {
            return Err(TrackerError::InvalidRoster(
                "Player names cannot be empty".to_string(),
            ));
        }
        if !seen.insert(name.trim().to_lowercase()) {
            return Err(TrackerError::InvalidRoster(format!(
                "Player {} is selected twice",
                name.trim()
            )));
        }
    }
    Ok(())
}

/// Display band for a win rate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinRateBand {
    /// 60% and up.
    Strong,
    /// 40% up to 60%.
    Fair,
    Weak,
}

/// Running tallies for one player or one team.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Matches whose series was not finished.
    pub incomplete: u32,
    pub total_kaboots: u64,
    pub total_score: i64,
    pub games_played: u32,
}

impl Aggregate {
    /// Wins over games played, 0 with no games.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.games_played)
        }
    }

    pub fn win_rate_band(&self) -> WinRateBand {
        let pct = self.win_rate() * 100.0;
        if pct >= 60.0 {
            WinRateBand::Strong
        } else if pct >= 40.0 {
            WinRateBand::Fair
        } else {
            WinRateBand::Weak
        }
    }

    /// Add another tally into this one. Plain field-wise sums, so the order
    /// in which partial aggregates are merged does not matter.
    pub fn merge(&mut self, other: &Aggregate) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.draws += other.draws;
        self.incomplete += other.incomplete;
        self.total_kaboots = self.total_kaboots.saturating_add(other.total_kaboots);
        self.total_score = self.total_score.saturating_add(other.total_score);
        self.games_played += other.games_played;
    }
}
