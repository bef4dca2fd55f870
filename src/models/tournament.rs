//! Tournament placement of a match: which bracket round and slot it fills.

use crate::error::TrackerError;
use crate::models::lenient;
use serde::{Deserialize, Serialize};

/// Knockout rounds of a 16-team bracket, earliest first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum BracketRound {
    #[serde(rename = "round-of-16", alias = "round_of_16", alias = "r16")]
    RoundOf16,
    #[serde(rename = "quarterfinals", alias = "qf")]
    Quarterfinals,
    #[serde(rename = "semifinals", alias = "sf")]
    Semifinals,
    #[serde(rename = "third-place", alias = "third_place", alias = "3rd")]
    ThirdPlace,
    #[serde(rename = "final")]
    Final,
}

impl BracketRound {
    pub const ALL: [BracketRound; 5] = [
        BracketRound::RoundOf16,
        BracketRound::Quarterfinals,
        BracketRound::Semifinals,
        BracketRound::ThirdPlace,
        BracketRound::Final,
    ];

    /// Number of matches in this round.
    pub fn slot_count(self) -> usize {
        match self {
            BracketRound::RoundOf16 => 8,
            BracketRound::Quarterfinals => 4,
            BracketRound::Semifinals => 2,
            BracketRound::ThirdPlace | BracketRound::Final => 1,
        }
    }

    /// Default display label for a zero-based slot, e.g. `R16-M3` for index 2.
    pub fn slot_label(self, index: usize) -> String {
        match self {
            BracketRound::RoundOf16 => format!("R16-M{}", index + 1),
            BracketRound::Quarterfinals => format!("QF-M{}", index + 1),
            BracketRound::Semifinals => format!("SF-M{}", index + 1),
            BracketRound::ThirdPlace => "3rd Place".to_string(),
            BracketRound::Final => "Final".to_string(),
        }
    }

    /// Inverse of [`slot_label`](Self::slot_label). Case-insensitive; `None`
    /// for unknown labels and for slots outside the round.
    pub fn parse_label(label: &str) -> Option<(BracketRound, usize)> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("final") {
            return Some((BracketRound::Final, 0));
        }
        if label.eq_ignore_ascii_case("3rd place") {
            return Some((BracketRound::ThirdPlace, 0));
        }
        let (prefix, number) = label.split_once("-M").or_else(|| label.split_once("-m"))?;
        let round = match prefix.to_ascii_uppercase().as_str() {
            "R16" => BracketRound::RoundOf16,
            "QF" => BracketRound::Quarterfinals,
            "SF" => BracketRound::Semifinals,
            _ => return None,
        };
        let n: usize = number.parse().ok()?;
        if n == 0 || n > round.slot_count() {
            return None;
        }
        Some((round, n - 1))
    }
}

/// Where a match sits in a tournament bracket.
///
/// `match_index` is kept as stored, even when out of range; the bracket
/// builder decides what to do with it. `label` is whatever the client sent
/// and is never used to place the match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPlacement {
    #[serde(alias = "tournamentName")]
    pub name: String,
    pub round: BracketRound,
    #[serde(default, alias = "matchSlotIndex", deserialize_with = "lenient::int")]
    pub match_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2_name: Option<String>,
}

impl TournamentPlacement {
    pub fn new(name: impl Into<String>, round: BracketRound, index: usize) -> Self {
        Self {
            name: name.into(),
            round,
            match_index: index as i64,
            label: Some(round.slot_label(index)),
            team1_name: None,
            team2_name: None,
        }
    }

    /// The slot index if it is valid for the round.
    pub fn slot_index(&self) -> Option<usize> {
        usize::try_from(self.match_index)
            .ok()
            .filter(|&i| i < self.round.slot_count())
    }
}

/// Placement as sent by the client: either a label such as `QF-M2`, or an
/// explicit round and index.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementInput {
    #[serde(alias = "tournamentName")]
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub round: Option<BracketRound>,
    #[serde(default, alias = "matchSlotIndex")]
    pub match_index: Option<i64>,
    #[serde(default)]
    pub team1_name: Option<String>,
    #[serde(default)]
    pub team2_name: Option<String>,
}

impl PlacementInput {
    /// Validate and turn into a stored placement. Explicit round and index win
    /// over the label.
    pub fn resolve(self) -> Result<TournamentPlacement, TrackerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidSlot("tournament name is empty".to_string()));
        }
        let (round, index) = match (self.round, self.match_index) {
            (Some(round), Some(index)) => {
                let index = usize::try_from(index)
                    .ok()
                    .filter(|&i| i < round.slot_count())
                    .ok_or_else(|| {
                        TrackerError::InvalidSlot(format!("{:?} has no slot {}", round, index))
                    })?;
                (round, index)
            }
            _ => {
                let label = self.label.as_deref().unwrap_or_default();
                BracketRound::parse_label(label)
                    .ok_or_else(|| TrackerError::InvalidSlot(label.to_string()))?
            }
        };
        let blank_to_none = |s: Option<String>| {
            s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        let mut placement = TournamentPlacement::new(name, round, index);
        placement.team1_name = blank_to_none(self.team1_name);
        placement.team2_name = blank_to_none(self.team2_name);
        Ok(placement)
    }
}
