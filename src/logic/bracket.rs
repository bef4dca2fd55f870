//! Tournament bracket: a fixed 16-team knockout skeleton with matches placed by slot.
//!
//! Position is authoritative: slot labels are computed from `(round, index)`,
//! never taken from what the client stored. Bad placements are logged and
//! skipped so one malformed match cannot break the bracket.

use crate::logic::resolution::resolve_match;
use crate::models::{team_name, BracketRound, GameMatch, MatchId, MatchState};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Which half of the drawn bracket a slot belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Left,
    Right,
    /// Third-place match and final sit between the halves.
    Center,
}

/// Where a stored `(round, index)` lands on the drawn bracket, or `None` if
/// the index cannot be placed.
///
/// Round-of-16 and quarterfinal indices in the first half go left, the rest
/// go right shifted down by the half size. Semifinal 0 is left and anything
/// above is right shifted by one, but each semifinal half has a single slot,
/// so only index 1 survives on the right; higher indices are dropped.
/// Third place and final only take index 0.
pub fn bracket_position(round: BracketRound, index: i64) -> Option<(BracketSide, usize)> {
    let index = usize::try_from(index).ok()?;
    let (side, normalized, capacity) = match round {
        BracketRound::ThirdPlace | BracketRound::Final => (BracketSide::Center, index, 1),
        _ => {
            let half = round.slot_count() / 2;
            if index < half {
                (BracketSide::Left, index, half)
            } else {
                (BracketSide::Right, index - half, half)
            }
        }
    };
    (normalized < capacity).then_some((side, normalized))
}

/// A match shown in a bracket slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOccupant {
    pub match_id: MatchId,
    /// Display override from the placement, else the normalized team name.
    pub team1_name: String,
    pub team2_name: String,
    pub team1_players: Vec<String>,
    pub team2_players: Vec<String>,
    pub team1_wins: u32,
    pub team2_wins: u32,
    /// `None` until a round has been entered.
    pub state: Option<MatchState>,
    pub game_date: Option<NaiveDate>,
}

impl SlotOccupant {
    fn from_match(game: &GameMatch) -> Self {
        let res = resolve_match(&game.format);
        let (team_1, team_2) = game
            .format
            .teams()
            .map(|(a, b)| (a.to_vec(), b.to_vec()))
            .unwrap_or_default();
        let placement = game.tournament.as_ref();
        let team1_name = placement
            .and_then(|p| p.team1_name.clone())
            .unwrap_or_else(|| team_name(&team_1));
        let team2_name = placement
            .and_then(|p| p.team2_name.clone())
            .unwrap_or_else(|| team_name(&team_2));
        Self {
            match_id: game.id.clone(),
            team1_name,
            team2_name,
            team1_players: team_1,
            team2_players: team_2,
            team1_wins: res.team1_wins,
            team2_wins: res.team2_wins,
            state: res.state,
            game_date: game.game_date,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketSlot {
    pub label: String,
    pub occupant: Option<SlotOccupant>,
}

impl BracketSlot {
    fn empty(round: BracketRound, index: usize) -> Self {
        Self {
            label: round.slot_label(index),
            occupant: None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketHalves {
    pub left: Vec<BracketSlot>,
    pub right: Vec<BracketSlot>,
}

impl BracketHalves {
    fn empty(round: BracketRound) -> Self {
        let half = round.slot_count() / 2;
        Self {
            left: (0..half).map(|i| BracketSlot::empty(round, i)).collect(),
            right: (half..half * 2).map(|i| BracketSlot::empty(round, i)).collect(),
        }
    }
}

/// The whole bracket for one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub tournament: String,
    pub round_of_16: BracketHalves,
    pub quarterfinals: BracketHalves,
    pub semifinals: BracketHalves,
    pub third_place: BracketSlot,
    #[serde(rename = "final")]
    pub final_match: BracketSlot,
}

impl Bracket {
    /// Skeleton with every slot labelled and empty.
    pub fn empty(tournament: impl Into<String>) -> Self {
        Self {
            tournament: tournament.into(),
            round_of_16: BracketHalves::empty(BracketRound::RoundOf16),
            quarterfinals: BracketHalves::empty(BracketRound::Quarterfinals),
            semifinals: BracketHalves::empty(BracketRound::Semifinals),
            third_place: BracketSlot::empty(BracketRound::ThirdPlace, 0),
            final_match: BracketSlot::empty(BracketRound::Final, 0),
        }
    }

    pub fn slot(&self, round: BracketRound, side: BracketSide, index: usize) -> Option<&BracketSlot> {
        let halves = match round {
            BracketRound::RoundOf16 => &self.round_of_16,
            BracketRound::Quarterfinals => &self.quarterfinals,
            BracketRound::Semifinals => &self.semifinals,
            BracketRound::ThirdPlace => return (index == 0).then_some(&self.third_place),
            BracketRound::Final => return (index == 0).then_some(&self.final_match),
        };
        match side {
            BracketSide::Left => halves.left.get(index),
            BracketSide::Right => halves.right.get(index),
            BracketSide::Center => None,
        }
    }

    fn slot_mut(&mut self, round: BracketRound, side: BracketSide, index: usize) -> Option<&mut BracketSlot> {
        let halves = match round {
            BracketRound::RoundOf16 => &mut self.round_of_16,
            BracketRound::Quarterfinals => &mut self.quarterfinals,
            BracketRound::Semifinals => &mut self.semifinals,
            BracketRound::ThirdPlace => return (index == 0).then_some(&mut self.third_place),
            BracketRound::Final => return (index == 0).then_some(&mut self.final_match),
        };
        match side {
            BracketSide::Left => halves.left.get_mut(index),
            BracketSide::Right => halves.right.get_mut(index),
            BracketSide::Center => None,
        }
    }

    /// All slots holding a match, with their rounds.
    pub fn occupied(&self) -> impl Iterator<Item = (BracketRound, &BracketSlot)> {
        let halves = [
            (BracketRound::RoundOf16, &self.round_of_16),
            (BracketRound::Quarterfinals, &self.quarterfinals),
            (BracketRound::Semifinals, &self.semifinals),
        ];
        halves
            .into_iter()
            .flat_map(|(round, h)| h.left.iter().chain(&h.right).map(move |s| (round, s)))
            .chain([
                (BracketRound::ThirdPlace, &self.third_place),
                (BracketRound::Final, &self.final_match),
            ])
            .filter(|(_, s)| s.occupant.is_some())
    }
}

/// Place every match of `tournament` into its slot.
///
/// When two matches claim the same slot the first one in `matches` keeps it.
pub fn build_bracket(matches: &[GameMatch], tournament: &str) -> Bracket {
    let mut bracket = Bracket::empty(tournament);
    for game in matches {
        let Some(placement) = game.tournament.as_ref().filter(|p| p.name == tournament) else {
            continue;
        };
        let Some((side, index)) = bracket_position(placement.round, placement.match_index) else {
            log::warn!(
                "Skipping match {} in bracket {}: no {:?} slot at index {}",
                game.id,
                tournament,
                placement.round,
                placement.match_index
            );
            continue;
        };
        let Some(slot) = bracket.slot_mut(placement.round, side, index) else {
            continue;
        };
        if let Some(existing) = &slot.occupant {
            log::warn!(
                "Skipping match {} in bracket {}: slot {} already holds match {}",
                game.id,
                tournament,
                slot.label,
                existing.match_id
            );
            continue;
        }
        slot.occupant = Some(SlotOccupant::from_match(game));
    }
    bracket
}

/// A slot label and whether another match already uses it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub round: BracketRound,
    pub index: usize,
    pub label: String,
    pub used: bool,
}

/// Every slot of the bracket, marking the ones taken by matches other than
/// `exclude` (the match being edited). Only a hint for the entry form; saving
/// a duplicate is still accepted.
pub fn slot_availability(
    matches: &[GameMatch],
    tournament: &str,
    exclude: Option<&str>,
) -> Vec<SlotAvailability> {
    let taken: BTreeSet<(BracketRound, usize)> = matches
        .iter()
        .filter(|m| exclude != Some(m.id.as_str()))
        .filter_map(|m| m.tournament.as_ref())
        .filter(|p| p.name == tournament)
        .filter_map(|p| p.slot_index().map(|i| (p.round, i)))
        .collect();
    BracketRound::ALL
        .into_iter()
        .flat_map(|round| (0..round.slot_count()).map(move |i| (round, i)))
        .map(|(round, index)| SlotAvailability {
            round,
            index,
            label: round.slot_label(index),
            used: taken.contains(&(round, index)),
        })
        .collect()
}

/// Distinct tournament names, sorted.
pub fn tournament_names(matches: &[GameMatch]) -> Vec<String> {
    matches
        .iter()
        .filter_map(|m| m.tournament.as_ref())
        .map(|p| p.name.clone())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
