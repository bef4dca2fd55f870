//! Round and match resolution: who took each round and where the best-of-3 stands.

use crate::models::{MatchFormat, MatchState, Round, RoundOutcome, RoundResult};
use serde::Serialize;

/// Everything derived from one match's rounds.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResolution {
    pub round_results: Vec<RoundResult>,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub draws: u32,
    /// Sum of team 1's round scores (or its single score in the legacy format).
    pub team1_total: i64,
    pub team2_total: i64,
    pub team1_kaboots: u64,
    pub team2_kaboots: u64,
    /// `None` when there is nothing to decide (no rounds, legacy individual records).
    pub state: Option<MatchState>,
}

/// Strict score comparison; equal scores are a draw whatever their value.
pub fn round_outcome(round: &Round) -> RoundOutcome {
    match round.team1_score.cmp(&round.team2_score) {
        std::cmp::Ordering::Greater => RoundOutcome::Team1,
        std::cmp::Ordering::Less => RoundOutcome::Team2,
        std::cmp::Ordering::Equal => RoundOutcome::Draw,
    }
}

/// Best-of-3 state from round win counts, checked in this order:
///
/// 1. team 1 has two wins
/// 2. team 2 has two wins
/// 3. team 1 leads 1-0
/// 4. team 2 leads 1-0
/// 5. 1-1, decider not played
/// 6. anything else
pub fn match_state(team1_wins: u32, team2_wins: u32) -> MatchState {
    if team1_wins >= 2 {
        MatchState::Team1
    } else if team2_wins >= 2 {
        MatchState::Team2
    } else if team1_wins == 1 && team2_wins == 0 {
        MatchState::IncompleteTeam1Win
    } else if team2_wins == 1 && team1_wins == 0 {
        MatchState::IncompleteTeam2Win
    } else if team1_wins == 1 && team2_wins == 1 {
        MatchState::IncompleteDraw
    } else {
        MatchState::Incomplete
    }
}

/// Resolve a round sequence. Kaboots are summed but never affect who wins.
/// Totals saturate instead of overflowing.
pub fn resolve_rounds(rounds: &[Round]) -> MatchResolution {
    let mut res = MatchResolution::default();
    for (i, round) in rounds.iter().enumerate() {
        let winner = round_outcome(round);
        match winner {
            RoundOutcome::Team1 => res.team1_wins += 1,
            RoundOutcome::Team2 => res.team2_wins += 1,
            RoundOutcome::Draw => res.draws += 1,
        }
        res.team1_total = res.team1_total.saturating_add(round.team1_score);
        res.team2_total = res.team2_total.saturating_add(round.team2_score);
        res.team1_kaboots = res.team1_kaboots.saturating_add(u64::from(round.team1_kaboots));
        res.team2_kaboots = res.team2_kaboots.saturating_add(u64::from(round.team2_kaboots));
        res.round_results.push(RoundResult {
            round: if round.sequence_number > 0 {
                round.sequence_number
            } else {
                i as u32 + 1
            },
            team1_score: round.team1_score,
            team2_score: round.team2_score,
            winner,
        });
    }
    if !rounds.is_empty() {
        res.state = Some(match_state(res.team1_wins, res.team2_wins));
    }
    res
}

/// Resolve any stored match format.
pub fn resolve_match(format: &MatchFormat) -> MatchResolution {
    match format {
        MatchFormat::TeamRounds { rounds, .. } => resolve_rounds(rounds),
        MatchFormat::TeamSingleScore {
            team_1_score,
            team_2_score,
            ..
        } => MatchResolution {
            team1_total: *team_1_score,
            team2_total: *team_2_score,
            state: match team_1_score.cmp(team_2_score) {
                std::cmp::Ordering::Greater => Some(MatchState::Team1),
                std::cmp::Ordering::Less => Some(MatchState::Team2),
                std::cmp::Ordering::Equal => None,
            },
            ..MatchResolution::default()
        },
        MatchFormat::LegacyIndividual { .. } => MatchResolution::default(),
    }
}
