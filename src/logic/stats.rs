//! Player and team tallies accumulated over a collection of matches.

use crate::logic::resolution::resolve_rounds;
use crate::models::{team_name, Aggregate, GameMatch, MatchFormat, MatchState, WinRateBand};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Which matches to include. Passed explicitly by the caller; nothing is
/// remembered between calls.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct StatsFilter {
    #[serde(default)]
    pub tournament: Option<String>,
}

impl StatsFilter {
    pub fn tournament(name: impl Into<String>) -> Self {
        Self {
            tournament: Some(name.into()),
        }
    }

    pub fn accepts(&self, game: &GameMatch) -> bool {
        match self.tournament.as_deref() {
            Some(name) if !name.is_empty() => game.in_tournament(name),
            _ => true,
        }
    }
}

/// Tallies for one team bucket.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAggregate {
    /// The two players, sorted.
    pub players: Vec<String>,
    #[serde(flatten)]
    pub stats: Aggregate,
}

/// Player and team buckets for one pass over the matches.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub players: HashMap<String, Aggregate>,
    /// Keyed by [`team_name`], so `[A, B]` and `[B, A]` share a bucket.
    pub teams: HashMap<String, TeamAggregate>,
}

/// What one match adds to each side, or `None` when the record has no teams.
///
/// The rules per format:
/// - rounds: the best-of-3 state decides; a 1-0 lead counts as a win/loss and
///   also as incomplete for both sides, 1-1 is a draw plus incomplete, and
///   anything undecided (including zero rounds) is only incomplete.
/// - single score: higher score wins, equal is a draw.
pub fn match_contribution(format: &MatchFormat) -> Option<(Aggregate, Aggregate)> {
    let (team_1, team_2) = format.teams()?;
    if team_1.is_empty() || team_2.is_empty() {
        return None;
    }
    let mut t1 = Aggregate {
        games_played: 1,
        ..Aggregate::default()
    };
    let mut t2 = t1.clone();

    match format {
        MatchFormat::TeamRounds { rounds, .. } => {
            let res = resolve_rounds(rounds);
            t1.total_score = res.team1_total;
            t2.total_score = res.team2_total;
            t1.total_kaboots = res.team1_kaboots;
            t2.total_kaboots = res.team2_kaboots;
            match res.state {
                Some(MatchState::Team1) => {
                    t1.wins += 1;
                    t2.losses += 1;
                }
                Some(MatchState::Team2) => {
                    t2.wins += 1;
                    t1.losses += 1;
                }
                Some(MatchState::IncompleteTeam1Win) => {
                    t1.wins += 1;
                    t2.losses += 1;
                    t1.incomplete += 1;
                    t2.incomplete += 1;
                }
                Some(MatchState::IncompleteTeam2Win) => {
                    t2.wins += 1;
                    t1.losses += 1;
                    t1.incomplete += 1;
                    t2.incomplete += 1;
                }
                Some(MatchState::IncompleteDraw) => {
                    t1.draws += 1;
                    t2.draws += 1;
                    t1.incomplete += 1;
                    t2.incomplete += 1;
                }
                Some(MatchState::Incomplete) | None => {
                    t1.incomplete += 1;
                    t2.incomplete += 1;
                }
            }
        }
        MatchFormat::TeamSingleScore {
            team_1_score,
            team_2_score,
            ..
        } => {
            t1.total_score = *team_1_score;
            t2.total_score = *team_2_score;
            match team_1_score.cmp(team_2_score) {
                Ordering::Greater => {
                    t1.wins += 1;
                    t2.losses += 1;
                }
                Ordering::Less => {
                    t2.wins += 1;
                    t1.losses += 1;
                }
                Ordering::Equal => {
                    t1.draws += 1;
                    t2.draws += 1;
                }
            }
        }
        MatchFormat::LegacyIndividual { .. } => return None,
    }
    Some((t1, t2))
}

impl Aggregates {
    fn add_side(&mut self, roster: &[String], tally: &Aggregate) {
        for name in roster {
            self.players.entry(name.clone()).or_default().merge(tally);
        }
        self.teams
            .entry(team_name(roster))
            .or_insert_with(|| {
                let mut players = roster.to_vec();
                players.sort();
                TeamAggregate {
                    players,
                    stats: Aggregate::default(),
                }
            })
            .stats
            .merge(tally);
    }

    /// Fold another pass into this one (e.g. results computed on separate chunks).
    pub fn merge(&mut self, other: &Aggregates) {
        for (name, stats) in &other.players {
            self.players.entry(name.clone()).or_default().merge(stats);
        }
        for (name, team) in &other.teams {
            self.teams
                .entry(name.clone())
                .or_insert_with(|| TeamAggregate {
                    players: team.players.clone(),
                    stats: Aggregate::default(),
                })
                .stats
                .merge(&team.stats);
        }
    }

    /// Ranked views, highest total score first.
    pub fn standings(&self) -> Standings {
        let mut players: Vec<PlayerStanding> = self
            .players
            .iter()
            .map(|(name, stats)| PlayerStanding {
                name: name.clone(),
                win_rate: stats.win_rate(),
                band: stats.win_rate_band(),
                stats: stats.clone(),
            })
            .collect();
        players.sort_by(|a, b| rank_order(&a.stats, &a.name, &b.stats, &b.name));

        let mut teams: Vec<TeamStanding> = self
            .teams
            .iter()
            .map(|(name, team)| TeamStanding {
                name: name.clone(),
                players: team.players.clone(),
                win_rate: team.stats.win_rate(),
                band: team.stats.win_rate_band(),
                stats: team.stats.clone(),
            })
            .collect();
        teams.sort_by(|a, b| rank_order(&a.stats, &a.name, &b.stats, &b.name));

        Standings { players, teams }
    }
}

// Score descending; the name only breaks ties so the order never depends on
// the order matches were read in.
fn rank_order(a: &Aggregate, a_name: &str, b: &Aggregate, b_name: &str) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| a_name.cmp(b_name))
}

/// Accumulate player and team tallies over every match the filter accepts.
pub fn aggregate(matches: &[GameMatch], filter: &StatsFilter) -> Aggregates {
    let mut out = Aggregates::default();
    for game in matches.iter().filter(|m| filter.accepts(m)) {
        let Some((team_1, team_2)) = game.format.teams() else {
            continue;
        };
        if let Some((t1, t2)) = match_contribution(&game.format) {
            out.add_side(team_1, &t1);
            out.add_side(team_2, &t2);
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub name: String,
    #[serde(flatten)]
    pub stats: Aggregate,
    pub win_rate: f64,
    pub band: WinRateBand,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub name: String,
    pub players: Vec<String>,
    #[serde(flatten)]
    pub stats: Aggregate,
    pub win_rate: f64,
    pub band: WinRateBand,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Standings {
    pub players: Vec<PlayerStanding>,
    pub teams: Vec<TeamStanding>,
}

/// Header counts for the stats page.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_games: usize,
    /// Matches dated in the same calendar month as `today`.
    pub monthly_games: usize,
}

pub fn summarize(matches: &[GameMatch], filter: &StatsFilter, today: NaiveDate) -> Summary {
    let mut summary = Summary::default();
    for game in matches.iter().filter(|m| filter.accepts(m)) {
        summary.total_games += 1;
        if game
            .game_date
            .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        {
            summary.monthly_games += 1;
        }
    }
    summary
}
