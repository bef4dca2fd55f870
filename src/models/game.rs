//! Game records: rounds, the three stored match formats, and derived outcome types.

use crate::error::TrackerError;
use crate::models::lenient;
use crate::models::player::{validate_roster, KnownPlayers};
use crate::models::tournament::{PlacementInput, TournamentPlacement};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored match. Older files used millisecond timestamps,
/// new records get a UUID; both are kept as opaque strings.
pub type MatchId = String;

/// Most rounds a best-of-3 match can hold.
pub const MAX_ROUNDS: usize = 3;

/// Bring a score into `i32` range so totals over many rounds and matches
/// cannot overflow `i64`.
pub fn clamp_score(score: i64) -> i64 {
    score.clamp(i64::from(i32::MIN), i64::from(i32::MAX))
}

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "team1")]
    One,
    #[serde(rename = "team2")]
    Two,
}

/// One game within a match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// 1-based position; 0 when the stored record never set it.
    #[serde(default, alias = "round", deserialize_with = "lenient::int")]
    pub sequence_number: u32,
    #[serde(default, deserialize_with = "lenient::score")]
    pub team1_score: i64,
    #[serde(default, deserialize_with = "lenient::score")]
    pub team2_score: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub team1_kaboots: u32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub team2_kaboots: u32,
}

impl Round {
    /// Scores outside `i32` range are clamped.
    pub fn new(sequence_number: u32, team1_score: i64, team2_score: i64) -> Self {
        Self {
            sequence_number,
            team1_score: clamp_score(team1_score),
            team2_score: clamp_score(team2_score),
            ..Self::default()
        }
    }

    pub fn with_kaboots(mut self, team1_kaboots: u32, team2_kaboots: u32) -> Self {
        self.team1_kaboots = team1_kaboots;
        self.team2_kaboots = team2_kaboots;
        self
    }
}

/// Who took a single round.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    #[serde(rename = "team1")]
    Team1,
    #[serde(rename = "team2")]
    Team2,
    Draw,
}

/// Derived result of one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub round: u32,
    pub team1_score: i64,
    pub team2_score: i64,
    pub winner: RoundOutcome,
}

/// Best-of-3 state of a match. A match with no rounds has no state at all
/// (`Option<MatchState>::None`).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    #[serde(rename = "team1")]
    Team1,
    #[serde(rename = "team2")]
    Team2,
    #[serde(rename = "incomplete_team1_win")]
    IncompleteTeam1Win,
    #[serde(rename = "incomplete_team2_win")]
    IncompleteTeam2Win,
    IncompleteDraw,
    Incomplete,
}

impl MatchState {
    /// Side credited with the win, whether or not the series is finished.
    pub fn winning_team(self) -> Option<Team> {
        match self {
            MatchState::Team1 | MatchState::IncompleteTeam1Win => Some(Team::One),
            MatchState::Team2 | MatchState::IncompleteTeam2Win => Some(Team::Two),
            MatchState::IncompleteDraw | MatchState::Incomplete => None,
        }
    }

    /// Wire name, as written in the games file.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchState::Team1 => "team1",
            MatchState::Team2 => "team2",
            MatchState::IncompleteTeam1Win => "incomplete_team1_win",
            MatchState::IncompleteTeam2Win => "incomplete_team2_win",
            MatchState::IncompleteDraw => "incomplete_draw",
            MatchState::Incomplete => "incomplete",
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, MatchState::Team1 | MatchState::Team2)
    }
}

/// A player's score in the oldest, team-less record format.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct IndividualScore {
    pub name: String,
    pub score: i64,
}

/// The three shapes a stored match can take.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchFormat {
    /// Two teams of two, scored round by round.
    TeamRounds {
        team_1: Vec<String>,
        team_2: Vec<String>,
        rounds: Vec<Round>,
    },
    /// Two teams with one aggregate score each (before rounds were tracked).
    TeamSingleScore {
        team_1: Vec<String>,
        team_2: Vec<String>,
        team_1_score: i64,
        team_2_score: i64,
    },
    /// Four individual players, no teams.
    LegacyIndividual { players: Vec<IndividualScore> },
}

impl MatchFormat {
    /// Both rosters, when the format has teams.
    pub fn teams(&self) -> Option<(&[String], &[String])> {
        match self {
            MatchFormat::TeamRounds { team_1, team_2, .. }
            | MatchFormat::TeamSingleScore { team_1, team_2, .. } => {
                Some((team_1.as_slice(), team_2.as_slice()))
            }
            MatchFormat::LegacyIndividual { .. } => None,
        }
    }

    pub fn rounds(&self) -> &[Round] {
        match self {
            MatchFormat::TeamRounds { rounds, .. } => rounds,
            _ => &[],
        }
    }
}

/// A stored match.
///
/// Only source data lives here; winner and round results are recomputed by
/// [`crate::logic::resolve_match`] whenever they are needed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "wire::StoredGame", into = "wire::StoredGame")]
pub struct GameMatch {
    pub id: MatchId,
    pub created_at: Option<DateTime<Utc>>,
    pub game_date: Option<NaiveDate>,
    pub format: MatchFormat,
    /// Photo file names or URLs, in upload order.
    pub photos: Vec<String>,
    pub tournament: Option<TournamentPlacement>,
}

impl GameMatch {
    /// New team match with rounds, stamped with a fresh id and the current time.
    pub fn new(
        game_date: NaiveDate,
        team_1: Vec<String>,
        team_2: Vec<String>,
        rounds: Vec<Round>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Some(Utc::now()),
            game_date: Some(game_date),
            format: MatchFormat::TeamRounds {
                team_1,
                team_2,
                rounds,
            },
            photos: Vec::new(),
            tournament: None,
        }
    }

    pub fn with_tournament(mut self, placement: TournamentPlacement) -> Self {
        self.tournament = Some(placement);
        self
    }

    /// True if this match is placed in the named tournament.
    pub fn in_tournament(&self, name: &str) -> bool {
        self.tournament.as_ref().is_some_and(|t| t.name == name)
    }

    /// Replace the editable contents with `input`, keeping id and creation time.
    pub fn edit(&mut self, input: MatchInput, roster: &KnownPlayers) -> Result<(), TrackerError> {
        let updated = input.into_match(roster)?;
        self.game_date = updated.game_date;
        self.format = updated.format;
        self.photos = updated.photos;
        self.tournament = updated.tournament;
        Ok(())
    }
}

/// Request body for creating or editing a match.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    pub team1_players: Vec<String>,
    pub team2_players: Vec<String>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    pub game_date: NaiveDate,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub tournament: Option<PlacementInput>,
}

impl MatchInput {
    /// Normalize player names against the known roster, validate, and build a new match.
    ///
    /// Rounds are renumbered 1..=n in the order given.
    pub fn into_match(self, roster: &KnownPlayers) -> Result<GameMatch, TrackerError> {
        let team_1: Vec<String> = self.team1_players.iter().map(|n| roster.normalize(n)).collect();
        let team_2: Vec<String> = self.team2_players.iter().map(|n| roster.normalize(n)).collect();
        validate_roster(&team_1, &team_2)?;
        if self.rounds.len() > MAX_ROUNDS {
            return Err(TrackerError::TooManyRounds(self.rounds.len()));
        }
        let rounds = self
            .rounds
            .into_iter()
            .zip(1..)
            .map(|(r, seq)| Round {
                sequence_number: seq,
                team1_score: clamp_score(r.team1_score),
                team2_score: clamp_score(r.team2_score),
                ..r
            })
            .collect();
        let tournament = self.tournament.map(PlacementInput::resolve).transpose()?;
        let mut game = GameMatch::new(self.game_date, team_1, team_2, rounds);
        game.photos = self.photos;
        game.tournament = tournament;
        Ok(game)
    }
}

/// On-disk shape of a match. Every format shares one flat JSON object; the
/// format is decided by which fields are present.
mod wire {
    use super::*;
    use crate::logic::resolve_match;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StoredGame {
        #[serde(default, deserialize_with = "lenient::id")]
        id: String,
        #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
        created_at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
        game_date: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team1_players: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team2_players: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rounds: Option<Vec<Round>>,
        #[serde(default, deserialize_with = "lenient::opt_score", skip_serializing_if = "Option::is_none")]
        team1_score: Option<i64>,
        #[serde(default, deserialize_with = "lenient::opt_score", skip_serializing_if = "Option::is_none")]
        team2_score: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player1: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player2: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player3: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player4: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_score", skip_serializing_if = "Option::is_none")]
        score1: Option<i64>,
        #[serde(default, deserialize_with = "lenient::opt_score", skip_serializing_if = "Option::is_none")]
        score2: Option<i64>,
        #[serde(default, deserialize_with = "lenient::opt_score", skip_serializing_if = "Option::is_none")]
        score3: Option<i64>,
        #[serde(default, deserialize_with = "lenient::opt_score", skip_serializing_if = "Option::is_none")]
        score4: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        photos: Vec<String>,
        #[serde(default, deserialize_with = "lenient::placement", skip_serializing_if = "Option::is_none")]
        tournament: Option<TournamentPlacement>,
        // Written for readers of the raw file; never trusted on load.
        #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
        winner: Option<MatchState>,
        #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
        round_results: Vec<RoundResult>,
    }

    impl From<StoredGame> for GameMatch {
        fn from(s: StoredGame) -> Self {
            let format = match (s.team1_players, s.team2_players) {
                (Some(team_1), Some(team_2)) => match s.rounds {
                    Some(rounds) => MatchFormat::TeamRounds {
                        team_1,
                        team_2,
                        rounds,
                    },
                    None => MatchFormat::TeamSingleScore {
                        team_1,
                        team_2,
                        team_1_score: s.team1_score.unwrap_or(0),
                        team_2_score: s.team2_score.unwrap_or(0),
                    },
                },
                _ => {
                    let names = [s.player1, s.player2, s.player3, s.player4];
                    let scores = [s.score1, s.score2, s.score3, s.score4];
                    MatchFormat::LegacyIndividual {
                        players: names
                            .into_iter()
                            .zip(scores)
                            .filter_map(|(name, score)| {
                                name.map(|name| IndividualScore {
                                    name,
                                    score: score.unwrap_or(0),
                                })
                            })
                            .collect(),
                    }
                }
            };

            let mut photos = Vec::new();
            if let Some(photo) = s.photo.filter(|p| !p.is_empty()) {
                photos.push(photo);
            }
            for p in s.photos {
                if !photos.contains(&p) {
                    photos.push(p);
                }
            }

            let id = if s.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                s.id
            };

            GameMatch {
                id,
                created_at: s.created_at,
                game_date: s.game_date,
                format,
                photos,
                tournament: s.tournament,
            }
        }
    }

    impl From<GameMatch> for StoredGame {
        fn from(game: GameMatch) -> Self {
            let resolution = resolve_match(&game.format);
            let mut stored = StoredGame {
                id: game.id,
                created_at: game.created_at,
                game_date: game.game_date,
                photo: game.photos.first().cloned(),
                photos: if game.photos.len() > 1 { game.photos } else { Vec::new() },
                tournament: game.tournament,
                winner: resolution.state,
                round_results: resolution.round_results,
                ..StoredGame::default()
            };
            match game.format {
                MatchFormat::TeamRounds {
                    team_1,
                    team_2,
                    rounds,
                } => {
                    stored.team1_players = Some(team_1);
                    stored.team2_players = Some(team_2);
                    stored.rounds = Some(rounds);
                }
                MatchFormat::TeamSingleScore {
                    team_1,
                    team_2,
                    team_1_score,
                    team_2_score,
                } => {
                    stored.team1_players = Some(team_1);
                    stored.team2_players = Some(team_2);
                    stored.team1_score = Some(team_1_score);
                    stored.team2_score = Some(team_2_score);
                }
                MatchFormat::LegacyIndividual { players } => {
                    let mut it = players.into_iter();
                    let mut next = || it.next().map(|p| (p.name, p.score)).unzip();
                    (stored.player1, stored.score1) = next();
                    (stored.player2, stored.score2) = next();
                    (stored.player3, stored.score3) = next();
                    (stored.player4, stored.score4) = next();
                }
            }
            stored
        }
    }
}
