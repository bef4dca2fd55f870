//! Data structures for the score tracker: rounds, matches, players, tournament placement.

mod game;
mod lenient;
mod player;
mod tournament;

pub use game::{
    clamp_score, GameMatch, IndividualScore, MatchFormat, MatchId, MatchInput, MatchState, Round,
    RoundOutcome, RoundResult, Team, MAX_ROUNDS,
};
pub use player::{
    team_name, validate_roster, Aggregate, KnownPlayers, WinRateBand, DEFAULT_KNOWN_PLAYERS,
    TEAM_NAME_SEPARATOR,
};
pub use tournament::{BracketRound, PlacementInput, TournamentPlacement};
