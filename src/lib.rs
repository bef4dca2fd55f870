//! Tarneeb score tracker: library with models, the match outcome engine, and
//! the storage and auth collaborators used by the web binary.

pub mod auth;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod storage;

pub use config::Config;
pub use error::TrackerError;
pub use logic::{
    aggregate, build_bracket, export_csv, resolve_match, resolve_rounds, slot_availability,
    summarize, tournament_names, Aggregates, Bracket, MatchResolution, Standings, StatsFilter,
};
pub use models::{
    Aggregate, BracketRound, GameMatch, KnownPlayers, MatchFormat, MatchId, MatchInput,
    MatchState, Round, RoundOutcome, RoundResult, TournamentPlacement,
};
pub use storage::{GameStore, GamesFile};
