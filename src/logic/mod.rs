//! Match outcome engine: resolution, aggregate statistics, bracket layout, export.
//!
//! Everything here is a pure function of the matches passed in.

mod bracket;
mod export;
mod resolution;
mod stats;

pub use bracket::{
    bracket_position, build_bracket, slot_availability, tournament_names, Bracket, BracketHalves,
    BracketSide, BracketSlot, SlotAvailability, SlotOccupant,
};
pub use export::export_csv;
pub use resolution::{match_state, resolve_match, resolve_rounds, round_outcome, MatchResolution};
pub use stats::{
    aggregate, match_contribution, summarize, Aggregates, PlayerStanding, Standings, StatsFilter,
    Summary, TeamAggregate, TeamStanding,
};
