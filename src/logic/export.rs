//! CSV export of the games list.

use crate::error::TrackerError;
use crate::logic::resolution::resolve_match;
use crate::models::{GameMatch, MatchFormat, MatchState, TEAM_NAME_SEPARATOR};
use serde::Serialize;

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    game_date: String,
    team_1: String,
    team_2: String,
    team_1_total: i64,
    team_2_total: i64,
    team_1_kaboots: u64,
    team_2_kaboots: u64,
    state: &'static str,
    tournament: &'a str,
    slot: String,
}

/// One row per match, newest first as stored. Legacy individual records list
/// `name (score)` for all four players in the team 1 column.
pub fn export_csv(matches: &[GameMatch]) -> Result<Vec<u8>, TrackerError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for game in matches {
        let res = resolve_match(&game.format);
        let (team_1, team_2) = match &game.format {
            MatchFormat::TeamRounds { team_1, team_2, .. }
            | MatchFormat::TeamSingleScore { team_1, team_2, .. } => {
                (team_1.join(TEAM_NAME_SEPARATOR), team_2.join(TEAM_NAME_SEPARATOR))
            }
            MatchFormat::LegacyIndividual { players } => (
                players
                    .iter()
                    .map(|p| format!("{} ({})", p.name, p.score))
                    .collect::<Vec<_>>()
                    .join(", "),
                String::new(),
            ),
        };
        let placement = game.tournament.as_ref();
        wtr.serialize(ExportRow {
            id: &game.id,
            game_date: game.game_date.map(|d| d.to_string()).unwrap_or_default(),
            team_1,
            team_2,
            team_1_total: res.team1_total,
            team_2_total: res.team2_total,
            team_1_kaboots: res.team1_kaboots,
            team_2_kaboots: res.team2_kaboots,
            state: res.state.map(MatchState::as_str).unwrap_or(""),
            tournament: placement.map(|p| p.name.as_str()).unwrap_or(""),
            slot: placement
                .and_then(|p| p.slot_index().map(|i| p.round.slot_label(i)))
                .unwrap_or_default(),
        })?;
    }
    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| TrackerError::Io(e.into_error()))
}
