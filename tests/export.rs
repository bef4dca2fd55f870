//! Integration tests for the CSV export.

use chrono::NaiveDate;
use tarneeb_tracker::models::IndividualScore;
use tarneeb_tracker::{export_csv, BracketRound, GameMatch, MatchFormat, Round, TournamentPlacement};

fn sample() -> GameMatch {
    GameMatch::new(
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        vec!["Ali".into(), "Amir".into()],
        vec!["Zena".into(), "Osama".into()],
        vec![Round::new(1, 9, 5).with_kaboots(1, 0), Round::new(2, 4, 9)],
    )
}

#[test]
fn header_and_one_row_per_match() {
    let csv = String::from_utf8(export_csv(&[sample(), sample()]).unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,game_date,team_1,team_2,"));
    assert!(lines[1].contains(",2024-05-01,Ali & Amir,Zena & Osama,13,14,1,0,incomplete_draw,,"));
}

#[test]
fn tournament_slot_is_labelled() {
    let game = sample().with_tournament(TournamentPlacement::new("Spring Cup", BracketRound::Semifinals, 1));
    let csv = String::from_utf8(export_csv(&[game]).unwrap()).unwrap();
    assert!(csv.lines().nth(1).unwrap().ends_with(",Spring Cup,SF-M2"));
}

#[test]
fn legacy_records_list_individual_scores() {
    let mut game = sample();
    game.format = MatchFormat::LegacyIndividual {
        players: vec![
            IndividualScore { name: "Ali".into(), score: 12 },
            IndividualScore { name: "Zena".into(), score: 7 },
        ],
    };
    let csv = String::from_utf8(export_csv(&[game]).unwrap()).unwrap();
    assert!(csv.contains("\"Ali (12), Zena (7)\""));
}

#[test]
fn empty_export_is_empty() {
    assert!(export_csv(&[]).unwrap().is_empty());
}
