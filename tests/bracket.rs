//! Integration tests for bracket layout, slot availability and slot labels.

use chrono::NaiveDate;
use tarneeb_tracker::logic::{bracket_position, BracketSide};
use tarneeb_tracker::{
    build_bracket, slot_availability, tournament_names, BracketRound, GameMatch, MatchState, Round,
    TournamentPlacement,
};

const CUP: &str = "Spring Cup";

fn placed(round: BracketRound, index: i64, scores: &[(i64, i64)]) -> GameMatch {
    let rounds = scores
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| Round::new(i as u32 + 1, a, b))
        .collect();
    let mut placement = TournamentPlacement::new(CUP, round, 0);
    placement.match_index = index;
    GameMatch::new(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        vec!["Amir".into(), "Ali".into()],
        vec!["Zena".into(), "Osama".into()],
        rounds,
    )
    .with_tournament(placement)
}

#[test]
fn empty_bracket_has_every_label() {
    let b = build_bracket(&[], CUP);
    let left: Vec<&str> = b.round_of_16.left.iter().map(|s| s.label.as_str()).collect();
    let right: Vec<&str> = b.round_of_16.right.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(left, ["R16-M1", "R16-M2", "R16-M3", "R16-M4"]);
    assert_eq!(right, ["R16-M5", "R16-M6", "R16-M7", "R16-M8"]);
    assert_eq!(b.quarterfinals.right[1].label, "QF-M4");
    assert_eq!(b.semifinals.right[0].label, "SF-M2");
    assert_eq!(b.third_place.label, "3rd Place");
    assert_eq!(b.final_match.label, "Final");
    assert_eq!(b.occupied().count(), 0);
}

#[test]
fn round_of_16_slot_5_lands_right_half_index_1() {
    let m = placed(BracketRound::RoundOf16, 5, &[]);
    let b = build_bracket(&[m.clone()], CUP);
    let slot = b.slot(BracketRound::RoundOf16, BracketSide::Right, 1).unwrap();
    assert_eq!(slot.label, "R16-M6");
    let occupant = slot.occupant.as_ref().unwrap();
    assert_eq!(occupant.match_id, m.id);
    assert_eq!(occupant.state, None);
    assert_eq!(occupant.team1_name, "Ali & Amir");
    assert_eq!(b.occupied().count(), 1);
}

#[test]
fn occupant_carries_round_wins_and_state() {
    let b = build_bracket(&[placed(BracketRound::Final, 0, &[(9, 5), (2, 9), (9, 1)])], CUP);
    let o = b.final_match.occupant.as_ref().unwrap();
    assert_eq!((o.team1_wins, o.team2_wins), (2, 1));
    assert_eq!(o.state, Some(MatchState::Team1));
}

#[test]
fn first_match_keeps_a_contested_slot() {
    let first = placed(BracketRound::Quarterfinals, 0, &[(9, 5)]);
    let second = placed(BracketRound::Quarterfinals, 0, &[(5, 9)]);
    let b = build_bracket(&[first.clone(), second], CUP);
    let slot = &b.quarterfinals.left[0];
    assert_eq!(slot.occupant.as_ref().unwrap().match_id, first.id);
    assert_eq!(b.occupied().count(), 1);
}

#[test]
fn out_of_range_indices_are_skipped() {
    let matches = vec![
        placed(BracketRound::RoundOf16, 8, &[]),
        placed(BracketRound::RoundOf16, -1, &[]),
        placed(BracketRound::Quarterfinals, 4, &[]),
        placed(BracketRound::Quarterfinals, -3, &[]),
    ];
    let b = build_bracket(&matches, CUP);
    assert_eq!(b.occupied().count(), 0);
}

// Known gap: a stored semifinal index of 2 or more normalizes past the single
// right-half slot, and third place / final only have index 0. Such matches are
// dropped from the bracket with a warning instead of being placed somewhere.
#[test]
fn semifinal_extra_index_is_dropped() {
    let b = build_bracket(&[placed(BracketRound::Semifinals, 2, &[(9, 5)])], CUP);
    assert_eq!(b.occupied().count(), 0);
    assert!(b.semifinals.left[0].occupant.is_none());
    assert!(b.semifinals.right[0].occupant.is_none());
}

#[test]
fn third_place_and_final_extra_index_is_dropped() {
    let matches = vec![
        placed(BracketRound::ThirdPlace, 1, &[]),
        placed(BracketRound::Final, 3, &[]),
    ];
    let b = build_bracket(&matches, CUP);
    assert!(b.third_place.occupant.is_none());
    assert!(b.final_match.occupant.is_none());
}

#[test]
fn semifinal_indices_split_across_halves() {
    let matches = vec![
        placed(BracketRound::Semifinals, 0, &[]),
        placed(BracketRound::Semifinals, 1, &[]),
    ];
    let b = build_bracket(&matches, CUP);
    assert!(b.semifinals.left[0].occupant.is_some());
    assert!(b.semifinals.right[0].occupant.is_some());
}

#[test]
fn other_tournaments_and_unplaced_matches_are_ignored() {
    let mut other = placed(BracketRound::Final, 0, &[]);
    other.tournament.as_mut().unwrap().name = "Winter Cup".into();
    let mut loose = placed(BracketRound::Final, 0, &[]);
    loose.tournament = None;
    let b = build_bracket(&[other, loose], CUP);
    assert!(b.final_match.occupant.is_none());
}

#[test]
fn placement_names_override_team_names() {
    let mut m = placed(BracketRound::Semifinals, 0, &[]);
    let p = m.tournament.as_mut().unwrap();
    p.team1_name = Some("The Kings".into());
    let b = build_bracket(&[m], CUP);
    let o = b.semifinals.left[0].occupant.as_ref().unwrap();
    assert_eq!(o.team1_name, "The Kings");
    assert_eq!(o.team2_name, "Osama & Zena");
}

#[test]
fn positions_by_round() {
    use BracketRound::*;
    assert_eq!(bracket_position(RoundOf16, 3), Some((BracketSide::Left, 3)));
    assert_eq!(bracket_position(RoundOf16, 4), Some((BracketSide::Right, 0)));
    assert_eq!(bracket_position(Quarterfinals, 3), Some((BracketSide::Right, 1)));
    assert_eq!(bracket_position(Semifinals, 1), Some((BracketSide::Right, 0)));
    assert_eq!(bracket_position(Semifinals, 2), None);
    assert_eq!(bracket_position(Final, 0), Some((BracketSide::Center, 0)));
    assert_eq!(bracket_position(ThirdPlace, 1), None);
    assert_eq!(bracket_position(RoundOf16, -2), None);
}

#[test]
fn slot_availability_marks_used_slots() {
    let taken = placed(BracketRound::Quarterfinals, 2, &[]);
    let slots = slot_availability(&[taken.clone()], CUP, None);
    assert_eq!(slots.len(), 16);
    let used: Vec<&str> = slots.iter().filter(|s| s.used).map(|s| s.label.as_str()).collect();
    assert_eq!(used, ["QF-M3"]);

    // The match being edited does not block its own slot.
    let slots = slot_availability(&[taken.clone()], CUP, Some(&taken.id));
    assert!(slots.iter().all(|s| !s.used));

    let slots = slot_availability(&[taken], "Winter Cup", None);
    assert!(slots.iter().all(|s| !s.used));
}

#[test]
fn tournament_names_are_sorted_and_distinct() {
    let mut a = placed(BracketRound::Final, 0, &[]);
    a.tournament.as_mut().unwrap().name = "Winter Cup".into();
    let b = placed(BracketRound::Final, 0, &[]);
    let c = placed(BracketRound::RoundOf16, 0, &[]);
    let mut d = c.clone();
    d.tournament = None;
    assert_eq!(tournament_names(&[a, b, c, d]), ["Spring Cup", "Winter Cup"]);
}

#[test]
fn labels_parse_back_to_slots() {
    assert_eq!(BracketRound::parse_label("R16-M6"), Some((BracketRound::RoundOf16, 5)));
    assert_eq!(BracketRound::parse_label("qf-m1"), Some((BracketRound::Quarterfinals, 0)));
    assert_eq!(BracketRound::parse_label("SF-M2"), Some((BracketRound::Semifinals, 1)));
    assert_eq!(BracketRound::parse_label("3rd Place"), Some((BracketRound::ThirdPlace, 0)));
    assert_eq!(BracketRound::parse_label("Final"), Some((BracketRound::Final, 0)));
    assert_eq!(BracketRound::parse_label("SF-M3"), None);
    assert_eq!(BracketRound::parse_label("R16-M0"), None);
    assert_eq!(BracketRound::parse_label("Playoff"), None);
    for round in BracketRound::ALL {
        for i in 0..round.slot_count() {
            assert_eq!(BracketRound::parse_label(&round.slot_label(i)), Some((round, i)));
        }
    }
}
