//! Integration tests for round and match resolution.

use tarneeb_tracker::logic::{match_state, round_outcome};
use tarneeb_tracker::models::IndividualScore;
use tarneeb_tracker::{resolve_match, resolve_rounds, MatchFormat, MatchState, Round, RoundOutcome};

fn rounds(scores: &[(i64, i64)]) -> Vec<Round> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| Round::new(i as u32 + 1, a, b))
        .collect()
}

#[test]
fn two_round_wins_settle_the_match() {
    let res = resolve_rounds(&rounds(&[(9, 5), (9, 6)]));
    assert_eq!(res.state, Some(MatchState::Team1));
    assert_eq!((res.team1_wins, res.team2_wins, res.draws), (2, 0, 0));
    assert_eq!(res.team1_total, 18);
    assert_eq!(res.team2_total, 11);
    assert_eq!(res.round_results.len(), 2);
    assert_eq!(res.round_results[1].winner, RoundOutcome::Team1);
}

#[test]
fn split_then_decider() {
    let res = resolve_rounds(&rounds(&[(9, 5), (3, 13), (4, 11)]));
    assert_eq!(res.state, Some(MatchState::Team2));
    assert_eq!((res.team1_wins, res.team2_wins), (1, 2));
}

#[test]
fn single_round_lead_is_incomplete_win() {
    assert_eq!(
        resolve_rounds(&rounds(&[(10, 2)])).state,
        Some(MatchState::IncompleteTeam1Win)
    );
    assert_eq!(
        resolve_rounds(&rounds(&[(2, 10)])).state,
        Some(MatchState::IncompleteTeam2Win)
    );
}

#[test]
fn one_all_is_incomplete_draw() {
    let res = resolve_rounds(&rounds(&[(9, 5), (5, 9)]));
    assert_eq!(res.state, Some(MatchState::IncompleteDraw));
}

#[test]
fn drawn_rounds_count_for_nobody() {
    let res = resolve_rounds(&rounds(&[(7, 7), (0, 0)]));
    assert_eq!(res.draws, 2);
    assert_eq!(res.state, Some(MatchState::Incomplete));
    assert!(res
        .round_results
        .iter()
        .all(|r| r.winner == RoundOutcome::Draw));
}

#[test]
fn equal_scores_draw_whatever_their_value() {
    for score in [-13, 0, 1, 13, 31] {
        assert_eq!(round_outcome(&Round::new(1, score, score)), RoundOutcome::Draw);
    }
}

#[test]
fn no_rounds_has_no_state() {
    let res = resolve_rounds(&[]);
    assert_eq!(res.state, None);
    assert!(res.round_results.is_empty());
    assert_eq!(res.team1_total, 0);
}

#[test]
fn kaboots_are_summed_but_never_decide() {
    let res = resolve_rounds(&[
        Round::new(1, 5, 9).with_kaboots(3, 0),
        Round::new(2, 5, 9).with_kaboots(2, 0),
    ]);
    assert_eq!(res.team1_kaboots, 5);
    assert_eq!(res.team2_kaboots, 0);
    assert_eq!(res.state, Some(MatchState::Team2));
}

#[test]
fn negative_scores_compare_normally() {
    let res = resolve_rounds(&rounds(&[(-4, -9), (-1, -2)]));
    assert_eq!(res.state, Some(MatchState::Team1));
    assert_eq!(res.team1_total, -5);
}

#[test]
fn unnumbered_rounds_use_their_position() {
    let res = resolve_rounds(&[Round::new(0, 1, 2), Round::new(0, 3, 2)]);
    let numbers: Vec<u32> = res.round_results.iter().map(|r| r.round).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[test]
fn resolution_is_idempotent() {
    let input = rounds(&[(9, 5), (2, 13), (9, 9)]);
    assert_eq!(resolve_rounds(&input), resolve_rounds(&input));
}

#[test]
fn state_priority_follows_win_counts() {
    assert_eq!(match_state(2, 1), MatchState::Team1);
    assert_eq!(match_state(1, 2), MatchState::Team2);
    assert_eq!(match_state(3, 0), MatchState::Team1);
    assert_eq!(match_state(1, 0), MatchState::IncompleteTeam1Win);
    assert_eq!(match_state(0, 1), MatchState::IncompleteTeam2Win);
    assert_eq!(match_state(1, 1), MatchState::IncompleteDraw);
    assert_eq!(match_state(0, 0), MatchState::Incomplete);
}

#[test]
fn only_decided_states_are_complete() {
    assert!(MatchState::Team1.is_complete());
    assert!(MatchState::Team2.is_complete());
    assert!(!MatchState::IncompleteTeam1Win.is_complete());
    assert!(!MatchState::IncompleteDraw.is_complete());
}

#[test]
fn single_score_format_resolves_by_comparison() {
    let format = |a, b| MatchFormat::TeamSingleScore {
        team_1: vec!["Ali".into(), "Amir".into()],
        team_2: vec!["Zena".into(), "Osama".into()],
        team_1_score: a,
        team_2_score: b,
    };
    assert_eq!(resolve_match(&format(31, 20)).state, Some(MatchState::Team1));
    assert_eq!(resolve_match(&format(20, 31)).state, Some(MatchState::Team2));
    assert_eq!(resolve_match(&format(20, 20)).state, None);
    assert_eq!(resolve_match(&format(31, 20)).team1_total, 31);
}

#[test]
fn legacy_individual_records_resolve_to_nothing() {
    let format = MatchFormat::LegacyIndividual {
        players: vec![IndividualScore {
            name: "Ali".into(),
            score: 12,
        }],
    };
    let res = resolve_match(&format);
    assert_eq!(res.state, None);
    assert!(res.round_results.is_empty());
}

#[test]
fn extreme_scores_do_not_overflow_totals() {
    let res = resolve_rounds(&[Round::new(1, i64::MAX, 0), Round::new(2, i64::MAX, 0)]);
    assert_eq!(res.team1_total, 2 * i64::from(i32::MAX));
    assert_eq!(res.state, Some(MatchState::Team1));

    let mut raw = Round::new(1, 0, 0);
    raw.team1_score = i64::MAX;
    let res = resolve_rounds(&[raw.clone(), raw]);
    assert_eq!(res.team1_total, i64::MAX);
}
