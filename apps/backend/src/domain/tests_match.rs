use crate::domain::match_state::{Match, Phase, PhaseKind};
use crate::domain::ranking::RankingRecord;
use crate::domain::test_state_helpers::{make_match, make_match_with_policy, pid, set_letters, t0};
use crate::domain::transition::{derive_match_transitions, MatchEvent, MatchLifecycleView};
use crate::domain::vote::{Outcome, VotePolicy};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn turn(m: &Match) -> &str {
    m.current_turn().map(|p| p.as_str()).unwrap_or("-")
}

fn letters(m: &Match, name: &str) -> String {
    m.player(&pid(name)).map(|p| p.letters.clone()).unwrap_or_default()
}

/// Drive an origination to established with every voter confirming.
fn establish(m: &mut Match, originator: &str, trick: &str) {
    m.propose_trick(&pid(originator), trick).unwrap();
    m.report_attempt(&pid(originator), Outcome::Hit, t0()).unwrap();
    let voters: Vec<_> = m
        .vote()
        .map(|v| v.eligible.iter().cloned().collect())
        .unwrap_or_default();
    for voter in voters {
        m.cast_vote(&voter, Outcome::Hit, t0()).unwrap();
    }
    m.check_invariants().unwrap();
}

#[test]
fn origination_miss_is_free_and_passes_turn() {
    let mut m = make_match(&["p1", "p2"], 0);
    m.propose_trick(&pid("p1"), "Ollie").unwrap();
    m.report_attempt(&pid("p1"), Outcome::Miss, t0()).unwrap();

    assert_eq!(m.phase.kind(), PhaseKind::AwaitingProposal);
    assert_eq!(turn(&m), "p2");
    assert_eq!(letters(&m, "p1"), "");
    assert!(m.established_tricks.is_empty());
    assert_eq!(m.attempted_tricks, vec!["Ollie".to_string()]);
    assert!(m.phase.attempt().is_none());
    m.check_invariants().unwrap();
}

#[test]
fn two_player_origination_hit_skips_vote() {
    let mut m = make_match(&["p1", "p2"], 0);
    m.propose_trick(&pid("p1"), "Ollie").unwrap();
    let events = m.report_attempt(&pid("p1"), Outcome::Hit, t0()).unwrap();

    assert!(events.contains(&MatchEvent::AttemptResolved {
        executor_id: pid("p1"),
        outcome: Outcome::Hit,
        by_vote: false,
    }));
    let Phase::Attempting { attempt } = &m.phase else {
        panic!("expected Attempting, got {:?}", m.phase.kind());
    };
    assert_eq!(attempt.trick, "Ollie");
    assert!(attempt.established);
    assert_eq!(attempt.originator, pid("p1"));
    assert_eq!(attempt.executor, pid("p2"));
    assert_eq!(turn(&m), "p2");
    assert_eq!(m.established_tricks, vec!["Ollie".to_string()]);
    m.check_invariants().unwrap();
}

#[test]
fn three_player_replication_miss_by_vote_charges_letter() {
    let mut m = make_match(&["p1", "p2", "p3"], 0);
    establish(&mut m, "p1", "Kickflip");
    assert_eq!(turn(&m), "p2");

    m.report_attempt(&pid("p2"), Outcome::Hit, t0()).unwrap();
    let vote = m.vote().expect("vote opened");
    assert_eq!(vote.eligible.iter().collect::<Vec<_>>(), vec![&pid("p3")]);

    m.cast_vote(&pid("p3"), Outcome::Miss, t0()).unwrap();

    assert_eq!(letters(&m, "p2"), "S");
    assert_eq!(m.phase.kind(), PhaseKind::AwaitingProposal);
    assert_eq!(turn(&m), "p3");
    assert!(m.vote().is_none());
    m.check_invariants().unwrap();
}

#[test]
fn final_letter_eliminates_and_finishes_match() {
    let mut m = make_match(&["p1", "p2"], 0);
    set_letters(&mut m, "p2", "SKAT");
    m.propose_trick(&pid("p1"), "Heelflip").unwrap();
    m.report_attempt(&pid("p1"), Outcome::Hit, t0()).unwrap();

    let finished_at = t0() + time::Duration::minutes(7);
    let before = MatchLifecycleView::of(&m);
    let events = m.report_attempt(&pid("p2"), Outcome::Miss, finished_at).unwrap();
    let after = MatchLifecycleView::of(&m);

    assert_eq!(letters(&m, "p2"), "SKATE");
    assert_eq!(m.eliminated, vec![pid("p2")]);
    assert!(events.contains(&MatchEvent::PlayerEliminated { player_id: pid("p2") }));
    assert_eq!(m.winner(), Some(&pid("p1")));
    assert_eq!(m.finished_at(), Some(finished_at));
    assert_eq!(m.lookup_key(), "finished");
    assert!(derive_match_transitions(&before, &after).contains(&MatchEvent::MatchFinished {
        winner_id: Some(pid("p1"))
    }));

    let record = RankingRecord::from_match(&m).expect("finished");
    assert_eq!(record.match_id, m.id);
    assert_eq!(record.winner_id, Some(pid("p1")));
    assert_eq!(record.duration_seconds, 7 * 60);
    m.check_invariants().unwrap();
}

#[test]
fn elimination_of_one_of_three_keeps_match_running() {
    let mut m = make_match(&["a", "b", "c"], 0);
    set_letters(&mut m, "c", "SKAT");
    establish(&mut m, "a", "Pop Shuvit");

    m.report_attempt(&pid("b"), Outcome::Hit, t0()).unwrap();
    m.cast_vote(&pid("c"), Outcome::Hit, t0()).unwrap();
    assert_eq!(turn(&m), "c");

    m.report_attempt(&pid("c"), Outcome::Miss, t0()).unwrap();
    assert_eq!(
        m.vote().map(|v| v.eligible.iter().cloned().collect::<Vec<_>>()),
        Some(vec![pid("b")])
    );
    m.cast_vote(&pid("b"), Outcome::Miss, t0()).unwrap();

    assert_eq!(m.eliminated, vec![pid("c")]);
    assert!(!m.is_finished());
    assert_eq!(m.phase.kind(), PhaseKind::AwaitingProposal);
    // Seat after c wraps to a.
    assert_eq!(turn(&m), "a");
    m.check_invariants().unwrap();
}

#[test]
fn lap_ends_when_rotation_returns_to_originator() {
    let mut m = make_match(&["a", "b"], 0);
    m.propose_trick(&pid("a"), "Ollie").unwrap();
    m.report_attempt(&pid("a"), Outcome::Hit, t0()).unwrap();
    m.report_attempt(&pid("b"), Outcome::Hit, t0()).unwrap();

    assert_eq!(m.phase.kind(), PhaseKind::AwaitingProposal);
    assert_eq!(turn(&m), "b");
    assert_eq!(letters(&m, "b"), "");

    let err = m.propose_trick(&pid("b"), "  ollie ").unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::TrickAlreadyEstablished, _)
    ));
    m.check_invariants().unwrap();
}

#[test]
fn voted_down_origination_has_no_penalty() {
    let mut m = make_match(&["a", "b", "c"], 1);
    m.propose_trick(&pid("b"), "Kickflip").unwrap();
    m.report_attempt(&pid("b"), Outcome::Hit, t0()).unwrap();
    m.cast_vote(&pid("a"), Outcome::Miss, t0()).unwrap();
    m.cast_vote(&pid("c"), Outcome::Hit, t0()).unwrap();

    // 1-1 tie resolves to miss under majority.
    assert_eq!(m.phase.kind(), PhaseKind::AwaitingProposal);
    assert_eq!(turn(&m), "c");
    assert_eq!(letters(&m, "b"), "");
    assert!(m.established_tricks.is_empty());
}

#[test]
fn unanimous_policy_needs_every_hit() {
    let mut m = make_match_with_policy(&["a", "b", "c", "d"], 0, VotePolicy::Unanimous);
    m.propose_trick(&pid("a"), "Varial").unwrap();
    m.report_attempt(&pid("a"), Outcome::Hit, t0()).unwrap();
    assert_eq!(m.vote().map(|v| v.policy), Some(VotePolicy::Unanimous));
    m.cast_vote(&pid("b"), Outcome::Hit, t0()).unwrap();
    m.cast_vote(&pid("c"), Outcome::Hit, t0()).unwrap();
    m.cast_vote(&pid("d"), Outcome::Miss, t0()).unwrap();

    assert!(m.established_tricks.is_empty());
    assert_eq!(turn(&m), "b");
}

#[test]
fn wrong_player_and_wrong_phase_are_rejected_without_change() {
    let mut m = make_match(&["a", "b", "c"], 0);
    let pristine = m.clone();

    let err = m.propose_trick(&pid("b"), "Ollie").unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NotYourTurn, _)));
    let err = m.report_attempt(&pid("a"), Outcome::Hit, t0()).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::WrongPhase, _)));
    let err = m.cast_vote(&pid("b"), Outcome::Hit, t0()).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::WrongPhase, _)));
    let err = m.propose_trick(&pid("a"), "   ").unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidTrickName, _)));
    assert_eq!(m, pristine);

    m.propose_trick(&pid("a"), "Ollie").unwrap();
    let err = m.report_attempt(&pid("b"), Outcome::Hit, t0()).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NotExecutor, _)));

    m.report_attempt(&pid("a"), Outcome::Hit, t0()).unwrap();
    let err = m.cast_vote(&pid("a"), Outcome::Hit, t0()).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NotEligibleVoter, _)));
    m.cast_vote(&pid("b"), Outcome::Hit, t0()).unwrap();
    let err = m.cast_vote(&pid("b"), Outcome::Miss, t0()).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::AlreadyVoted, _)));
    assert_eq!(m.vote().map(|v| v.tally().hits), Some(1));
}

#[test]
fn mid_vote_round_trip_resolves_identically() {
    let mut m = make_match(&["a", "b", "c", "d"], 0);
    m.propose_trick(&pid("a"), "Tre Flip").unwrap();
    m.report_attempt(&pid("a"), Outcome::Hit, t0()).unwrap();
    m.cast_vote(&pid("b"), Outcome::Hit, t0()).unwrap();

    let json = serde_json::to_string(&m).unwrap();
    let mut reloaded: Match = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, m);

    for target in [&mut m, &mut reloaded] {
        target.cast_vote(&pid("c"), Outcome::Miss, t0()).unwrap();
        target.cast_vote(&pid("d"), Outcome::Hit, t0()).unwrap();
    }
    assert_eq!(reloaded, m);
    assert_eq!(m.established_tricks, vec!["Tre Flip".to_string()]);
}

#[test]
fn vote_opened_is_an_edge_transition() {
    let mut m = make_match(&["a", "b", "c"], 0);
    m.propose_trick(&pid("a"), "Ollie").unwrap();
    let before = MatchLifecycleView::of(&m);
    m.report_attempt(&pid("a"), Outcome::Hit, t0()).unwrap();
    let after = MatchLifecycleView::of(&m);

    assert_eq!(
        derive_match_transitions(&before, &after),
        vec![MatchEvent::VoteOpened {
            voter_ids: vec![pid("b"), pid("c")]
        }]
    );
}
