use crate::domain::ranking::RankingRecord;
use crate::domain::test_state_helpers::{make_match, pid, set_letters, t0};
use crate::domain::vote::Outcome;

#[test]
fn unfinished_match_has_no_record() {
    let m = make_match(&["a", "b"], 0);
    assert!(RankingRecord::from_match(&m).is_none());
}

#[test]
fn standings_put_winner_first_and_first_out_last() {
    let mut m = make_match(&["a", "b", "c"], 0);
    set_letters(&mut m, "c", "SKATE");
    set_letters(&mut m, "b", "SKAT");

    m.propose_trick(&pid("a"), "Ollie").unwrap();
    m.report_attempt(&pid("a"), Outcome::Hit, t0()).unwrap();
    m.report_attempt(&pid("b"), Outcome::Miss, t0()).unwrap();

    let record = RankingRecord::from_match(&m).expect("finished");
    assert_eq!(record.eliminated_ids, vec![pid("c"), pid("b")]);
    let order: Vec<_> = record.standings.iter().map(|s| (s.player_id.clone(), s.place)).collect();
    assert_eq!(order, vec![(pid("a"), 1), (pid("b"), 2), (pid("c"), 3)]);
    assert_eq!(record.established_tricks, vec!["Ollie".to_string()]);
}
