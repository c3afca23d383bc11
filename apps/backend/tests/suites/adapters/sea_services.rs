use std::sync::Arc;

use skate_backend::config::game::GameConfig;
use skate_backend::domain::{Outcome, PhaseKind};
use skate_backend::infra::db::bootstrap_db;
use skate_backend::store::{Collection, SeaStore};

use crate::support::Harness;

async fn sqlite_harness() -> Harness {
    let conn = bootstrap_db("sqlite::memory:")
        .await
        .expect("sqlite bootstrap");
    Harness::with_store(Arc::new(SeaStore::new(conn)), GameConfig::default())
}

#[tokio::test]
async fn invite_converts_into_a_stored_match() {
    let h = sqlite_harness().await;
    let m = h.start_match(&["ann", "ben", "cat"]).await;

    assert_eq!(m.version, 1);
    assert_eq!(m.phase, PhaseKind::AwaitingProposal);
    let invite = h
        .store
        .get(Collection::Invites, m.invite_id.as_str())
        .await
        .unwrap()
        .expect("invite persisted");
    assert_eq!(invite.lookup_key, "converted");
    assert_eq!(invite.body["match_id"], m.id.as_str());
}

#[tokio::test]
async fn full_duel_finishes_and_ranks_over_sqlite() {
    let h = sqlite_harness().await;
    let (match_id, winner, loser) = h.play_out_duel(["ann", "ben"]).await;

    let view = h.view(&match_id).await;
    assert_eq!(view.phase, PhaseKind::Finished);
    assert_eq!(view.winner_id.as_ref(), Some(&winner));
    assert_eq!(view.eliminated_ids, vec![loser]);

    let stored = h
        .store
        .get(Collection::Matches, match_id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.lookup_key, "finished");
    assert!(h.rankings.get(&match_id).await.unwrap().is_some());
}

#[tokio::test]
async fn votes_persist_between_reads() {
    let h = sqlite_harness().await;
    let m = h.start_match(&["ann", "ben", "cat"]).await;
    let setter = h.turn(&m.id).await;
    h.matches.propose_trick(&setter, &m.id, "hardflip").await.unwrap();
    h.matches
        .report_attempt(&setter, &m.id, Outcome::Hit)
        .await
        .unwrap();

    let voting = h.view(&m.id).await;
    assert_eq!(voting.phase, PhaseKind::Voting);
    let voter = voting.vote.unwrap().eligible_voter_ids[0].clone();
    h.matches.cast_vote(&voter, &m.id, Outcome::Hit).await.unwrap();

    let reread = h.view(&m.id).await;
    let vote = reread.vote.expect("one ballot outstanding");
    assert_eq!(vote.ballots.get(&voter), Some(&Outcome::Hit));
    assert_eq!(vote.tally.outstanding, 1);
}
