use skate_backend::domain::{MatchId, Outcome, PhaseKind, PlayerId};
use skate_backend::errors::ErrorCode;

use crate::support::Harness;

/// Seat order starting from whoever holds the first turn.
async fn rotation(h: &Harness, id: &MatchId) -> Vec<PlayerId> {
    let view = h.view(id).await;
    let first = view.current_turn_player_id.clone().unwrap();
    let seats: Vec<PlayerId> = view.players.iter().map(|p| p.id.clone()).collect();
    let start = seats.iter().position(|p| p == &first).unwrap();
    (0..seats.len())
        .map(|i| seats[(start + i) % seats.len()].clone())
        .collect()
}

#[tokio::test]
async fn two_player_hit_then_miss_charges_a_letter() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;
    let order = rotation(&h, &m.id).await;
    let (setter, follower) = (&order[0], &order[1]);

    let proposed = h
        .matches
        .propose_trick(setter, &m.id, "kickflip")
        .await
        .unwrap();
    assert_eq!(proposed.phase, PhaseKind::Attempting);
    assert_eq!(proposed.current_trick.as_deref(), Some("kickflip"));
    assert!(!proposed.trick_is_established);

    // With two players left the self-report stands; no vote.
    let landed = h
        .matches
        .report_attempt(setter, &m.id, Outcome::Hit)
        .await
        .unwrap();
    assert_eq!(landed.phase, PhaseKind::Attempting);
    assert!(landed.trick_is_established);
    assert_eq!(landed.executor_id.as_ref(), Some(follower));
    assert_eq!(landed.established_tricks, vec!["kickflip".to_string()]);

    let missed = h
        .matches
        .report_attempt(follower, &m.id, Outcome::Miss)
        .await
        .unwrap();
    assert_eq!(missed.phase, PhaseKind::AwaitingProposal);
    assert_eq!(missed.current_turn_player_id.as_ref(), Some(setter));
    let follower_letters = &missed
        .players
        .iter()
        .find(|p| &p.id == follower)
        .unwrap()
        .letters;
    assert_eq!(follower_letters, "S");
    assert_eq!(missed.version, 4);
}

#[tokio::test]
async fn setters_own_miss_is_free() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben", "cat"]).await;
    let order = rotation(&h, &m.id).await;

    h.matches
        .propose_trick(&order[0], &m.id, "heelflip")
        .await
        .unwrap();
    let after = h
        .matches
        .report_attempt(&order[0], &m.id, Outcome::Miss)
        .await
        .unwrap();

    assert_eq!(after.phase, PhaseKind::AwaitingProposal);
    assert_eq!(after.current_turn_player_id.as_ref(), Some(&order[1]));
    assert!(after.players.iter().all(|p| p.letters.is_empty()));
    assert!(after.vote.is_none());
    assert!(after.established_tricks.is_empty());
    assert_eq!(after.attempted_tricks, vec!["heelflip".to_string()]);
}

#[tokio::test]
async fn out_of_turn_actions_are_rejected_with_current_state() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;
    let order = rotation(&h, &m.id).await;

    let err = h
        .matches
        .propose_trick(&order[1], &m.id, "ollie")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotYourTurn);
    let state = err.state().expect("state attached");
    assert_eq!(state["phase"], "awaiting_proposal");
    assert_eq!(state["current_turn_player_id"], order[0].as_str());
    assert_eq!(state["version"], 1);

    let err = h
        .matches
        .report_attempt(&order[0], &m.id, Outcome::Hit)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongPhase);

    h.matches
        .propose_trick(&order[0], &m.id, "ollie")
        .await
        .unwrap();
    let err = h
        .matches
        .report_attempt(&order[1], &m.id, Outcome::Hit)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotExecutor);

    let err = h
        .matches
        .cast_vote(&order[1], &m.id, Outcome::Hit)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongPhase);

    // None of the rejections moved the match.
    assert_eq!(h.view(&m.id).await.version, 2);
}

#[tokio::test]
async fn established_trick_cannot_be_proposed_again() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;
    let order = rotation(&h, &m.id).await;

    h.matches
        .propose_trick(&order[0], &m.id, "Kickflip")
        .await
        .unwrap();
    h.matches
        .report_attempt(&order[0], &m.id, Outcome::Hit)
        .await
        .unwrap();
    h.matches
        .report_attempt(&order[1], &m.id, Outcome::Hit)
        .await
        .unwrap();

    // Lap over: the follower landed it, so the turn moves on from the setter.
    let view = h.view(&m.id).await;
    assert_eq!(view.phase, PhaseKind::AwaitingProposal);
    assert_eq!(view.current_turn_player_id.as_ref(), Some(&order[1]));

    let err = h
        .matches
        .propose_trick(&order[1], &m.id, "  kickflip ")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TrickAlreadyEstablished);

    let err = h
        .matches
        .propose_trick(&order[1], &m.id, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTrickName);
}

#[tokio::test]
async fn two_player_match_plays_to_the_end() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;
    let order = rotation(&h, &m.id).await;
    let (setter, follower) = (&order[0], &order[1]);

    for round in 0..5 {
        let trick = format!("trick {round}");
        h.matches.propose_trick(setter, &m.id, &trick).await.unwrap();
        h.matches
            .report_attempt(setter, &m.id, Outcome::Hit)
            .await
            .unwrap();
        h.matches
            .report_attempt(follower, &m.id, Outcome::Miss)
            .await
            .unwrap();
    }

    let done = h.view(&m.id).await;
    assert_eq!(done.phase, PhaseKind::Finished);
    assert_eq!(done.winner_id.as_ref(), Some(setter));
    assert_eq!(done.eliminated_ids, vec![follower.clone()]);
    assert!(done.current_turn_player_id.is_none());
    assert!(done.finished_at.is_some());

    assert!(h
        .notifier
        .kinds_for(setter.as_str())
        .contains(&"match_finished"));
    assert!(h
        .notifier
        .kinds_for(follower.as_str())
        .contains(&"match_finished"));

    let err = h
        .matches
        .propose_trick(setter, &m.id, "one more")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongPhase);

    assert!(h
        .matches
        .list_active_for(setter)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(h.matches.list_finished_for(setter).await.unwrap().len(), 1);
}

#[tokio::test]
async fn turn_notifications_follow_the_rotation() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;
    let order = rotation(&h, &m.id).await;

    h.matches
        .propose_trick(&order[0], &m.id, "pop shove-it")
        .await
        .unwrap();
    h.matches
        .report_attempt(&order[0], &m.id, Outcome::Hit)
        .await
        .unwrap();

    assert_eq!(h.notifier.kinds_for(order[1].as_str()), vec!["your_turn"]);
}

#[tokio::test]
async fn get_match_unknown_id_is_not_found() {
    let h = Harness::new();
    let err = h
        .matches
        .get_match(&PlayerId::from("ann"), &MatchId::from("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MatchNotFound);
}

#[tokio::test]
async fn get_match_is_for_seated_players() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;

    let seen = h.matches.get_match(&PlayerId::from("ben"), &m.id).await.unwrap();
    assert_eq!(seen.id, m.id);

    let err = h
        .matches
        .get_match(&PlayerId::from("zed"), &m.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAParticipant);
}

#[tokio::test]
async fn landing_the_last_replication_tells_the_next_proposer() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;
    let setter = h.turn(&m.id).await;
    let follower = m
        .players
        .iter()
        .map(|p| p.id.clone())
        .find(|p| p != &setter)
        .unwrap();

    h.matches.propose_trick(&setter, &m.id, "kickflip").await.unwrap();
    h.matches
        .report_attempt(&setter, &m.id, Outcome::Hit)
        .await
        .unwrap();
    h.notifier.take();

    // The follower lands it, closing the lap, and is now up to propose.
    let view = h
        .matches
        .report_attempt(&follower, &m.id, Outcome::Hit)
        .await
        .unwrap();
    assert_eq!(view.phase, PhaseKind::AwaitingProposal);
    assert_eq!(view.current_turn_player_id.as_ref(), Some(&follower));
    assert_eq!(h.notifier.kinds_for(follower.as_str()), vec!["your_turn"]);
}

#[tokio::test]
async fn list_active_only_shows_seated_players_matches() {
    let h = Harness::new();
    let m = h.start_match(&["ann", "ben"]).await;
    h.start_match(&["cat", "dan"]).await;

    let for_ann = h
        .matches
        .list_active_for(&PlayerId::from("ann"))
        .await
        .unwrap();
    assert_eq!(for_ann.len(), 1);
    assert_eq!(for_ann[0].id, m.id);
}
