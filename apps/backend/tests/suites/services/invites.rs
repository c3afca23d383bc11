use skate_backend::domain::{Answer, InviteStatus, PhaseKind, PlayerId, ResponseState, VenueId};
use skate_backend::errors::ErrorCode;
use time::Duration;

use crate::support::harness::VENUE;
use crate::support::Harness;

fn pid(id: &str) -> PlayerId {
    PlayerId::from(id)
}

#[tokio::test]
async fn create_invite_notifies_invitees_only() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat"]);

    let invite = h.invite(&["ann", "ben", "cat"]).await.unwrap();

    assert_eq!(invite.status, InviteStatus::Waiting);
    assert_eq!(invite.version, 1);
    assert_eq!(invite.creator_id, pid("ann"));
    assert_eq!(invite.responses[&pid("ann")], ResponseState::Accepted);
    assert_eq!(invite.responses[&pid("ben")], ResponseState::Pending);
    assert_eq!(invite.expires_at - invite.created_at, Duration::seconds(180));

    assert_eq!(h.notifier.kinds_for("ben"), vec!["invite_received"]);
    assert_eq!(h.notifier.kinds_for("cat"), vec!["invite_received"]);
    assert!(h.notifier.kinds_for("ann").is_empty());
}

#[tokio::test]
async fn create_invite_enforces_player_count() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat", "dan", "eve"]);

    let alone = h.invite(&["ann"]).await.unwrap_err();
    assert_eq!(alone.code(), ErrorCode::InvalidParticipantCount);

    let crowd = h.invite(&["ann", "ben", "cat", "dan", "eve"]).await.unwrap_err();
    assert_eq!(crowd.code(), ErrorCode::InvalidParticipantCount);

    assert!(h.invite(&["ann", "ben", "cat", "dan"]).await.is_ok());
}

#[tokio::test]
async fn create_invite_requires_invitees_online_at_venue() {
    let h = Harness::new();
    h.check_in(&["ann"]);
    h.presence.check_in(
        &Harness::snapshot("ben"),
        &VenueId::from("elsewhere"),
        crate::common::t0(),
    );

    let err = h.invite(&["ann", "ben"]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidParticipantCount);
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn last_acceptance_converts_into_match() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat"]);
    let invite = h.invite(&["ann", "ben", "cat"]).await.unwrap();
    h.notifier.take();

    let first = h
        .invites
        .respond(&pid("ben"), &invite.id, Answer::Accepted)
        .await
        .unwrap();
    assert_eq!(first.invite.status, InviteStatus::Waiting);
    assert!(first.r#match.is_none());

    let last = h
        .invites
        .respond(&pid("cat"), &invite.id, Answer::Accepted)
        .await
        .unwrap();
    assert_eq!(last.invite.status, InviteStatus::Converted);
    let created = last.r#match.expect("match created");
    assert_eq!(last.invite.match_id.as_ref(), Some(&created.id));
    assert_eq!(created.phase, PhaseKind::AwaitingProposal);
    assert_eq!(created.version, 1);
    let seated: Vec<_> = created.players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(seated, vec!["ann", "ben", "cat"]);
    assert!(created.players.iter().all(|p| p.letters.is_empty()));

    // The match is in the store, not just in the response.
    let stored = h.view(&created.id).await;
    assert_eq!(stored.current_turn_player_id, created.current_turn_player_id);

    let turn = created.current_turn_player_id.unwrap();
    let sent = h.notifier.take();
    let converted = sent
        .iter()
        .filter(|(_, n)| n.kind() == "invite_converted")
        .count();
    assert_eq!(converted, 3);
    assert!(sent
        .iter()
        .any(|(to, n)| to == &turn && n.kind() == "your_turn"));
}

#[tokio::test]
async fn decline_cancels_and_later_answers_see_current_state() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat"]);
    let invite = h.invite(&["ann", "ben", "cat"]).await.unwrap();
    h.notifier.take();

    let declined = h
        .invites
        .respond(&pid("ben"), &invite.id, Answer::Declined)
        .await
        .unwrap();
    assert_eq!(declined.invite.status, InviteStatus::Cancelled);
    assert_eq!(h.notifier.kinds_for("ann"), vec!["invite_cancelled"]);
    assert_eq!(h.notifier.kinds_for("cat"), vec!["invite_cancelled"]);
    assert!(h.notifier.kinds_for("ben").is_empty());

    let late = h
        .invites
        .respond(&pid("cat"), &invite.id, Answer::Accepted)
        .await
        .unwrap_err();
    assert_eq!(late.code(), ErrorCode::InviteNotPending);
    let state = late.state().expect("rejection carries the invite");
    assert_eq!(state["status"], "cancelled");
    assert_eq!(state["version"], 2);
}

#[tokio::test]
async fn decline_after_accept_still_cancels() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat"]);
    let invite = h.invite(&["ann", "ben", "cat"]).await.unwrap();

    h.invites
        .respond(&pid("ben"), &invite.id, Answer::Accepted)
        .await
        .unwrap();
    let changed_mind = h
        .invites
        .respond(&pid("ben"), &invite.id, Answer::Declined)
        .await
        .unwrap();
    assert_eq!(changed_mind.invite.status, InviteStatus::Cancelled);
}

#[tokio::test]
async fn repeated_acceptance_is_a_no_op() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat"]);
    let invite = h.invite(&["ann", "ben", "cat"]).await.unwrap();

    let once = h
        .invites
        .respond(&pid("ben"), &invite.id, Answer::Accepted)
        .await
        .unwrap();
    let twice = h
        .invites
        .respond(&pid("ben"), &invite.id, Answer::Accepted)
        .await
        .unwrap();
    assert_eq!(once.invite.version, 2);
    assert_eq!(twice.invite.version, 2);
    assert_eq!(twice.invite.status, InviteStatus::Waiting);
}

#[tokio::test]
async fn response_after_deadline_expires_the_invite() {
    let h = Harness::new();
    h.check_in(&["ann", "ben"]);
    let invite = h.invite(&["ann", "ben"]).await.unwrap();
    h.notifier.take();

    h.clock.advance(Duration::seconds(181));
    let err = h
        .invites
        .respond(&pid("ben"), &invite.id, Answer::Accepted)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InviteNotPending);
    assert_eq!(err.state().unwrap()["status"], "expired");

    // Persisted, so the sweeper finds nothing left to do.
    assert_eq!(h.invites.sweep_expired().await.unwrap(), 0);
    let seen = h.invites.get_invite(&pid("ann"), &invite.id).await.unwrap();
    assert_eq!(seen.status, InviteStatus::Expired);
    assert_eq!(seen.version, 2);
    assert_eq!(h.notifier.kinds_for("ann"), vec!["invite_expired"]);
}

#[tokio::test]
async fn deadline_instant_itself_is_still_open() {
    let h = Harness::new();
    h.check_in(&["ann", "ben"]);
    let invite = h.invite(&["ann", "ben"]).await.unwrap();

    h.clock.advance(Duration::seconds(180));
    let result = h
        .invites
        .respond(&pid("ben"), &invite.id, Answer::Accepted)
        .await
        .unwrap();
    assert_eq!(result.invite.status, InviteStatus::Converted);
}

#[tokio::test]
async fn reads_apply_expiry_lazily() {
    let h = Harness::new();
    h.check_in(&["ann", "ben"]);
    let invite = h.invite(&["ann", "ben"]).await.unwrap();

    h.clock.advance(Duration::minutes(10));
    let seen = h.invites.get_invite(&pid("ben"), &invite.id).await.unwrap();
    assert_eq!(seen.status, InviteStatus::Expired);
    // Nothing was written by the read.
    assert_eq!(seen.version, 1);
    assert!(h.invites.list_waiting_for(&pid("ben")).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_invite_is_for_participants() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat"]);
    let invite = h.invite(&["ann", "ben"]).await.unwrap();

    let err = h
        .invites
        .get_invite(&pid("cat"), &invite.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAParticipant);

    let outsider = h
        .invites
        .respond(&pid("cat"), &invite.id, Answer::Accepted)
        .await
        .unwrap_err();
    assert_eq!(outsider.code(), ErrorCode::NotAParticipant);

    let missing = h
        .invites
        .get_invite(&pid("ann"), &"nope".into())
        .await
        .unwrap_err();
    assert_eq!(missing.code(), ErrorCode::InviteNotFound);
}

#[tokio::test]
async fn sweep_expires_only_overdue_invites_once() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat", "dan"]);
    let old = h.invite(&["ann", "ben"]).await.unwrap();
    h.clock.advance(Duration::seconds(120));
    let fresh = h.invite(&["cat", "dan"]).await.unwrap();
    h.notifier.take();

    h.clock.advance(Duration::seconds(61));
    assert_eq!(h.invites.sweep_expired().await.unwrap(), 1);
    assert_eq!(h.invites.sweep_expired().await.unwrap(), 0);

    assert_eq!(
        h.invites.get_invite(&pid("ann"), &old.id).await.unwrap().status,
        InviteStatus::Expired
    );
    assert_eq!(
        h.invites.get_invite(&pid("cat"), &fresh.id).await.unwrap().status,
        InviteStatus::Waiting
    );
    assert_eq!(h.notifier.kinds_for("ben"), vec!["invite_expired"]);
    assert!(h.notifier.kinds_for("dan").is_empty());
}

#[tokio::test]
async fn list_waiting_for_returns_callers_open_invites() {
    let h = Harness::new();
    h.check_in(&["ann", "ben", "cat"]);
    let first = h.invite(&["ann", "ben"]).await.unwrap();
    let second = h.invite(&["cat", "ben"]).await.unwrap();
    h.invite(&["ann", "cat"]).await.unwrap();

    let for_ben: Vec<_> = h
        .invites
        .list_waiting_for(&pid("ben"))
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(for_ben.len(), 2);
    assert!(for_ben.contains(&first.id));
    assert!(for_ben.contains(&second.id));
    assert_eq!(VENUE, first.venue_id.as_str());
}
