//! Multiplayer round E2E tests.
//!
//! These tests exercise rounds from first submission to applied world:
//! - Simultaneous rounds over the active roster
//! - Collective actions closed by their initiator
//! - Roster changes and game master failures mid-round

use chronicle_domain::PlayerId;
use chronicle_shared::{GmTurnPayload, RoundMode};

use super::{adds, narrated, npc_added, E2ETestContext};
use crate::error::ErrorKind;
use crate::infrastructure::settings::EngineSettings;
use crate::use_cases::RoundProgress;

fn action_players(request: &chronicle_shared::TurnRequest) -> Vec<PlayerId> {
    request
        .actions
        .iter()
        .map(|action| PlayerId::from_uuid(action.player_id))
        .collect()
}

// =============================================================================
// Simultaneous Round Tests
// =============================================================================

#[tokio::test]
async fn test_simultaneous_round_applies_once_everyone_acts() {
    let ctx = E2ETestContext::setup();
    let party = ctx.party;
    ctx.game_master
        .push(GmTurnPayload {
            npcs: adds(vec![npc_added("Bandit Captain")]),
            ..narrated("Bandits spill from the treeline.")
        })
        .await;

    ctx.session.set_active_roster(party.roster()).await.unwrap();
    ctx.session.rounds().open_simultaneous(vec![]).await.unwrap();

    // Submission order differs from roster order on purpose.
    for (player, text) in [(party.cato, "Scout ahead"), (party.ash, "Draw steel")] {
        let progress = ctx.session.submit_action(player, text).await.unwrap();
        assert!(matches!(progress, RoundProgress::Waiting(_)));
    }
    let progress = ctx.session.submit_action(party.bryn, "Ready a spell").await.unwrap();

    let RoundProgress::Applied { resolution, log } = progress else {
        panic!("expected the round to be applied");
    };
    assert_eq!(resolution.mode, RoundMode::Simultaneous);
    assert_eq!(log.turn_number, 1);

    let received = ctx.game_master.received().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].turn_number, 0);
    assert_eq!(action_players(&received[0]), party.roster());

    let world = ctx.session.world().await;
    assert_eq!(world.encountered_npcs.len(), 1);
    assert_eq!(world.turn_number, 1);
}

#[tokio::test]
async fn test_departing_player_completes_round() {
    let ctx = E2ETestContext::setup();
    let party = ctx.party;
    ctx.game_master.push(narrated("The party presses on.")).await;

    ctx.session.set_active_roster(party.roster()).await.unwrap();
    ctx.session.rounds().open_simultaneous(vec![]).await.unwrap();
    ctx.session.submit_action(party.ash, "Press on").await.unwrap();
    ctx.session.submit_action(party.bryn, "Follow").await.unwrap();

    // Cato disconnects before acting.
    let progress = ctx
        .session
        .set_active_roster(vec![party.ash, party.bryn])
        .await
        .unwrap();
    let Some(RoundProgress::Applied { resolution, .. }) = progress else {
        panic!("expected the shrunken round to be applied");
    };
    assert_eq!(resolution.actions.len(), 2);
    assert_eq!(ctx.session.turn_number().await, 1);
}

#[tokio::test]
async fn test_manual_round_waits_for_controller() {
    let ctx = E2ETestContext::setup_with(EngineSettings {
        simultaneous_auto_resolve: false,
        ..EngineSettings::default()
    });
    let party = ctx.party;
    ctx.game_master.push(narrated("Dawn breaks.")).await;

    ctx.session.set_active_roster(party.roster()).await.unwrap();
    ctx.session
        .rounds()
        .open_simultaneous(vec![party.cato])
        .await
        .unwrap();
    for player in party.roster() {
        ctx.session.submit_action(player, "Rest").await.unwrap();
    }
    assert!(ctx.session.rounds().is_ready().await);
    assert_eq!(ctx.session.turn_number().await, 0);

    let err = ctx.session.process_round(party.ash).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotPermitted);

    let progress = ctx.session.process_round(party.cato).await.unwrap();
    assert!(matches!(progress, RoundProgress::Applied { .. }));
}

// =============================================================================
// Collective Action Tests
// =============================================================================

#[tokio::test]
async fn test_collective_action_closed_by_initiator() {
    let ctx = E2ETestContext::setup();
    let party = ctx.party;
    ctx.game_master.push(narrated("The gate gives way.")).await;

    ctx.session
        .rounds()
        .request_collective(
            party.ash,
            Some("Ash".into()),
            vec![party.ash, party.bryn],
            Some("Force the gate".into()),
        )
        .await
        .unwrap();

    let err = ctx.session.submit_action(party.cato, "Me too").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAParticipant);

    ctx.session.submit_action(party.bryn, "Push").await.unwrap();
    let progress = ctx.session.submit_action(party.ash, "Push harder").await.unwrap();
    let RoundProgress::Waiting(snapshot) = progress else {
        panic!("collective actions wait for their initiator");
    };
    assert!(snapshot.is_ready());

    assert_eq!(
        ctx.session.process_round(party.bryn).await.unwrap_err().kind(),
        ErrorKind::NotPermitted
    );
    ctx.session.process_round(party.ash).await.unwrap();

    let received = ctx.game_master.received().await;
    assert_eq!(received[0].prompt.as_deref(), Some("Force the gate"));
    assert_eq!(received[0].initiator_name.as_deref(), Some("Ash"));
    assert_eq!(action_players(&received[0]), vec![party.ash, party.bryn]);
}

#[tokio::test]
async fn test_cancelled_round_rejects_late_actions() {
    let ctx = E2ETestContext::setup();
    let party = ctx.party;

    ctx.session
        .rounds()
        .request_collective(party.bryn, None, vec![party.bryn, party.cato], None)
        .await
        .unwrap();
    ctx.session.submit_action(party.bryn, "Wait").await.unwrap();
    ctx.session.cancel_round(party.bryn).await.unwrap();

    let err = ctx.session.submit_action(party.cato, "Go").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RoundClosed);
    assert!(ctx.game_master.received().await.is_empty());
}

// =============================================================================
// Failure Recovery Tests
// =============================================================================

#[tokio::test]
async fn test_round_retried_after_game_master_failure() {
    let ctx = E2ETestContext::setup();
    let party = ctx.party;

    ctx.session.set_active_roster(vec![party.ash]).await.unwrap();
    ctx.session.rounds().open_simultaneous(vec![]).await.unwrap();

    // Nothing scripted yet, so the game master is unavailable.
    let err = ctx.session.submit_action(party.ash, "Listen").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GameMaster);
    assert_eq!(ctx.session.turn_number().await, 0);
    assert!(ctx.session.pending_round().await.is_some());

    ctx.game_master.push(narrated("You hear distant drums.")).await;
    let log = ctx.session.retry_pending_round().await.unwrap();
    assert_eq!(log.narration.as_deref(), Some("You hear distant drums."));
    assert!(ctx.session.pending_round().await.is_none());

    let err = ctx.session.retry_pending_round().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
