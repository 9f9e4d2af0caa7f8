use parley_client::{NegotiationError, NegotiationMessage, PeerIdentity, PeerState, Role};

use crate::integration::{candidate, create_test_coordinator, init_tracing};

#[tokio::test]
async fn test_shutdown_clears_state_and_closes_engine() {
    init_tracing();

    let t = create_test_coordinator(Role::Master, "master-1");
    let viewer = PeerIdentity::from("v1");
    let late = PeerIdentity::from("v2");

    t.coordinator
        .on_remote_message(NegotiationMessage::Offer {
            sdp: "viewer-offer".to_owned(),
            sender_id: viewer.clone(),
        })
        .await
        .unwrap();
    t.coordinator.submit_candidate(late.clone(), candidate(1)).await;

    t.coordinator.shutdown().await;

    assert!(t.coordinator.is_shut_down().await);
    assert!(t.engine.is_closed().await);
    assert_eq!(t.coordinator.remote_identity().await, None);
    assert_eq!(t.coordinator.peer_state(&viewer).await, PeerState::Unknown);
    assert_eq!(t.coordinator.pending_candidates(&late).await, 0);
}

#[tokio::test]
async fn test_everything_after_shutdown_is_a_no_op() {
    init_tracing();

    let t = create_test_coordinator(Role::Master, "master-1");
    let viewer = PeerIdentity::from("v1");

    t.coordinator.shutdown().await;
    let calls_at_shutdown = t.engine.calls().await;

    let result = t
        .coordinator
        .on_remote_message(NegotiationMessage::Offer {
            sdp: "late-offer".to_owned(),
            sender_id: viewer.clone(),
        })
        .await;
    assert!(matches!(result, Err(NegotiationError::ShutDown)));

    t.coordinator.submit_candidate(viewer.clone(), candidate(1)).await;
    t.coordinator.finalize_peer_connection(viewer.clone()).await;
    let local = t.coordinator.on_local_candidate_generated(candidate(2)).await;
    assert!(matches!(local, Err(NegotiationError::ShutDown)));

    // Second shutdown must not close the engine again
    t.coordinator.shutdown().await;

    assert_eq!(t.engine.calls().await, calls_at_shutdown);
    assert!(t.signaling.messages().await.is_empty());
    assert_eq!(t.coordinator.peer_state(&viewer).await, PeerState::Unknown);
}
