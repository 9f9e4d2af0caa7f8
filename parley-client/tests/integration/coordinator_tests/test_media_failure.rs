use parley_client::{MediaEngineError, NegotiationError, NegotiationMessage, PeerIdentity, PeerState};

use crate::integration::{create_test_viewer, init_tracing};

#[tokio::test]
async fn test_rejected_answer_surfaces_media_error() {
    init_tracing();

    let t = create_test_viewer("v1", "MASTER");
    let master = PeerIdentity::from("MASTER");
    t.engine.reject_remote_descriptions();

    let result = t
        .coordinator
        .on_remote_message(NegotiationMessage::Answer {
            sdp: "bad-answer".to_owned(),
            recipient_id: Some(PeerIdentity::from("v1")),
        })
        .await;

    assert!(matches!(
        result,
        Err(NegotiationError::Media(MediaEngineError::SetDescription { .. }))
    ));
    assert_ne!(
        t.coordinator.peer_state(&master).await,
        PeerState::Finalized,
        "Failed answer must not finalize the master"
    );
}

#[tokio::test]
async fn test_rejected_offer_sends_no_answer() {
    init_tracing();

    let t = crate::integration::create_test_coordinator(parley_client::Role::Master, "master-1");
    t.engine.reject_remote_descriptions();

    let result = t
        .coordinator
        .on_remote_message(NegotiationMessage::Offer {
            sdp: "bad-offer".to_owned(),
            sender_id: PeerIdentity::from("v1"),
        })
        .await;

    assert!(matches!(result, Err(NegotiationError::Media(_))));
    assert!(t.signaling.messages().await.is_empty());
}
