use std::sync::Arc;
use std::time::Duration;

use parley_client::{PeerIdentity, SessionConfig, SessionEvent};

use crate::integration::init_tracing;
use crate::integration::session_tests::{TEST_CHANNEL, start_viewer};
use crate::utils::{MockMediaEngineFactory, MockRelay, SIGNAL_TIMEOUT_MS, wait_for_event};

#[tokio::test]
async fn test_viewer_without_master_times_out() {
    init_tracing();

    // No master on the relay: the offer goes nowhere
    let relay = MockRelay::start().await;
    let media = MockMediaEngineFactory::new("viewer");
    let engine = media.engine();

    let config = SessionConfig {
        negotiation_timeout: Duration::from_millis(300),
        timeout_check_interval: Duration::from_millis(50),
        ..SessionConfig::for_channel(TEST_CHANNEL)
    };
    let (viewer, mut events) = start_viewer(&relay, "v1", config, Arc::new(media)).await;

    let event = wait_for_event(&mut events, SIGNAL_TIMEOUT_MS, |e| {
        matches!(e, SessionEvent::NegotiationTimedOut(_))
    })
    .await
    .expect("negotiation timed out");
    assert_eq!(event, SessionEvent::NegotiationTimedOut(PeerIdentity::from("MASTER")));

    wait_for_event(&mut events, SIGNAL_TIMEOUT_MS, |e| *e == SessionEvent::Stopped)
        .await
        .expect("session stopped");
    assert!(engine.is_closed().await);
    assert!(!viewer.is_running());
}
