use std::sync::Arc;
use std::time::Duration;

use parley_client::{Role, SessionConfig, SessionEvent};

use crate::integration::init_tracing;
use crate::integration::session_tests::{TEST_CHANNEL, controller_for};
use crate::utils::{MockMediaEngineFactory, SIGNAL_TIMEOUT_MS, SilentRelay, wait_for_event};

#[tokio::test]
async fn test_stop_returns_while_handshake_is_pending() {
    init_tracing();

    let relay = SilentRelay::start().await;
    let media = MockMediaEngineFactory::new("master");
    let engine = media.engine();
    let mut controller = controller_for(
        &relay.url(),
        SessionConfig::for_channel(TEST_CHANNEL),
        Arc::new(media),
    );

    let mut events = controller
        .start(Role::Master, "master-1".into())
        .await
        .expect("session spawned");

    // Let the session reach the upgrade request
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(controller.is_running());

    tokio::time::timeout(Duration::from_secs(3), controller.stop())
        .await
        .expect("stop() must not wait for the relay handshake");

    wait_for_event(&mut events, SIGNAL_TIMEOUT_MS, |e| *e == SessionEvent::Stopped)
        .await
        .expect("session stopped");
    assert!(engine.is_closed().await);
    assert!(!controller.is_running());
}

#[tokio::test]
async fn test_unanswered_handshake_times_out() {
    init_tracing();

    let relay = SilentRelay::start().await;
    let config = SessionConfig {
        connect_timeout: Duration::from_millis(300),
        ..SessionConfig::for_channel(TEST_CHANNEL)
    };
    let mut controller = controller_for(
        &relay.url(),
        config,
        Arc::new(MockMediaEngineFactory::new("viewer")),
    );

    let mut events = controller
        .start(Role::Viewer, "v1".into())
        .await
        .expect("session spawned");

    let event = wait_for_event(&mut events, SIGNAL_TIMEOUT_MS, |e| {
        matches!(e, SessionEvent::SignalingDisconnected { .. })
    })
    .await
    .expect("handshake timeout surfaced");
    match event {
        SessionEvent::SignalingDisconnected { reason } => {
            assert!(reason.contains("timed out"), "unexpected reason: {reason}")
        }
        other => panic!("Expected disconnect, got {other:?}"),
    }

    wait_for_event(&mut events, SIGNAL_TIMEOUT_MS, |e| *e == SessionEvent::Stopped)
        .await
        .expect("session stopped");
}
