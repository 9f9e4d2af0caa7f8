mod test_negotiation_timeout;
mod test_stalled_relay_handshake;

use std::sync::Arc;

use parley_client::{
    MediaEngineFactory, PeerIdentity, Role, SessionConfig, SessionController, SessionEvent,
    StaticChannelResolver,
};
use tokio::sync::mpsc;

use crate::utils::{MockRelay, SIGNAL_TIMEOUT_MS, wait_for_event};

pub const TEST_CHANNEL: &str = "test-channel";

pub fn controller_for(
    relay_url: &str,
    config: SessionConfig,
    media: Arc<dyn MediaEngineFactory>,
) -> SessionController {
    let resolver = StaticChannelResolver::new(relay_url, vec![]);
    SessionController::new(config, Arc::new(resolver), media)
}

/// Starts a master session and waits until the relay has registered it.
pub async fn start_master(
    relay: &MockRelay,
    media: Arc<dyn MediaEngineFactory>,
) -> (SessionController, mpsc::Receiver<SessionEvent>) {
    let mut controller = controller_for(&relay.url(), SessionConfig::for_channel(TEST_CHANNEL), media);
    let mut events = controller
        .start(Role::Master, PeerIdentity::from("master-1"))
        .await
        .expect("master session started");

    wait_for_event(&mut events, SIGNAL_TIMEOUT_MS, |e| {
        *e == SessionEvent::SignalingConnected
    })
    .await
    .expect("master connected to relay");
    assert!(relay.wait_for_master(SIGNAL_TIMEOUT_MS).await, "relay never saw the master");

    (controller, events)
}

pub async fn start_viewer(
    relay: &MockRelay,
    client_id: &str,
    config: SessionConfig,
    media: Arc<dyn MediaEngineFactory>,
) -> (SessionController, mpsc::Receiver<SessionEvent>) {
    let mut controller = controller_for(&relay.url(), config, media);
    let events = controller
        .start(Role::Viewer, PeerIdentity::from(client_id))
        .await
        .expect("viewer session started");
    (controller, events)
}
