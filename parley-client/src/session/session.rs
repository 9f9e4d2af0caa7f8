use crate::error::NegotiationError;
use crate::media::{MediaEngine, MediaEvent};
use crate::negotiation::NegotiationCoordinator;
use crate::session::{SessionCommand, SessionConfig, SessionEvent};
use crate::transport::{RelayTransport, TransportEvent};
use parley_core::{PeerIdentity, Role, SdpKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// One running call: owns the relay connection and the coordinator and
/// serializes everything that happens to them.
pub(crate) struct Session {
    pub(crate) role: Role,
    pub(crate) self_identity: PeerIdentity,
    pub(crate) config: SessionConfig,
    pub(crate) engine: Arc<dyn MediaEngine>,
    pub(crate) transport: Arc<RelayTransport>,
    pub(crate) coordinator: NegotiationCoordinator,
    pub(crate) command_rx: mpsc::Receiver<SessionCommand>,
    pub(crate) transport_rx: mpsc::Receiver<TransportEvent>,
    pub(crate) media_rx: mpsc::Receiver<MediaEvent>,
    pub(crate) event_tx: mpsc::Sender<SessionEvent>,
}

impl Session {
    pub(crate) async fn run(mut self) {
        info!("Session started as {} ({})", self.role, self.self_identity);

        // The outcome arrives as a TransportEvent; the loop stays responsive
        // to Stop while the handshake is in flight.
        let transport = Arc::clone(&self.transport);
        let connecting = tokio::spawn(async move {
            let _ = transport.connect().await;
        });

        let mut ticker = tokio::time::interval(self.config.timeout_check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Stop) => info!("Stop requested"),
                        None => info!("Session controller dropped"),
                    }
                    break;
                }

                Some(evt) = self.transport_rx.recv() => {
                    if !self.handle_transport_event(evt).await {
                        break;
                    }
                }

                Some(evt) = self.media_rx.recv() => {
                    self.handle_media_event(evt).await;
                }

                _ = ticker.tick() => {
                    let timeout = self.config.negotiation_timeout;
                    if let Some(peer) = self.coordinator.stalled_remote(timeout).await {
                        warn!("Negotiation with {} timed out after {:?}", peer, timeout);
                        self.emit(SessionEvent::NegotiationTimedOut(peer)).await;
                        break;
                    }
                }
            }
        }

        // Releases the transport's connect lock before disconnecting.
        connecting.abort();
        let _ = connecting.await;

        self.transport.disconnect().await;
        self.coordinator.shutdown().await;
        self.emit(SessionEvent::Stopped).await;
        info!("Session finished");
    }

    /// Returns `false` when the session must end.
    async fn handle_transport_event(&mut self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::Connected => {
                self.emit(SessionEvent::SignalingConnected).await;
                if self.role == Role::Viewer {
                    return self.send_offer().await;
                }
                true
            }

            TransportEvent::Disconnected(reason) => {
                self.emit(SessionEvent::SignalingDisconnected { reason })
                    .await;
                false
            }

            TransportEvent::Text(text) => {
                let msg = match parley_core::decode(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("Dropping relay message: {}", e);
                        return true;
                    }
                };
                debug!("Relay delivered {}", msg.kind());

                match self.coordinator.on_remote_message(msg).await {
                    Ok(()) => true,
                    Err(NegotiationError::Protocol(v)) => {
                        warn!("Ignoring relay message: {}", v);
                        true
                    }
                    Err(e) => self.fail(e).await,
                }
            }

            TransportEvent::Binary(data) => {
                warn!("Discarding {} bytes of binary relay data", data.len());
                true
            }
        }
    }

    async fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LocalCandidate(candidate) => {
                if let Err(e) = self.coordinator.on_local_candidate_generated(candidate).await {
                    debug!("Local candidate not sent: {}", e);
                }
            }
            MediaEvent::ConnectionStateChanged(state) => {
                info!("Connection state: {:?}", state);
                self.emit(SessionEvent::ConnectionStateChanged(state)).await;
            }
            MediaEvent::DataReceived(data) => {
                self.emit(SessionEvent::DataReceived(data)).await;
            }
        }
    }

    async fn send_offer(&mut self) -> bool {
        let result: Result<(), NegotiationError> = async {
            let sdp = self.engine.create_offer().await?;
            self.engine
                .set_local_description(SdpKind::Offer, sdp.clone())
                .await?;
            self.coordinator
                .on_local_description_ready(SdpKind::Offer, sdp)
                .await
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => self.fail(e).await,
        }
    }

    async fn fail(&mut self, e: NegotiationError) -> bool {
        error!("Negotiation failed: {}", e);
        self.emit(SessionEvent::Failed(e.to_string())).await;
        false
    }

    async fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).await.is_err() {
            debug!("Session event receiver dropped");
        }
    }
}
