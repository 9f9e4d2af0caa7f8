use crate::error::SessionError;
use crate::media::MediaEngineFactory;
use crate::negotiation::NegotiationCoordinator;
use crate::resolver::ChannelResolver;
use crate::session::{Session, SessionCommand, SessionConfig, SessionEvent};
use crate::transport::RelayTransport;
use parley_core::{PeerIdentity, Role};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

const EVENT_CHANNEL_SIZE: usize = 256;

struct RunningSession {
    command_tx: mpsc::Sender<SessionCommand>,
    handle: JoinHandle<()>,
}

/// Entry point for callers: starts and stops one call at a time.
pub struct SessionController {
    config: SessionConfig,
    resolver: Arc<dyn ChannelResolver>,
    media: Arc<dyn MediaEngineFactory>,
    running: Option<RunningSession>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        resolver: Arc<dyn ChannelResolver>,
        media: Arc<dyn MediaEngineFactory>,
    ) -> Self {
        Self {
            config,
            resolver,
            media,
            running: None,
        }
    }

    /// Resolves the channel, builds the media engine and spawns the session.
    /// The relay connection is opened by the session itself; watch the
    /// returned stream for the outcome. The stream ends with
    /// [`SessionEvent::Stopped`].
    pub async fn start(
        &mut self,
        role: Role,
        self_identity: PeerIdentity,
    ) -> Result<mpsc::Receiver<SessionEvent>, SessionError> {
        if self
            .running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
        {
            return Err(SessionError::AlreadyStarted);
        }

        let channel = self.config.channel_name.clone();
        let endpoints = self
            .resolver
            .resolve_endpoints(&channel, role)
            .await
            .map_err(|e| SessionError::Resolve {
                channel: channel.clone(),
                reason: format!("{e:#}"),
            })?;
        info!(
            "Starting {} session on channel '{}' as {}",
            role, endpoints.channel_id, self_identity
        );

        let (media_tx, media_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let engine = self
            .media
            .create(role, &endpoints.ice_servers, media_tx)
            .await?;

        let (transport_tx, transport_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let transport = Arc::new(
            RelayTransport::new(endpoints.connect_url(role, &self_identity), transport_tx)
                .with_connect_timeout(self.config.connect_timeout),
        );

        let mut coordinator = NegotiationCoordinator::new(
            role,
            self_identity.clone(),
            Arc::clone(&engine),
            transport.clone(),
        );
        if role == Role::Viewer {
            coordinator = coordinator.with_remote_identity(self.config.master_alias.clone());
        }

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(8);

        let session = Session {
            role,
            self_identity,
            config: self.config.clone(),
            engine,
            transport,
            coordinator,
            command_rx,
            transport_rx,
            media_rx,
            event_tx,
        };
        let handle = tokio::spawn(session.run());

        self.running = Some(RunningSession { command_tx, handle });
        Ok(event_rx)
    }

    /// Disconnects from the relay, then shuts the coordinator down, and waits
    /// for the session task to finish.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.command_tx.send(SessionCommand::Stop).await;
        let _ = running.handle.await;
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}
