use crate::error::MediaEngineError;
use crate::media::{ConnectionState, MediaConfig, MediaEngine, MediaEngineFactory, MediaEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parley_core::{IceCandidate, IceServerConfig, Role, SdpKind};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine as CodecRegistry;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// [`MediaEngine`] backed by a `webrtc` crate peer connection.
pub struct WebRtcMediaEngine {
    role: Role,
    config: MediaConfig,
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Mutex<Option<Arc<RTCDataChannel>>>,
    events: mpsc::Sender<MediaEvent>,
}

impl WebRtcMediaEngine {
    pub async fn new(
        role: Role,
        config: MediaConfig,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<MediaEvent>,
    ) -> Result<Self> {
        let mut codecs = CodecRegistry::default();
        codecs.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut codecs)?;

        let api = APIBuilder::new()
            .with_media_engine(codecs)
            .with_interceptor_registry(registry)
            .build();

        let servers = if ice_servers.is_empty() {
            &config.fallback_ice_servers[..]
        } else {
            ice_servers
        };
        let rtc_config = RTCConfiguration {
            ice_servers: servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("failed to create peer connection")?,
        );

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                    if let Some(state) = map_state(s) {
                        let _ = tx.send(MediaEvent::ConnectionStateChanged(state)).await;
                    }
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid.unwrap_or_default(),
                    sdp_m_line_index: init.sdp_mline_index.unwrap_or_default(),
                };
                let _ = tx.send(MediaEvent::LocalCandidate(candidate)).await;
            })
        }));

        let dc_tx = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            Box::pin(async move {
                debug!("Remote opened data channel '{}'", dc.label());
                forward_messages(&dc, tx);
            })
        }));

        Ok(Self {
            role,
            config,
            peer_connection,
            data_channel: Mutex::new(None),
            events,
        })
    }

    async fn open_data_channel(&self) -> Result<()> {
        let mut slot = self.data_channel.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let dc = self
            .peer_connection
            .create_data_channel(&self.config.data_channel_label, None)
            .await
            .context("failed to create data channel")?;
        forward_messages(&dc, self.events.clone());
        *slot = Some(dc);
        Ok(())
    }
}

#[async_trait]
impl MediaEngine for WebRtcMediaEngine {
    async fn create_offer(&self) -> Result<String, MediaEngineError> {
        if self.role == Role::Viewer && self.config.offer_data_channel {
            self.open_data_channel()
                .await
                .map_err(|e| MediaEngineError::Setup(format!("{e:#}")))?;
        }

        let offer = self.peer_connection.create_offer(None).await.map_err(|e| {
            warn!("create_offer failed: {}", e);
            MediaEngineError::CreateDescription(SdpKind::Offer)
        })?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, MediaEngineError> {
        let answer = self.peer_connection.create_answer(None).await.map_err(|e| {
            warn!("create_answer failed: {}", e);
            MediaEngineError::CreateDescription(SdpKind::Answer)
        })?;
        Ok(answer.sdp)
    }

    async fn set_local_description(
        &self,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), MediaEngineError> {
        let desc = description(kind, sdp)?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(|e| MediaEngineError::SetDescription {
                kind,
                reason: e.to_string(),
            })
    }

    async fn set_remote_description(
        &self,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), MediaEngineError> {
        let desc = description(kind, sdp)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| MediaEngineError::SetDescription {
                kind,
                reason: e.to_string(),
            })
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), MediaEngineError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: Some(candidate.sdp_mid),
            sdp_mline_index: Some(candidate.sdp_m_line_index),
            ..Default::default()
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| MediaEngineError::AddCandidate(e.to_string()))
    }

    async fn close(&self) -> Result<(), MediaEngineError> {
        self.peer_connection
            .close()
            .await
            .map_err(|_| MediaEngineError::Closed)
    }
}

/// Creates [`WebRtcMediaEngine`]s with a shared [`MediaConfig`].
#[derive(Clone, Default)]
pub struct WebRtcMediaEngineFactory {
    config: MediaConfig,
}

impl WebRtcMediaEngineFactory {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MediaEngineFactory for WebRtcMediaEngineFactory {
    async fn create(
        &self,
        role: Role,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<MediaEvent>,
    ) -> Result<Arc<dyn MediaEngine>, MediaEngineError> {
        let engine = WebRtcMediaEngine::new(role, self.config.clone(), ice_servers, events)
            .await
            .map_err(|e| MediaEngineError::Setup(format!("{e:#}")))?;
        Ok(Arc::new(engine))
    }
}

fn forward_messages(dc: &Arc<RTCDataChannel>, tx: mpsc::Sender<MediaEvent>) {
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx.clone();
        Box::pin(async move {
            let bytes = Bytes::from(msg.data.to_vec());
            let _ = tx.send(MediaEvent::DataReceived(bytes)).await;
        })
    }));
}

fn description(kind: SdpKind, sdp: String) -> Result<RTCSessionDescription, MediaEngineError> {
    let desc = match kind {
        SdpKind::Offer => RTCSessionDescription::offer(sdp),
        SdpKind::Answer => RTCSessionDescription::answer(sdp),
    };
    desc.map_err(|e| MediaEngineError::SetDescription {
        kind,
        reason: e.to_string(),
    })
}

fn to_rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn map_state(s: RTCPeerConnectionState) -> Option<ConnectionState> {
    match s {
        RTCPeerConnectionState::New => Some(ConnectionState::New),
        RTCPeerConnectionState::Connecting => Some(ConnectionState::Connecting),
        RTCPeerConnectionState::Connected => Some(ConnectionState::Connected),
        RTCPeerConnectionState::Disconnected => Some(ConnectionState::Disconnected),
        RTCPeerConnectionState::Failed => Some(ConnectionState::Failed),
        RTCPeerConnectionState::Closed => Some(ConnectionState::Closed),
        RTCPeerConnectionState::Unspecified => None,
    }
}
